//! Validated field types for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::ValidationError;

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// The largest amount, in cents, that fits in the amount column.
const MAX_AMOUNT_CENTS: i128 = 99_999_999_99;

/// The number of fraction digits used for currency amounts.
const CURRENCY_SCALE: u32 = 2;

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money that was earned, e.g. a salary payment.
    Income,
    /// Money that was spent, e.g. groceries.
    Expense,
}

impl TransactionKind {
    /// The wire and database representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(ValidationError::InvalidKind(other.to_owned())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A positive amount of money with cent precision.
///
/// Amounts are always positive; whether the money was earned or spent is
/// given by [TransactionKind]. Internally the amount is a fixed-point decimal
/// with exactly two fraction digits, so sums of amounts are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount from a decimal value.
    ///
    /// Trailing zeros are fine (`12.500`), but any precision beyond whole
    /// cents is rejected rather than rounded.
    ///
    /// # Errors
    ///
    /// Returns a:
    /// - [ValidationError::NonPositiveAmount] if `value` is zero or negative,
    /// - [ValidationError::TooManyDecimalPlaces] if `value` has more than two
    ///   significant fraction digits,
    /// - or [ValidationError::AmountTooLarge] if `value` exceeds 99999999.99.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }

        if value.normalize().scale() > CURRENCY_SCALE {
            return Err(ValidationError::TooManyDecimalPlaces);
        }

        let mut value = value;
        value.rescale(CURRENCY_SCALE);

        if value.mantissa() > MAX_AMOUNT_CENTS {
            return Err(ValidationError::AmountTooLarge);
        }

        Ok(Self(value))
    }

    /// Parse an amount from its decimal text, e.g. `"12.50"`.
    ///
    /// The text is parsed exactly. Digits too small to represent are reported
    /// as excess precision instead of being rounded away to zero.
    ///
    /// # Errors
    ///
    /// Returns the errors of [Amount::new], or a
    /// [ValidationError::InvalidAmount] if `text` is not a decimal number.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        let is_negative = text.starts_with('-');

        match Decimal::from_str_exact(text) {
            Ok(value) => Amount::new(value),
            Err(_) if is_negative && is_plain_number(text) => {
                Err(ValidationError::NonPositiveAmount)
            }
            Err(rust_decimal::Error::Underflow) => Err(ValidationError::TooManyDecimalPlaces),
            Err(_) if is_plain_number(text) => Err(ValidationError::AmountTooLarge),
            Err(_) => Err(ValidationError::InvalidAmount(text.to_owned())),
        }
    }

    /// Create an amount from a whole number of cents.
    ///
    /// The caller should ensure that `cents` is positive.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, CURRENCY_SCALE))
    }

    /// The amount as a whole number of cents.
    pub fn cents(&self) -> i64 {
        // The constructors keep the scale at two and the mantissa below
        // MAX_AMOUNT_CENTS, so the mantissa is the number of cents.
        self.0.mantissa() as i64
    }

    /// The amount as a decimal with two fraction digits.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.cents()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_i64().map(Amount::from_cents)
    }
}

// Optionally signed digits with at most one decimal point.
fn is_plain_number(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    !(whole.is_empty() && fraction.is_empty())
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit())
}

/// A validated, non-empty category name, e.g. "Salary" or "Food".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct Category(String);

impl Category {
    /// Create a category name.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [ValidationError::EmptyCategory] if `name` is empty after trimming,
    /// - or [ValidationError::CategoryTooLong] if `name` is longer than
    ///   [MAX_CATEGORY_LENGTH] characters after trimming.
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();

        if name.is_empty() {
            Err(ValidationError::EmptyCategory)
        } else if name.chars().count() > MAX_CATEGORY_LENGTH {
            Err(ValidationError::CategoryTooLong)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is trimmed and not empty.
    /// Names longer than [MAX_CATEGORY_LENGTH] characters are only useful
    /// as filters, since they can never be stored.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::new(s)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated, non-empty description of what a transaction was for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Description(String);

impl Description {
    /// Create a description.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [ValidationError::EmptyDescription] if
    /// `text` is empty after trimming.
    pub fn new(text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();

        if text.is_empty() {
            Err(ValidationError::EmptyDescription)
        } else {
            Ok(Self(text.to_owned()))
        }
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

const ISO_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse an ISO 8601 calendar date (`2024-01-15`) or an RFC 3339 date-time
/// (`2024-01-15T10:30:00Z`), keeping only the date.
///
/// `field` names the request field the text came from and is reported in
/// the error.
///
/// # Errors
///
/// Returns a [ValidationError::InvalidDate] if `text` is in neither format.
pub fn parse_date(field: &'static str, text: &str) -> Result<Date, ValidationError> {
    let text = text.trim();

    Date::parse(text, ISO_DATE_FORMAT)
        .or_else(|_| OffsetDateTime::parse(text, &Rfc3339).map(|date_time| date_time.date()))
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: text.to_owned(),
        })
}
