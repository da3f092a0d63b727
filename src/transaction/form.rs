//! Request payloads for the transaction endpoints and their validation.

use std::fmt;

use serde::{
    Deserialize, Deserializer,
    de::{self, Visitor},
};

use crate::{
    ValidationError,
    transaction::{
        Amount, Category, Description, NewTransaction, TransactionFilter, TransactionKind,
        TransactionUpdate, domain::parse_date,
    },
};

/// An amount as written in the request, either as a JSON number or a string.
///
/// The text is kept so that [Amount::parse] sees every digit the client sent.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountText(String);

impl AmountText {
    fn parse(&self) -> Result<Amount, ValidationError> {
        Amount::parse(&self.0)
    }
}

impl<'de> Deserialize<'de> for AmountText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountTextVisitor)
    }
}

struct AmountTextVisitor;

impl Visitor<'_> for AmountTextVisitor {
    type Value = AmountText;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a string holding a number")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(AmountText(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(AmountText(value.to_string()))
    }

    // `f64` displays without an exponent, so tiny fractions keep all their digits.
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(AmountText(value.to_string()))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(AmountText(value.to_owned()))
    }
}

/// The JSON body for creating a transaction.
///
/// The type and date are kept as text so that invalid values are reported
/// as validation errors that name the offending field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTransactionRequest {
    pub amount: AmountText,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub description: String,
    pub date: String,
}

impl TryFrom<CreateTransactionRequest> for NewTransaction {
    type Error = ValidationError;

    fn try_from(request: CreateTransactionRequest) -> Result<Self, Self::Error> {
        Ok(NewTransaction {
            amount: request.amount.parse()?,
            kind: request.kind.parse()?,
            category: Category::new(&request.category)?,
            description: Description::new(&request.description)?,
            occurred_at: parse_date("date", &request.date)?,
        })
    }
}

/// The JSON body for updating a transaction.
///
/// Every field is optional and only the fields that are present are changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTransactionRequest {
    pub amount: Option<AmountText>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl TryFrom<UpdateTransactionRequest> for TransactionUpdate {
    type Error = ValidationError;

    fn try_from(request: UpdateTransactionRequest) -> Result<Self, Self::Error> {
        Ok(TransactionUpdate {
            amount: request.amount.as_ref().map(AmountText::parse).transpose()?,
            kind: request
                .kind
                .as_deref()
                .map(str::parse::<TransactionKind>)
                .transpose()?,
            category: request.category.as_deref().map(Category::new).transpose()?,
            description: request
                .description
                .as_deref()
                .map(Description::new)
                .transpose()?,
            occurred_at: request
                .date
                .as_deref()
                .map(|date| parse_date("date", date))
                .transpose()?,
        })
    }
}

/// The query string for listing transactions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<ListTransactionsQuery> for TransactionFilter {
    type Error = ValidationError;

    fn try_from(query: ListTransactionsQuery) -> Result<Self, Self::Error> {
        Ok(TransactionFilter {
            kind: non_empty(query.kind.as_deref())
                .map(str::parse::<TransactionKind>)
                .transpose()?,
            // A filter only has to match stored names, so no length limit applies.
            category: non_empty(query.category.as_deref())
                .map(|category| Category::new_unchecked(category.trim())),
            start_date: parse_optional_date("startDate", query.start_date.as_deref())?,
            end_date: parse_optional_date("endDate", query.end_date.as_deref())?,
        })
    }
}

/// Parse an optional date query parameter, treating an empty value as absent.
pub fn parse_optional_date(
    field: &'static str,
    text: Option<&str>,
) -> Result<Option<time::Date>, ValidationError> {
    non_empty(text).map(|text| parse_date(field, text)).transpose()
}

// Browsers submit empty inputs as `?category=`, which means "no filter".
fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|text| !text.trim().is_empty())
}
