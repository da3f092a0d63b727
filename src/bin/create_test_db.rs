use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use fintrack_rs::{
    Amount, Category, Description, Email, NewTransaction, NewUser, PasswordHash, TransactionKind,
    ValidatedPassword, count_transactions, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The display name of the demo user that owns the sample transactions.
    #[arg(long, default_value = "Demo User")]
    name: String,

    /// The email address the demo user logs in with.
    #[arg(long, default_value = "demo@example.com")]
    email: String,

    /// The password the demo user logs in with.
    #[arg(long)]
    password: String,
}

/// Sample transactions as (amount in dollars, type, category, description, day of the current month).
const SAMPLE_TRANSACTIONS: [(i64, TransactionKind, &str, &str, u8); 8] = [
    (5000, TransactionKind::Income, "Salary", "Monthly salary payment", 1),
    (1500, TransactionKind::Income, "Freelance", "Website development project", 15),
    (800, TransactionKind::Expense, "Rent", "Monthly rent payment", 5),
    (150, TransactionKind::Expense, "Groceries", "Weekly grocery shopping", 10),
    (50, TransactionKind::Expense, "Transportation", "Gas and parking", 12),
    (100, TransactionKind::Expense, "Entertainment", "Movie tickets and dinner", 18),
    (200, TransactionKind::Income, "Investment", "Stock dividend", 20),
    (75, TransactionKind::Expense, "Utilities", "Electricity bill", 22),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let now = OffsetDateTime::now_utc();

    let password_hash = PasswordHash::new(
        ValidatedPassword::new(&args.password)?,
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        NewUser {
            name: args.name.trim().to_owned(),
            email: Email::new(&args.email)?,
            password_hash,
        },
        now,
        &conn,
    )?;
    let owner_id = user.id;

    println!("Created user {} with ID {owner_id}.", user.email);
    println!("Creating sample transactions for owner {owner_id}...");

    for (dollars, kind, category, description, day) in SAMPLE_TRANSACTIONS {
        create_transaction(
            owner_id,
            NewTransaction {
                amount: Amount::new(Decimal::from(dollars))?,
                kind,
                category: Category::new(category)?,
                description: Description::new(description)?,
                occurred_at: now.date().replace_day(day)?,
            },
            now,
            &conn,
        )?;
    }

    println!(
        "Success! Created {} transactions.",
        count_transactions(owner_id, &conn)?
    );

    Ok(())
}
