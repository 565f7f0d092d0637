use std::path::PathBuf;

use clap::Parser;
use prettytable::{row, Table};
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date};
use tracing_subscriber::EnvFilter;

use spendtrack::{
    aggregate::aggregate_by_category,
    config::{CliArgs, Command, Config, LoggingConfig},
    export::{export_all, ExportError},
    models::{AccountId, NewExpense, CATEGORIES},
    sqlite_storage::SqliteStorage,
    storage::{InMemoryStorage, StorageBackend, StorageError},
};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid username or password")]
    LoginFailed,
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

fn main() {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);
    init_tracing(&config.logging);

    let storage: Box<dyn StorageBackend> = match config.storage.backend.as_str() {
        "memory" => Box::new(InMemoryStorage::new()),
        _ => match SqliteStorage::open(&config.storage.path) {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                eprintln!("error: cannot open database {}: {}", config.storage.path, e);
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = run(&cli.command, storage.as_ref(), &config) {
        match e {
            CliError::Export(ExportError::NoData) => {
                eprintln!("warning: no data available to export");
            }
            e => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn run(command: &Command, storage: &dyn StorageBackend, config: &Config) -> Result<(), CliError> {
    match command {
        Command::Register { username, password } => {
            if username.is_empty() || password.is_empty() {
                return Err(CliError::InvalidInput(
                    "username and password must not be empty".to_string(),
                ));
            }
            match storage.register(username, password) {
                Ok(()) => {
                    println!("Registration successful! You can now log in.");
                    Ok(())
                }
                Err(StorageError::DuplicateUsername(_)) => Err(CliError::InvalidInput(
                    "username already exists".to_string(),
                )),
                Err(e) => Err(e.into()),
            }
        }
        Command::Add {
            username,
            password,
            category,
            amount,
            date,
            description,
        } => {
            let account_id = login(storage, username, password)?;
            let expense = validate_expense(category, amount, date, description)?;
            let id = storage.add_expense(account_id, &expense)?;
            println!("Expense {id} added.");
            Ok(())
        }
        Command::List { username, password } => {
            let account_id = login(storage, username, password)?;
            let records = storage.list_expenses(account_id)?;
            if records.is_empty() {
                println!("No expenses recorded.");
                return Ok(());
            }
            let mut table = Table::new();
            table.add_row(row!["ID", "Category", "Amount", "Date", "Description"]);
            table.add_empty_row();
            for record in &records {
                table.add_row(row![
                    record.id,
                    record.category,
                    format!("{:.2}", record.amount),
                    record.date,
                    record.description
                ]);
            }
            println!("{table}");
            Ok(())
        }
        Command::Summary { username, password } => {
            let account_id = login(storage, username, password)?;
            let records = storage.list_expenses(account_id)?;
            let totals = aggregate_by_category(&records);
            if totals.is_empty() {
                println!("No expenses recorded.");
                return Ok(());
            }
            let grand: f64 = totals.values().sum();
            let mut table = Table::new();
            table.add_row(row!["Category", "Total", "Share"]);
            table.add_empty_row();
            for (category, total) in &totals {
                let share = if grand == 0.0 {
                    0.0
                } else {
                    total / grand * 100.0
                };
                table.add_row(row![category, format!("{total:.2}"), format!("{share:.1}%")]);
            }
            println!("{table}");
            Ok(())
        }
        Command::Delete {
            username,
            password,
            id,
        } => {
            let account_id = login(storage, username, password)?;
            storage.delete_expense(account_id, *id)?;
            println!("Expense deleted.");
            Ok(())
        }
        Command::Clear { username, password } => {
            let account_id = login(storage, username, password)?;
            storage.delete_all_expenses(account_id)?;
            println!("All expenses cleared.");
            Ok(())
        }
        Command::Export { output } => {
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.export.path));
            export_all(storage, &path)?;
            println!("Data exported to {}.", path.display());
            Ok(())
        }
    }
}

fn login(
    storage: &dyn StorageBackend,
    username: &str,
    password: &str,
) -> Result<AccountId, CliError> {
    storage
        .authenticate(username, password)?
        .ok_or(CliError::LoginFailed)
}

/// Input validation is the front end's duty; the store accepts whatever it
/// is handed. The parsed date is only checked, then kept as text.
fn validate_expense(
    category: &str,
    amount: &str,
    date: &str,
    description: &str,
) -> Result<NewExpense, CliError> {
    if !CATEGORIES.contains(&category) {
        return Err(CliError::InvalidInput(format!(
            "unknown category '{}', expected one of: {}",
            category,
            CATEGORIES.join(", ")
        )));
    }
    let amount: f64 = amount
        .parse()
        .map_err(|_| CliError::InvalidInput("please enter a valid amount".to_string()))?;
    Date::parse(date, DATE_FORMAT)
        .map_err(|_| CliError::InvalidInput("date must be YYYY-MM-DD".to_string()))?;

    Ok(NewExpense {
        category: category.to_string(),
        amount,
        date: date.to_string(),
        description: description.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_expense_accepts_well_formed_input() {
        let expense = validate_expense("Food", "12.50", "2024-01-01", "lunch").unwrap();
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.date, "2024-01-01");
    }

    #[test]
    fn test_validate_expense_rejects_bad_input() {
        assert!(validate_expense("Groceries", "1", "2024-01-01", "").is_err());
        assert!(validate_expense("Food", "abc", "2024-01-01", "").is_err());
        assert!(validate_expense("Food", "1", "01/01/2024", "").is_err());
        assert!(validate_expense("Food", "1", "2024-13-40", "").is_err());
    }
}
