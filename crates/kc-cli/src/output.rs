//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::OutputFormat;

/// A row with a primary identifier, printed alone in quiet mode.
pub trait Keyed {
    /// Returns the primary identifier.
    fn key(&self) -> &str;
}

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints rows in the requested format.
pub fn output<T: Tabled + Serialize + Keyed>(rows: &[T], format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table if rows.is_empty() => info("No results found."),
        OutputFormat::Table => println!("{}", Table::new(rows).with(Style::rounded())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Yaml => print!("{}", to_yaml(rows)?),
        OutputFormat::Quiet => {
            for row in rows {
                println!("{}", row.key());
            }
        }
    }
    Ok(())
}

/// Prints a single value.
///
/// In table and quiet mode `plain` is printed as is.
pub fn output_single<T: Serialize>(item: &T, plain: &str, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Quiet => println!("{plain}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(item)?),
        OutputFormat::Yaml => print!("{}", to_yaml(item)?),
    }
    Ok(())
}

fn to_yaml<T: Serialize + ?Sized>(value: &T) -> crate::CliResult<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Prompts for confirmation.
pub fn confirm(message: &str) -> crate::CliResult<bool> {
    eprint!("{message} [y/N]: ");
    std::io::Write::flush(&mut std::io::stderr())?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    let answer = input.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

/// Prompts for password input (hidden).
pub fn prompt_password(prompt: &str) -> crate::CliResult<String> {
    Ok(rpassword::prompt_password(prompt)?)
}
