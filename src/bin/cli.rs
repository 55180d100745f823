#![cfg(not(tarpaulin_include))]

use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use registration::{
    Config, EntryForm, backup_store, export_spreadsheet, labels, restore_store, to_csv, validate,
};

/// Operator tool for the configured registration store
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every stored entry
    List,

    /// Validate and store one entry
    Add {
        full_name: String,
        id_number: String,
        phone: String,
        /// `male`, `female` or the localized label
        gender: String,
    },

    /// Export all entries to an .xlsx file (or .csv by extension)
    Export { path: PathBuf },

    /// Write all entries to a .bin.gz archive
    Backup { path: PathBuf },

    /// Validate the entries of a .bin.gz archive and append them to the store
    Restore { path: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = Config::load()?;
    let store = config.open_store()?;

    match args.command {
        Command::List => {
            let entries = store.list_all()?;
            if entries.is_empty() {
                println!("{}", labels::NO_DATA);
            }
            for (i, entry) in entries.iter().enumerate() {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    i + 1,
                    entry.full_name,
                    entry.id_number,
                    entry.phone,
                    entry.gender
                );
            }
        }
        Command::Add {
            full_name,
            id_number,
            phone,
            gender,
        } => {
            let form = EntryForm::new(&full_name, &id_number, &phone, &gender).sanitized();
            let entry = validate(&form)?;
            store.append(entry)?;
            println!("{}", labels::SAVED);
        }
        Command::Export { path } => {
            let entries = store.list_all()?;
            if path.extension().is_some_and(|ext| ext == "csv") {
                std::fs::write(&path, to_csv(&entries)?)?;
            } else {
                export_spreadsheet(&entries, &path)?;
            }
            println!("Exported {} entries to {}", entries.len(), path.display());
        }
        Command::Backup { path } => {
            let count = backup_store(store.as_ref(), &path)?;
            println!("Archived {} entries to {}", count, path.display());
        }
        Command::Restore { path } => {
            let count = restore_store(store.as_ref(), &path)?;
            println!("Restored {} entries from {}", count, path.display());
        }
    }

    Ok(())
}
