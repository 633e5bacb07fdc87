//! Command-line inspector for `.bib` files.
//!
//! ```bash
//! # One line per entry: key, type, short authors, year, and title
//! bibdb refs.bib
//!
//! # Selected entries and fields
//! bibdb refs.bib hobbes1651 marx1867 --field author --field publisher
//!
//! # Parsed entries as JSON, with debug logging
//! RUST_LOG=bibdb=debug bibdb refs.bib --json
//! ```
use std::path::PathBuf;

use bibdb::format::FormattedEntry;
use bibdb::{Config, EntryRef, Parser};
use clap::Parser as _;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[command(name = "bibdb")]
#[command(version)]
#[command(about = "Inspect the entries of a BibTeX or BibLaTeX bibliography")]
struct Cli {
    /// The bibliography to read
    file: PathBuf,

    /// Citation keys of the entries to show (default: all entries)
    keys: Vec<String>,

    /// Fields to show, such as `title` or `author_short`
    #[arg(short, long = "field", value_name = "NAME")]
    fields: Vec<String>,

    /// Print the entries as JSON
    #[arg(long)]
    json: bool,

    /// Keep name fields which cannot be parsed instead of failing
    #[arg(long)]
    lenient_names: bool,

    /// Keep name fields as written
    #[arg(long)]
    no_normalize: bool,
}

const DEFAULT_FIELDS: [&str; 3] = ["author_short", "year", "title"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::default()
        .with_normalize_names(!cli.no_normalize)
        .with_strict_names(!cli.lenient_names);
    let bytes = std::fs::read(&cli.file)?;
    let database = Parser::new(config).parse_bytes(&bytes)?;

    let entries: Vec<EntryRef<'_>> = if cli.keys.is_empty() {
        database.iter().collect()
    } else {
        for key in cli.keys.iter().filter(|key| !database.contains_key(key)) {
            warn!("No entry with key '{}'", key);
        }
        database.get_entries(&cli.keys)
    };

    if cli.json {
        let selected: Vec<_> = entries.iter().map(EntryRef::entry).collect();
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    let fields: Vec<&str> = if cli.fields.is_empty() {
        DEFAULT_FIELDS.to_vec()
    } else {
        cli.fields.iter().map(String::as_str).collect()
    };

    for entry in entries {
        let formatted = FormattedEntry::new(entry);
        let mut columns = vec![entry.cite_key().to_owned(), entry.entry_type().to_owned()];
        // missing fields are printed as empty columns
        columns.extend(
            fields
                .iter()
                .map(|field| formatted.get(field).unwrap_or_default()),
        );
        println!("{}", columns.join("\t"));
    }

    Ok(())
}
