use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

// Use library instead of local modules
use puzzle_archive::{
    backup_database, count_records, export_records, get_all_records, get_record_by_id,
    get_records_by_date, insert_records, logging, normalize_date, render_records, search_records,
    setup_database, Config, ParseOutcome, PuzzleParser, Record,
};

#[derive(Parser)]
#[command(name = "puzzle-archive", version, about = "Parse and archive daily word-grouping puzzles")]
struct Cli {
    /// SQLite database path (default: $PUZZLE_DB or puzzles.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Line marker used by the dump
    #[arg(long, global = true)]
    marker: Option<char>,

    /// Whitespace after the marker that makes a line a word line
    #[arg(long, global = true)]
    indent: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a dump and print the result
    Parse {
        file: PathBuf,
        /// Print records and diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse a dump and store accepted puzzles
    Import { file: PathBuf },
    /// List stored puzzles
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one puzzle by date (2025-07-31, "Jul 31, 2025") or number (#781)
    Show { key: String },
    /// Search category names and words
    Search { term: String },
    /// Write one JSON file per puzzle plus summaries
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Copy the database into the backup directory
    Backup {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Parse a dump and print it back in canonical layout
    Render { file: PathBuf },
}

fn main() -> Result<()> {
    logging::init("info");

    let cli = Cli::parse();
    let config = build_config(&cli);

    match &cli.command {
        Command::Parse { file, json } => run_parse(&config, file, *json),
        Command::Import { file } => run_import(&config, file),
        Command::List { limit } => run_list(&config, *limit),
        Command::Show { key } => run_show(&config, key),
        Command::Search { term } => run_search(&config, term),
        Command::Export { dir } => {
            run_export(&config, dir.as_deref().unwrap_or(config.export_dir.as_path()))
        }
        Command::Backup { dir } => {
            run_backup(&config, dir.as_deref().unwrap_or(config.backup_dir.as_path()))
        }
        Command::Render { file } => run_render(&config, file),
    }
}

fn build_config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(marker) = cli.marker {
        config.parser = config.parser.with_marker(marker);
    }
    if let Some(indent) = cli.indent {
        config.parser = config.parser.with_continuation_indent(indent);
    }
    config
}

fn open_db(config: &Config) -> Result<Connection> {
    let conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database: {}", config.db_path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn parse_dump(parser: &PuzzleParser, file: &Path) -> Result<ParseOutcome> {
    let outcome = parser.parse_file(file)?;

    for diagnostic in &outcome.diagnostics {
        eprintln!("⚠️  {}", diagnostic);
    }
    Ok(outcome)
}

/// An empty result is a failure for commands that consume records
fn require_records(outcome: &ParseOutcome) {
    if outcome.records.is_empty() {
        eprintln!("❌ No complete puzzles found ({} diagnostics)", outcome.diagnostics.len());
        std::process::exit(1);
    }
}

fn run_parse(config: &Config, file: &Path, json: bool) -> Result<()> {
    let parser = PuzzleParser::new(config.parser.clone());
    let outcome = parse_dump(&parser, file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for record in &outcome.records {
            print_record(record);
        }
        println!("✓ {}", outcome.summary());
    }

    require_records(&outcome);
    Ok(())
}

fn run_import(config: &Config, file: &Path) -> Result<()> {
    println!("🗄️  Import: {} → {}", file.display(), config.db_path.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let parser = PuzzleParser::new(config.parser.clone());
    let outcome = parse_dump(&parser, file)?;
    println!("✓ {}", outcome.summary());
    require_records(&outcome);

    let conn = open_db(config)?;
    let source = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");
    let summary = insert_records(&conn, &outcome.records, source, parser.version())?;

    println!("✓ Inserted: {} puzzles", summary.inserted);
    println!("✓ Skipped duplicates: {}", summary.duplicates);
    if summary.conflicts > 0 {
        println!("⚠️  Conflicting re-imports kept as stored: {}", summary.conflicts);
    }
    println!("✓ Database contains {} puzzles", count_records(&conn)?);

    Ok(())
}

fn run_list(config: &Config, limit: Option<usize>) -> Result<()> {
    let conn = open_db(config)?;
    let records = get_all_records(&conn)?;
    let shown = limit.unwrap_or(records.len()).min(records.len());

    // Most recent `limit` puzzles, still oldest first
    for record in &records[records.len() - shown..] {
        let names: Vec<&str> = record.categories.iter().map(|c| c.name.as_str()).collect();
        println!("{}  #{:<5} {}", record.date_key(), record.record_id, names.join(" | "));
    }
    println!("✓ {} of {} puzzles", shown, records.len());

    Ok(())
}

fn run_show(config: &Config, key: &str) -> Result<()> {
    let conn = open_db(config)?;
    let key = key.trim();

    let records = if let Ok(id) = key.trim_start_matches('#').parse::<u32>() {
        get_record_by_id(&conn, id)?.into_iter().collect()
    } else {
        let date = match normalize_date(key) {
            Ok(date) => date,
            Err(_) => key.to_string(),
        };
        get_records_by_date(&conn, &date)?
    };

    if records.is_empty() {
        eprintln!("❌ No puzzle found for {:?}", key);
        std::process::exit(1);
    }
    for record in &records {
        print_record(record);
    }

    Ok(())
}

fn run_search(config: &Config, term: &str) -> Result<()> {
    let conn = open_db(config)?;
    let hits = search_records(&conn, term)?;

    for record in &hits {
        print_record(record);
    }
    println!("✓ {} puzzles match {:?}", hits.len(), term);

    Ok(())
}

fn run_export(config: &Config, dir: &Path) -> Result<()> {
    let conn = open_db(config)?;
    let records = get_all_records(&conn)?;
    let summary = export_records(&records, dir)?;

    println!("📦 Exported {} puzzles to {}", summary.record_count, dir.display());
    Ok(())
}

fn run_backup(config: &Config, dir: &Path) -> Result<()> {
    let conn = open_db(config)?;
    let path = backup_database(&conn, dir)?;

    println!("💾 Backup written: {}", path.display());
    Ok(())
}

fn run_render(config: &Config, file: &Path) -> Result<()> {
    let parser = PuzzleParser::new(config.parser.clone());
    let outcome = parse_dump(&parser, file)?;
    print!("{}", render_records(&outcome.records, &config.parser));
    Ok(())
}

fn print_record(record: &Record) {
    println!("📅 {}  #{}", record.date_key(), record.record_id);
    for category in &record.categories {
        println!("   {}. {}: {}", category.rank + 1, category.name, category.words.join(", "));
    }
}
