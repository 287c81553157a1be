//! Lectio CLI - Scripture lookup, search and daily readings

#[cfg(feature = "service")]
mod client;
mod runtime;

use clap::{Parser, Subcommand};
use colored::Colorize;
use lectio_core::{Book, Config, LectioError, Reading, Testament, Verse};
use runtime::Runtime;
use serde::Serialize;
use std::path::{Path, PathBuf};
use time::Date;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "lectio.toml";

#[derive(Parser)]
#[command(name = "lectio")]
#[command(about = "Scripture lookup, search and daily readings", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./lectio.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verse corpus CSV (overrides config)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Service URL for remote queries (e.g., http://localhost:3000)
    #[arg(long, global = true, env = "LECTIO_SERVICE_URL")]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List books in canonical order
    Books {
        /// Only books of one testament: old or new
        #[arg(short, long)]
        testament: Option<Testament>,
    },

    /// Show every verse of a chapter
    Chapter {
        /// Book id or name (e.g. 19, psalms)
        book: String,
        chapter: u32,
    },

    /// Show a single verse
    Verse {
        /// Book id or name (e.g. 43, john)
        book: String,
        chapter: u32,
        verse: u32,
    },

    /// Search by reference ("john 3:16", "psalms 23") or text
    Search {
        /// Query words; wrap in quotes for an exact phrase
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Verse of the day
    Daily {
        /// Date as YYYY-MM-DD (default: today, UTC)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// A random verse
    Random,

    /// Plain-text passage of the best matches for a query
    Passage {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Maximum verses in the passage
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Curated reading for a day, or search the reading plan
    Reading {
        /// Date as YYYY-MM-DD (default: today, UTC)
        #[arg(short, long)]
        date: Option<String>,

        /// Search readings by topic, book or keyword instead
        #[arg(short, long, conflicts_with = "date")]
        search: Option<String>,
    },

    /// Show corpus load statistics
    Status,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            let error_json = match &e {
                LectioError::ServiceError {
                    code,
                    message,
                    hint,
                } => {
                    serde_json::json!({ "code": code, "message": message, "hint": hint })
                }
                _ => {
                    serde_json::json!({ "code": "error", "message": e.to_string(), "hint": "" })
                }
            };
            eprintln!("{:#}", error_json);
        } else {
            eprintln!("{}: {}", "Error".red(), e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> lectio_core::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.corpus)?;
    let runtime = Runtime::new(config, cli.service_url.as_deref())?;
    let json = cli.json;

    match cli.command {
        Commands::Books { testament } => cmd_books(&runtime, testament, json),
        Commands::Chapter { book, chapter } => {
            print_verses(&runtime.chapter(&book, chapter)?, json)
        }
        Commands::Verse {
            book,
            chapter,
            verse,
        } => cmd_verse(&runtime, &book, chapter, verse, json),
        Commands::Search { query } => cmd_search(&runtime, &query.join(" "), json),
        Commands::Daily { date } => cmd_daily(&runtime, date.as_deref(), json),
        Commands::Random => {
            let verse = runtime.random()?;
            if json {
                return print_json(&verse);
            }
            print_verse(&verse);
            Ok(())
        }
        Commands::Passage { query, limit } => {
            let query = query.join(" ");
            let passage = runtime.passage(&query, limit)?;
            if json {
                return print_json(&serde_json::json!({ "query": query, "passage": passage }));
            }
            println!("{}", passage);
            Ok(())
        }
        Commands::Reading { date, search } => match search {
            Some(query) => cmd_search_readings(&runtime, &query, json),
            None => cmd_reading(&runtime, date.as_deref(), json),
        },
        Commands::Status => cmd_status(&runtime, cli.service_url.as_deref(), json),
    }
}

fn load_config(path: Option<&Path>, corpus: Option<PathBuf>) -> lectio_core::Result<Config> {
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    let path = path.or_else(|| default_path.exists().then_some(default_path));
    let mut config = Config::load_or_default(path)?;
    if let Some(corpus) = corpus {
        config.corpus.path = corpus;
    }
    Ok(config)
}

fn date_or_today(raw: Option<&str>) -> lectio_core::Result<Date> {
    match raw {
        Some(raw) => lectio_core::parse_date(raw),
        None => Ok(time::OffsetDateTime::now_utc().date()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> lectio_core::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_verse(verse: &Verse) {
    println!("{} {}", verse.reference().cyan(), verse.text);
}

fn print_verses(verses: &[Verse], json: bool) -> lectio_core::Result<()> {
    if json {
        return print_json(verses);
    }
    if verses.is_empty() {
        println!("{}", lectio_core::NO_VERSES_FOUND.dimmed());
        return Ok(());
    }
    for verse in verses {
        print_verse(verse);
    }
    Ok(())
}

fn cmd_books(runtime: &Runtime, testament: Option<Testament>, json: bool) -> lectio_core::Result<()> {
    let books: Vec<Book> = runtime.books(testament)?;
    if json {
        return print_json(&books);
    }
    for book in &books {
        println!(
            "{:>3}  {} {}",
            book.id.to_string().dimmed(),
            book.name.cyan(),
            format!("({} chapters)", book.chapters.len()).dimmed()
        );
    }
    println!("{}: {} books", "Total".blue(), books.len());
    Ok(())
}

fn cmd_verse(
    runtime: &Runtime,
    book: &str,
    chapter: u32,
    verse: u32,
    json: bool,
) -> lectio_core::Result<()> {
    let verse = runtime.verse(book, chapter, verse)?;
    if json {
        return print_json(&verse);
    }
    print_verse(&verse);
    Ok(())
}

fn cmd_search(runtime: &Runtime, query: &str, json: bool) -> lectio_core::Result<()> {
    let verses = runtime.search(query)?;
    if json {
        return print_json(&serde_json::json!({ "query": query.trim(), "verses": verses }));
    }
    print_verses(&verses, false)?;
    if !verses.is_empty() {
        println!("{}: {} verses", "Found".green(), verses.len());
    }
    Ok(())
}

fn cmd_daily(runtime: &Runtime, date: Option<&str>, json: bool) -> lectio_core::Result<()> {
    let date = date_or_today(date)?;
    let verse = runtime.daily(date)?;
    let date = lectio_core::date_seed(date);
    if json {
        return print_json(&serde_json::json!({
            "date": date,
            "verse": verse,
            "passage": verse.to_line(),
        }));
    }
    println!("{} {}", "Verse of the day".green(), date.dimmed());
    print_verse(&verse);
    Ok(())
}

fn print_reading(reading: &Reading) {
    println!(
        "{} {}",
        reading.topic.green().bold(),
        reading.reference().cyan()
    );
    if let Some(reflection) = &reading.reflection {
        println!("{}", reflection.dimmed());
    }
}

fn cmd_reading(runtime: &Runtime, date: Option<&str>, json: bool) -> lectio_core::Result<()> {
    let date = date_or_today(date)?;
    let (reading, passage) = runtime.todays_reading(date)?;
    if json {
        return print_json(&serde_json::json!({
            "date": lectio_core::date_seed(date),
            "reading": reading,
            "passage": passage,
        }));
    }
    print_reading(&reading);
    println!();
    println!("{}", passage);
    Ok(())
}

fn cmd_search_readings(runtime: &Runtime, query: &str, json: bool) -> lectio_core::Result<()> {
    let readings = runtime.search_readings(query)?;
    if json {
        return print_json(&readings);
    }
    if readings.is_empty() {
        println!("{}", "No readings found.".dimmed());
    }
    for reading in &readings {
        print_reading(reading);
    }
    Ok(())
}

fn cmd_status(runtime: &Runtime, service_url: Option<&str>, json: bool) -> lectio_core::Result<()> {
    let Some(index) = runtime.local_index() else {
        let url = service_url.unwrap_or_default();
        if json {
            return print_json(&serde_json::json!({ "service_url": url }));
        }
        println!("{}: {}", "Service".green(), url);
        return Ok(());
    };

    let stats = index.stats();
    if json {
        return print_json(&serde_json::json!({
            "verses": index.len(),
            "books": index.books().len(),
            "stats": stats,
        }));
    }
    println!("{}: {} verses", "Loaded".green(), index.len());
    println!("{}: {}", "Books".blue(), index.books().len());
    println!(
        "{}: {} rows, {} skipped, {} duplicates",
        "Corpus".blue(),
        stats.rows,
        stats.skipped,
        stats.duplicates
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_subcommands() {
        let cli = Cli::try_parse_from(["lectio", "search", "john", "3:16", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Search { query } => assert_eq!(query.join(" "), "john 3:16"),
            _ => panic!("expected search"),
        }

        let cli = Cli::try_parse_from(["lectio", "books", "--testament", "new"]).unwrap();
        match cli.command {
            Commands::Books { testament } => assert_eq!(testament, Some(Testament::New)),
            _ => panic!("expected books"),
        }

        assert!(Cli::try_parse_from(["lectio", "books", "--testament", "middle"]).is_err());
        assert!(Cli::try_parse_from(["lectio", "reading", "--date", "2024-01-01", "--search", "x"])
            .is_err());
    }

    #[test]
    fn test_corpus_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lectio.toml");
        std::fs::write(&path, "[corpus]\npath = \"from-config.csv\"\n").unwrap();

        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.corpus.path, PathBuf::from("from-config.csv"));

        let config = load_config(Some(&path), Some(PathBuf::from("flag.csv"))).unwrap();
        assert_eq!(config.corpus.path, PathBuf::from("flag.csv"));
    }

    #[test]
    fn test_date_or_today() {
        assert_eq!(
            date_or_today(Some("2024-02-29")).unwrap(),
            time::macros::date!(2024 - 02 - 29)
        );
        assert!(date_or_today(Some("2024-13-01")).is_err());
        assert!(date_or_today(None).is_ok());
    }
}
