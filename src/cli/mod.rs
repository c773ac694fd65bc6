//! Command-line interface for rewa.
//!
//! Provides commands for searching the catalogs, adding results to the
//! list, creating items from JSON payloads, and browsing the list.

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::{NewItem, SearchResults, Services};
use crate::domain::{Category, ItemId, NewBook, NewVideo};
use crate::widget::{SearchSession, Selection, SessionState};

/// rewa - keep track of what you want to read and watch
#[derive(Parser, Debug)]
#[command(name = "rewa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the book and video catalogs
    Search {
        /// Search term
        term: String,
    },

    /// Search, then add one result to the list
    Add {
        /// Which column to pick from
        #[arg(value_enum)]
        category: CategoryArg,

        /// Search term
        term: String,

        /// Position of the result (as shown by `search`)
        #[arg(short, long, default_value = "0")]
        pick: usize,
    },

    /// Create a book from a JSON payload
    CreateBook {
        /// Payload file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Create a video from a JSON payload
    CreateVideo {
        /// Payload file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Add an existing catalog item to the list
    Link {
        /// Catalog item ID
        id: String,

        #[arg(value_enum)]
        category: CategoryArg,
    },

    /// Show the list
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Interactive search: each line is the search box value
    Session,

    /// Show resolved configuration (debug)
    Config,
}

/// Category for CLI (maps to Category)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Book,
    Video,
}

impl From<CategoryArg> for Category {
    fn from(c: CategoryArg) -> Self {
        match c {
            CategoryArg::Book => Category::Book,
            CategoryArg::Video => Category::Video,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        if let Commands::Config = self.command {
            return show_config();
        }

        let config = crate::config::config()?;
        let services = Services::from_config(config)?;

        match self.command {
            Commands::Search { term } => search(&services, &term).await,
            Commands::Add {
                category,
                term,
                pick,
            } => add(&services, category.into(), &term, pick).await,
            Commands::CreateBook { input } => create_book(&services, input),
            Commands::CreateVideo { input } => create_video(&services, input),
            Commands::Link { id, category } => link(&services, &id, category.into()),
            Commands::List { json } => list(&services, json),
            Commands::Session => session(services).await,
            Commands::Config => show_config(),
        }
    }
}

/// Read a payload from a file or stdin
fn read_payload(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read payload file: {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

fn print_results(results: &SearchResults) {
    if results.is_empty() {
        println!("No results");
        return;
    }

    println!("BOOKS");
    for (idx, book) in results.books.iter().enumerate() {
        let info = &book.volume_info;
        let year = book
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_default();
        println!("  [{}] {:<50} {:>4}", idx, truncate(&info.title, 50), year);
        if !info.authors.is_empty() {
            println!("      By {}", info.authors.join(", "));
        }
    }

    println!("\nVIDEOS");
    for (idx, video) in results.videos.iter().enumerate() {
        let year = video
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_default();
        println!("  [{}] {:<50} {:>4}", idx, truncate(&video.title, 50), year);
        if let Some(genres) = video.genres.as_deref().filter(|g| !g.is_empty()) {
            println!("      {}", truncate(genres, 60));
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

async fn search(services: &Services, term: &str) -> Result<()> {
    let results = services.search(term).await;
    print_results(&results);
    Ok(())
}

async fn add(services: &Services, category: Category, term: &str, pick: usize) -> Result<()> {
    let results = services.search(term).await;

    let item = match category {
        Category::Book => results
            .books
            .get(pick)
            .map(|c| NewItem::Book(c.to_new_book())),
        Category::Video => results
            .videos
            .get(pick)
            .map(|c| NewItem::Video(c.to_new_video())),
    }
    .with_context(|| format!("No {} result at position {} for '{}'", category, pick, term))?;

    let title = item.title().to_string();
    let outcome = services.ingest(item)?;
    println!("Added {} '{}' ({})", outcome.category, title, outcome.item_id);
    Ok(())
}

fn create_book(services: &Services, input: Option<PathBuf>) -> Result<()> {
    let payload = NewBook::from_json(&read_payload(input)?)?;
    let book = services.create_book(payload)?;
    println!("{}", serde_json::to_string_pretty(&book)?);
    Ok(())
}

fn create_video(services: &Services, input: Option<PathBuf>) -> Result<()> {
    let payload = NewVideo::from_json(&read_payload(input)?)?;
    let video = services.create_video(payload)?;
    println!("{}", serde_json::to_string_pretty(&video)?);
    Ok(())
}

fn link(services: &Services, id: &str, category: Category) -> Result<()> {
    let entry = services.add_to_list(&ItemId::from(id), category)?;
    println!("Added {} {} to list ({})", category, entry.item_id, entry.id);
    Ok(())
}

fn list(services: &Services, json: bool) -> Result<()> {
    let items = services.get_list_items()?;

    if json {
        let items: Vec<_> = items.into_iter().map(|(_, item)| item).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Your list is empty");
        return Ok(());
    }

    println!("{:<7} {:<50} {:<6} {:<20}", "TYPE", "TITLE", "YEAR", "ADDED");
    println!("{}", "-".repeat(85));

    for (entry, item) in items {
        let year = item
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_default();
        println!(
            "{:<7} {:<50} {:<6} {:<20}",
            item.category(),
            truncate(item.title(), 50),
            year,
            entry.added_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Interactive session on stdin.
///
/// Plain lines replace the search box value. `:book N` / `:video N` pick a
/// result, `:list` shows the list, `:quit` exits.
async fn session(services: Services) -> Result<()> {
    let mut session = SearchSession::new(services);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Type to search; :book N / :video N to add, :list, :quit");

    loop {
        let deadline = session
            .deadline()
            .map(tokio::time::Instant::from_std)
            .unwrap_or_else(|| tokio::time::Instant::now() + std::time::Duration::from_secs(3600));

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if !handle_line(&mut session, line.trim_end())? {
                    break;
                }
            }
            _ = tokio::time::sleep_until(deadline), if session.deadline().is_some() => {
                if let Some(ticket) = session.poll(Instant::now()) {
                    if session.run_query(&ticket).await {
                        print_results(session.results());
                    }
                }
            }
        }
    }

    Ok(())
}

/// Returns false when the session should end
fn handle_line(session: &mut SearchSession, line: &str) -> Result<bool> {
    let Some(command) = line.strip_prefix(':') else {
        session.input(line, Instant::now());
        return Ok(true);
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit") | Some("q"), _) => return Ok(false),
        (Some("list"), _) => {
            let services = session.services().clone();
            let entries = session.list_view().entries(&services)?;
            println!("{} item(s) on your list", entries.len());
            for entry in entries {
                println!("  {} {}", entry.category, entry.item_id);
            }
        }
        (Some(kind @ ("book" | "video")), Some(index)) => {
            if session.state() != SessionState::ResultsShown {
                eprintln!("No results to pick from");
                return Ok(true);
            }
            let index: usize = index
                .parse()
                .with_context(|| format!("Invalid result position: {}", index))?;
            let selection = if kind == "book" {
                Selection::Book(index)
            } else {
                Selection::Video(index)
            };
            match session.select(selection) {
                Ok(outcome) => println!("Added {} {}", outcome.category, outcome.item_id),
                Err(e) => eprintln!("Could not add: {}", e),
            }
        }
        _ => eprintln!("Unknown command: {}", line),
    }

    Ok(true)
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = crate::config::reload_config()?;

    println!("Config file: {}", match &config.config_file {
        Some(path) => path.display().to_string(),
        None => "(none)".to_string(),
    });
    println!("Home:        {}", config.home.display());
    println!("Database:    {}", config.database.display());
    println!("User:        {}", config.user);
    println!("Google Books: {} (key: {})", config.providers.google_books_url,
        if config.providers.google_books_key.is_some() { "set" } else { "unset" });
    println!("IMDB:        {} (key: {})", config.providers.imdb_url,
        if config.providers.imdb_key.is_some() { "set" } else { "unset" });
    println!("Debounce:    {}ms", config.search.debounce_ms);
    println!("Limits:      {} books, {} videos", config.search.book_limit, config.search.video_limit);
    println!("Authors:     {:?}", config.ingest.unresolved_authors);
    println!("Link failure: {:?}", config.ingest.link_failure);

    Ok(())
}
