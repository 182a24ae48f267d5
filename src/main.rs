mod builder;
mod config;
mod db;
mod fetch;
mod parser;
mod snippets;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use config::Settings;
use snippets::SaveRequest;

#[derive(Parser)]
#[command(
    name = "snippet_importer",
    about = "Import code snippets from a docs page and manage them as one PHP file"
)]
struct Cli {
    /// Settings file (default: ./snippets.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the docs page and replace the parsed snippet set
    Refresh,
    /// Parse HTML saved from the docs page (use - for stdin)
    Import { file: PathBuf },
    /// Search parsed snippets by location
    Search {
        /// Case-insensitive filter; under 2 characters lists everything
        query: Option<String>,
        #[arg(short = 'n', long, default_value = "200")]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show one parsed snippet by its full path
    Show {
        path: String,
        #[arg(long)]
        json: bool,
    },
    /// Add or update a saved snippet
    Add {
        /// Prefill title, id and code from a parsed snippet path
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// File holding the code (use - for stdin)
        #[arg(long)]
        code_file: Option<PathBuf>,
    },
    /// Delete a saved snippet
    Delete { id: String },
    /// List saved snippets
    List,
    /// Rebuild the snippets file from saved snippets
    Build,
    /// Show import and snippet counts
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    let conn = db::connect(&settings.db_path)?;
    db::init_schema(&conn)?;

    let result = match cli.command {
        Commands::Refresh => {
            let n = snippets::import_from_url(&conn, &settings).await?;
            println!("Imported {} snippets from docs.", n);
            Ok(())
        }
        Commands::Import { file } => {
            let html = read_input(&file)?;
            let source = source_label(&file);
            let n = snippets::import_from_html(&conn, &settings, &html, &source)?;
            println!("Imported {} snippets from {}.", n, source);
            Ok(())
        }
        Commands::Search { query, limit, json } => {
            let parsed = db::fetch_parsed(&conn)?;
            if parsed.is_empty() {
                println!("No snippets imported yet. Run 'refresh' first.");
                return Ok(());
            }
            let hits = snippets::search(
                &parsed,
                query.as_deref().unwrap_or(""),
                settings.boilerplate(),
                limit,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                for (i, hit) in hits.iter().enumerate() {
                    println!("{:>3} | {}", i + 1, hit.label);
                }
                println!("\n{} of {} snippets", hits.len(), parsed.len());
            }
            Ok(())
        }
        Commands::Show { path, json } => {
            match snippets::get_parsed(&conn, &settings, &path)? {
                Some(s) if json => println!("{}", serde_json::to_string_pretty(&s)?),
                Some(s) => {
                    println!("Title: {}", s.title);
                    println!("ID:    {}", s.id);
                    println!("Path:  {}", s.path);
                    println!("\n{}", s.code);
                }
                None => anyhow::bail!("Not found: {}", path),
            }
            Ok(())
        }
        Commands::Add {
            from,
            id,
            title,
            code_file,
        } => {
            let mut req = SaveRequest::default();
            if let Some(path) = from {
                let parsed = snippets::get_parsed(&conn, &settings, &path)?
                    .with_context(|| format!("Not found: {}", path))?;
                req = SaveRequest {
                    id: Some(parsed.id),
                    title: parsed.title,
                    code: parsed.code,
                };
            }
            if id.is_some() {
                req.id = id;
            }
            if let Some(t) = title {
                req.title = t;
            }
            if let Some(f) = code_file {
                req.code = read_input(&f)?;
            }
            let outcome = snippets::save(&conn, &settings, req)?;
            let verb = if outcome.updated { "updated" } else { "added" };
            println!("Snippet {} ({}).", verb, outcome.id);
            println!("Wrote {}", settings.output_path.display());
            Ok(())
        }
        Commands::Delete { id } => {
            let removed = snippets::delete(&conn, &settings, &id)?;
            println!("{}", if removed { "Snippet deleted." } else { "Snippet not found." });
            Ok(())
        }
        Commands::List => {
            let saved = db::fetch_saved(&conn)?;
            if saved.is_empty() {
                println!("No snippets added yet.");
                return Ok(());
            }
            println!("{:>3} | {:<40} | {:<40}", "#", "Title", "ID");
            println!("{}", "-".repeat(90));
            for (i, s) in saved.iter().enumerate() {
                println!("{:>3} | {:<40} | {:<40}", i + 1, truncate(&s.title, 40), truncate(&s.id, 40));
            }
            println!("\n{} snippets | file: {}", saved.len(), settings.output_path.display());
            Ok(())
        }
        Commands::Build => {
            snippets::rebuild(&conn, &settings)?;
            println!("Wrote {}", settings.output_path.display());
            Ok(())
        }
        Commands::Stats => {
            let s = db::get_stats(&conn)?;
            println!("Parsed:  {}", s.parsed);
            println!("Saved:   {}", s.saved);
            println!("Imports: {}", s.imports);
            if let Some(last) = s.last_import {
                println!(
                    "Last:    {} snippets from {} at {}",
                    last.count, last.source, last.imported_at
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn source_label(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
