//! QKB - Query Knowledge Base
//!
//! CLI entry point: loads the catalog from the article tree, then answers
//! list/show/search queries or serves the catalog over HTTP.

use clap::Parser;
use colored::Colorize;
use qkb::catalog::{Catalog, SharedCatalog};
use qkb::cli::{Cli, Commands, OutputFormat};
use qkb::config::{self, DEFAULT_GLOB};
use qkb::document;
use qkb::error::KbError;
use qkb::formatter::{add_line_numbers, format_bytes, format_search_results, format_time_ago, print_document_list};
use qkb::{render, server};
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{} {}", "Error:".red(), err);
        std::process::exit(exit_code(&err));
    }
}

/// Map errors to the documented exit codes: 1 for not found, 2 otherwise.
fn exit_code(err: &KbError) -> i32 {
    match err {
        KbError::DocumentNotFound(_) | KbError::CategoryNotFound(_) => 1,
        _ => 2,
    }
}

fn run(cli: Cli) -> qkb::Result<()> {
    let (root, pattern, stopwords) = resolve_load_options(cli.root, cli.pattern)?;

    match cli.command {
        Commands::List { category } => handle_list(&root, &pattern, &stopwords, category.as_deref()),
        Commands::Categories => handle_categories(&root, &pattern, &stopwords),
        Commands::Show {
            id,
            from_line,
            max_lines,
            line_numbers,
            html,
        } => handle_show(
            &root,
            &pattern,
            &stopwords,
            &id,
            from_line,
            max_lines,
            line_numbers,
            html,
        ),
        Commands::Search {
            query,
            category,
            limit,
            min_score,
            full,
            format,
        } => handle_search(
            &root,
            &pattern,
            &stopwords,
            &query,
            category.as_deref(),
            limit,
            min_score,
            full,
            &format,
        ),
        Commands::Status => handle_status(&root, &pattern, &stopwords),
        Commands::Serve { addr } => handle_serve(&root, &pattern, &stopwords, &addr),
    }
}

/// Resolve root, pattern, and stopwords from flags and the config file.
/// Flags win over the config file; the config file wins over defaults.
fn resolve_load_options(
    root_flag: Option<String>,
    pattern_flag: Option<String>,
) -> qkb::Result<(PathBuf, String, Vec<String>)> {
    let file_config = config::load_config()?;

    let root = root_flag
        .or(file_config.root)
        .unwrap_or_else(|| ".".to_string());
    let pattern = pattern_flag
        .or(file_config.pattern)
        .unwrap_or_else(|| DEFAULT_GLOB.to_string());

    Ok((PathBuf::from(root), pattern, file_config.stopwords))
}

fn load_catalog(root: &PathBuf, pattern: &str, stopwords: &[String]) -> qkb::Result<Catalog> {
    let catalog = Catalog::load(root, pattern, stopwords)?;
    for warning in catalog.warnings() {
        eprintln!(
            "{} Skipped {}: {}",
            "Warning:".yellow(),
            warning.path,
            warning.reason
        );
    }
    Ok(catalog)
}

fn handle_list(
    root: &PathBuf,
    pattern: &str,
    stopwords: &[String],
    category: Option<&str>,
) -> qkb::Result<()> {
    let catalog = load_catalog(root, pattern, stopwords)?;

    let docs = match category {
        Some(name) => catalog.list_category(name)?,
        None => catalog.all().iter().collect(),
    };

    if docs.is_empty() {
        println!("{}", "No documents found.".dimmed());
        return Ok(());
    }

    print_document_list(&docs);
    Ok(())
}

fn handle_categories(root: &PathBuf, pattern: &str, stopwords: &[String]) -> qkb::Result<()> {
    let catalog = load_catalog(root, pattern, stopwords)?;
    let stats = catalog.stats();

    if stats.categories.is_empty() {
        println!("{}", "No categories found.".dimmed());
        return Ok(());
    }

    println!("{}\n", "Categories:".bold());
    for cat in &stats.categories {
        let label = if cat.name.is_empty() { "(root)" } else { cat.name.as_str() };
        println!(
            "  {}  {}",
            label.cyan(),
            format!("({} docs)", cat.count).dimmed()
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_show(
    root: &PathBuf,
    pattern: &str,
    stopwords: &[String],
    id: &str,
    from_line: Option<usize>,
    max_lines: Option<usize>,
    line_numbers: bool,
    html: bool,
) -> qkb::Result<()> {
    let catalog = load_catalog(root, pattern, stopwords)?;
    let doc = catalog.resolve(id)?;

    if html {
        println!("{}", render::render_page(doc));
        return Ok(());
    }

    let mut body = doc.body.clone();
    let start_line = from_line.unwrap_or(1);

    if from_line.is_some() || max_lines.is_some() {
        let lines: Vec<&str> = body.lines().collect();
        let start = start_line.saturating_sub(1).min(lines.len());
        let end = max_lines.map_or(lines.len(), |n| (start + n).min(lines.len()));
        body = lines[start..end].join("\n");
    }

    if line_numbers {
        body = add_line_numbers(&body, start_line);
    }

    println!("{body}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_search(
    root: &PathBuf,
    pattern: &str,
    stopwords: &[String],
    query: &str,
    category: Option<&str>,
    limit: usize,
    min_score: Option<f64>,
    full: bool,
    format: &OutputFormat,
) -> qkb::Result<()> {
    let catalog = load_catalog(root, pattern, stopwords)?;

    // Filtering happens after scoring, so search wide and truncate last.
    let mut hits = catalog.search(query, usize::MAX)?;

    if let Some(name) = category {
        let slug = document::slugify_path(name);
        if !catalog.categories().contains(&slug) {
            return Err(KbError::CategoryNotFound(name.to_string()));
        }
        hits.retain(|h| h.category == slug);
    }

    if let Some(min) = min_score {
        hits.retain(|h| h.score >= min);
    }

    hits.truncate(limit);

    if full {
        for hit in &mut hits {
            if let Some(doc) = catalog.get(&hit.id) {
                hit.body = Some(doc.body.clone());
            }
        }
    }

    format_search_results(&hits, format, full);
    Ok(())
}

fn handle_status(root: &PathBuf, pattern: &str, stopwords: &[String]) -> qkb::Result<()> {
    let catalog = load_catalog(root, pattern, stopwords)?;
    let stats = catalog.stats();

    println!("{}\n", "QKB Status".bold());
    println!("Root:    {}", catalog.root().display());
    println!("Pattern: {pattern}");
    println!("Loaded:  {}\n", format_time_ago(&stats.loaded_at));

    println!("{}", "Documents".bold());
    println!("  Total:  {} articles", stats.total_documents);
    println!("  Terms:  {} indexed", stats.term_count);
    let total_bytes: usize = catalog.all().iter().map(|d| d.size).sum();
    println!("  Size:   {}", format_bytes(total_bytes));

    if stats.warning_count > 0 {
        println!(
            "  {} {} files skipped during load",
            "Warnings:".yellow(),
            stats.warning_count
        );
    }

    if stats.categories.is_empty() {
        println!("\n{}", "No categories found.".dimmed());
    } else {
        println!("\n{}", "Categories".bold());
        for cat in &stats.categories {
            let label = if cat.name.is_empty() { "(root)" } else { cat.name.as_str() };
            println!("  {}  {}", label.cyan(), format!("({} docs)", cat.count).dimmed());
        }
    }

    Ok(())
}

fn handle_serve(
    root: &PathBuf,
    pattern: &str,
    stopwords: &[String],
    addr: &str,
) -> qkb::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qkb=info".into()),
        )
        .init();

    let catalog = load_catalog(root, pattern, stopwords)?;
    let stats = catalog.stats();
    println!(
        "Serving {} documents in {} categories on http://{}",
        stats.total_documents,
        stats.categories.len(),
        addr
    );

    let shared = SharedCatalog::new(catalog);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(shared, addr))?;
    Ok(())
}
