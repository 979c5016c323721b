//! Command-line interface definitions.

use clap::{Parser, Subcommand, ValueEnum};

/// Query Knowledge Base - catalog and keyword search for markdown articles.
#[derive(Parser, Debug)]
#[command(name = "qkb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory of the article tree (overrides the config file).
    #[arg(short, long, global = true)]
    pub root: Option<String>,

    /// Glob pattern for article files (default: **/*.md).
    #[arg(short, long, global = true)]
    pub pattern: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all documents, or the documents of one category.
    List {
        /// Category name (e.g., "01-React-Core-Advanced").
        category: Option<String>,
    },

    /// List categories with document counts.
    Categories,

    /// Show a document by id or docid (#abc123).
    Show {
        /// Document id (category/slug) or docid handle.
        id: String,

        /// Starting line number.
        #[arg(short = 'f', long)]
        from_line: Option<usize>,

        /// Maximum lines to show.
        #[arg(short = 'l', long)]
        max_lines: Option<usize>,

        /// Show line numbers.
        #[arg(short = 'n', long)]
        line_numbers: bool,

        /// Render the document as HTML instead of raw markdown.
        #[arg(long)]
        html: bool,
    },

    /// Keyword search across titles and bodies.
    Search {
        /// Search query.
        query: String,

        /// Restrict to a category.
        #[arg(short, long)]
        category: Option<String>,

        /// Number of results.
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Minimum score threshold.
        #[arg(long)]
        min_score: Option<f64>,

        /// Show full document content.
        #[arg(long)]
        full: bool,

        /// Output format.
        #[arg(long, value_enum, default_value = "cli")]
        format: OutputFormat,
    },

    /// Show catalog status: counts, categories, load warnings.
    Status,

    /// Serve the catalog over HTTP.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8383")]
        addr: String,
    },
}

/// Output format options.
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    /// CLI-friendly output.
    #[default]
    Cli,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
    /// Markdown output.
    Md,
    /// Just document ids.
    Files,
}
