//! Output formatting utilities.

use crate::catalog::SearchHit;
use crate::cli::OutputFormat;
use crate::document::Document;
use chrono::{Datelike, Timelike};
use colored::Colorize;

/// Format search results for output.
pub fn format_search_results(hits: &[SearchHit], format: &OutputFormat, full: bool) {
    match format {
        OutputFormat::Json => print_search_json(hits),
        OutputFormat::Csv => print_search_csv(hits),
        OutputFormat::Md => print_search_md(hits, full),
        OutputFormat::Files => print_search_files(hits),
        OutputFormat::Cli => print_search_cli(hits, full),
    }
}

fn print_search_json(hits: &[SearchHit]) {
    println!(
        "{}",
        serde_json::to_string_pretty(hits).unwrap_or_default()
    );
}

fn print_search_csv(hits: &[SearchHit]) {
    println!("docid,score,id,category,title,snippet");
    for hit in hits {
        println!(
            "{},{:.4},{},{},{},{}",
            escape_csv(&format!("#{}", hit.docid)),
            hit.score,
            escape_csv(&hit.id),
            escape_csv(&hit.category),
            escape_csv(&hit.title),
            escape_csv(&hit.snippet)
        );
    }
}

fn print_search_md(hits: &[SearchHit], full: bool) {
    for hit in hits {
        println!("## {} (score: {:.4})\n", hit.id, hit.score);
        println!("**Title:** {}\n", hit.title);
        println!("**Category:** {}\n", hit.category);
        if full {
            if let Some(ref body) = hit.body {
                println!("```\n{body}\n```\n");
            }
        } else if !hit.snippet.is_empty() {
            println!("> {}\n", hit.snippet.replace('\n', "\n> "));
        }
    }
}

fn print_search_files(hits: &[SearchHit]) {
    for hit in hits {
        println!("{}", hit.id);
    }
}

fn print_search_cli(hits: &[SearchHit], full: bool) {
    if hits.is_empty() {
        println!("{}", "No results found.".dimmed());
        return;
    }

    for hit in hits {
        println!(
            "{} {} {}",
            format!("#{}", hit.docid).cyan(),
            format!("{:.2}", hit.score).dimmed(),
            hit.id.bold()
        );
        if !hit.title.is_empty() {
            println!("  {}", hit.title);
        }
        if full {
            if let Some(ref body) = hit.body {
                println!("\n{body}\n");
            }
        } else if !hit.snippet.is_empty() {
            for line in hit.snippet.lines().take(3) {
                println!("  {}", line.dimmed());
            }
        }
        println!();
    }
}

/// Print a document listing like `ls -l`.
pub fn print_document_list(docs: &[&Document]) {
    let max_size = docs
        .iter()
        .map(|d| format_bytes(d.size).len())
        .max()
        .unwrap_or(0);

    for doc in docs {
        let size_str = format!("{:>width$}", format_bytes(doc.size), width = max_size);
        println!(
            "{}  {}  {}  {}",
            size_str,
            format_ls_time(&doc.modified_at),
            doc.id.cyan(),
            doc.title.dimmed()
        );
    }
}

/// Escape a string for CSV output.
#[must_use]
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Add line numbers to content.
#[must_use]
pub fn add_line_numbers(content: &str, start_line: usize) -> String {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:>6}\t{line}", start_line + i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format bytes into human-readable size.
#[must_use]
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    }
}

/// Format time ago.
#[must_use]
pub fn format_time_ago(timestamp: &str) -> String {
    let Ok(dt) = chrono::DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };

    let now = chrono::Utc::now();
    let duration = now.signed_duration_since(dt);

    let seconds = duration.num_seconds();
    if seconds < 60 {
        return format!("{seconds}s ago");
    }

    let minutes = duration.num_minutes();
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }

    let days = duration.num_days();
    format!("{days}d ago")
}

/// Format date/time like ls -l.
#[must_use]
pub fn format_ls_time(timestamp: &str) -> String {
    let Ok(dt) = chrono::DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };

    let now = chrono::Utc::now();
    let six_months_ago = now - chrono::Duration::days(180);

    let months = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let month = months[dt.month0() as usize];
    let day = dt.day();

    if dt < six_months_ago {
        format!("{month} {day:>2}  {}", dt.year())
    } else {
        format!("{month} {day:>2} {:02}:{:02}", dt.hour(), dt.minute())
    }
}
