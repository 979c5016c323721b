//! Document records and the directory loader.
//!
//! The loader walks a root directory, matches files against a glob pattern,
//! and produces one [`Document`] per readable markdown file. Files that
//! cannot be read or decoded are skipped and reported as warnings; only an
//! unreadable root aborts the load.

use crate::config::EXCLUDE_DIRS;
use crate::error::{KbError, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// One parsed markdown article.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Slugified relative path, unique within a catalog.
    pub id: String,
    /// Short content hash handle (first 6 hex chars of SHA-256).
    pub docid: String,
    /// Category derived from the top-level directory name.
    pub category: String,
    /// First H1/H2 heading, or the file stem if none.
    pub title: String,
    /// Section headings, deduplicated in document order.
    pub tags: Vec<String>,
    /// Raw markdown text.
    pub body: String,
    /// File modification time as RFC 3339.
    pub modified_at: String,
    /// Body length in bytes.
    pub size: usize,
}

/// A skipped file recorded during loading.
#[derive(Debug, Clone, Serialize)]
pub struct LoadWarning {
    /// Path of the file that was skipped.
    pub path: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of loading a directory tree.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Documents in discovery order.
    pub documents: Vec<Document>,
    /// Files skipped during the load.
    pub warnings: Vec<LoadWarning>,
}

/// Hash content using SHA-256.
#[must_use]
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Get a short docid from a hash (first 6 characters).
#[must_use]
pub fn get_docid(hash: &str) -> String {
    hash.chars().take(6).collect()
}

/// Check if a string looks like a docid handle (`abc123` or `#abc123`).
#[must_use]
pub fn is_docid(s: &str) -> bool {
    let clean = s.trim_start_matches('#');
    clean.len() == 6 && clean.chars().all(|c| c.is_ascii_hexdigit())
}

/// Extract the title from markdown content.
#[must_use]
pub fn extract_title(content: &str) -> String {
    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("# ") {
            return rest.trim().to_string();
        }
        if let Some(rest) = trimmed.strip_prefix("## ") {
            return rest.trim().to_string();
        }
    }
    String::new()
}

/// Extract section headings as tags.
#[must_use]
pub fn extract_tags(content: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut in_code_block = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("## ") {
            let tag = rest.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}

/// Slugify a relative path to a stable, token-friendly id.
#[must_use]
pub fn slugify_path(path: &str) -> String {
    path.trim_end_matches(".md")
        .to_lowercase()
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let cleaned: String = segment
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { '-' })
                .collect();
            cleaned.trim_matches('-').to_string()
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Check if a path should be excluded from loading.
#[must_use]
pub fn should_exclude(path: &Path) -> bool {
    for component in path.components() {
        if let std::path::Component::Normal(name) = component {
            let name_str = name.to_string_lossy();
            if name_str.starts_with('.') || EXCLUDE_DIRS.contains(&name_str.as_ref()) {
                return true;
            }
        }
    }
    false
}

/// Load all matching documents under a root directory.
pub fn load_root(root: &Path, glob_pattern: &str) -> Result<LoadReport> {
    if !root.is_dir() {
        return Err(KbError::Config(format!(
            "Not a readable directory: {}",
            root.display()
        )));
    }

    let matcher = glob::Pattern::new(glob_pattern)?;
    let mut report = LoadReport::default();

    for entry in WalkDir::new(root).sort_by_file_name().follow_links(true) {
        // Traversal errors (unreadable subdirectory, dangling symlink)
        // are reported and skipped, same as unreadable files.
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().map_or_else(
                    || root.display().to_string(),
                    |p| p.strip_prefix(root).unwrap_or(p).display().to_string(),
                );
                report.warnings.push(LoadWarning {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let rel_path = path.strip_prefix(root).unwrap_or(path);
        if should_exclude(rel_path) {
            continue;
        }

        let rel_path_str = rel_path.to_string_lossy();
        if !matcher.matches(&rel_path_str) {
            continue;
        }

        let body = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                report.warnings.push(LoadWarning {
                    path: rel_path_str.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        report.documents.push(build_document(&rel_path_str, body, file_mtime(path)));
    }

    Ok(report)
}

/// Build a document record from a relative path and its content.
fn build_document(rel_path: &str, body: String, modified_at: String) -> Document {
    let id = slugify_path(rel_path);
    let hash = hash_content(&body);

    let category = id
        .split('/')
        .next()
        .filter(|_| id.contains('/'))
        .unwrap_or("")
        .to_string();

    let mut title = extract_title(&body);
    if title.is_empty() {
        title = id.rsplit('/').next().unwrap_or(&id).to_string();
    }

    let size = body.len();
    let tags = extract_tags(&body);

    Document {
        id,
        docid: get_docid(&hash),
        category,
        title,
        tags,
        body,
        modified_at,
        size,
    }
}

/// File mtime as RFC 3339, falling back to the current time.
fn file_mtime(path: &Path) -> String {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339())
        .unwrap_or_else(|_| chrono::Utc::now().to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_h1() {
        let content = "# useMemo vs useCallback\n\nBody text.";
        assert_eq!(extract_title(content), "useMemo vs useCallback");
    }

    #[test]
    fn test_extract_title_h2_fallback() {
        let content = "Intro line\n\n## Question\n\nBody.";
        assert_eq!(extract_title(content), "Question");
    }

    #[test]
    fn test_extract_title_missing() {
        assert_eq!(extract_title("plain text only"), "");
    }

    #[test]
    fn test_extract_tags_skips_code_blocks() {
        let content = "# Title\n\n## Setup\n```js\n## not a heading\n```\n## Usage\n## Setup\n";
        assert_eq!(extract_tags(content), vec!["Setup", "Usage"]);
    }

    #[test]
    fn test_slugify_path() {
        assert_eq!(
            slugify_path("01-React-Core-Advanced/custom-hooks-form-handling.md"),
            "01-react-core-advanced/custom-hooks-form-handling"
        );
        assert_eq!(slugify_path("Notes/My File (v2).md"), "notes/my-file--v2");
    }

    #[test]
    fn test_docid_shape() {
        let hash = hash_content("hello");
        let docid = get_docid(&hash);
        assert_eq!(docid.len(), 6);
        assert!(is_docid(&docid));
        assert!(is_docid(&format!("#{docid}")));
        assert!(!is_docid("not-a-docid"));
    }

    #[test]
    fn test_should_exclude() {
        assert!(should_exclude(Path::new("node_modules/pkg/readme.md")));
        assert!(should_exclude(Path::new(".git/config")));
        assert!(!should_exclude(Path::new("01-react/hooks.md")));
    }
}
