//! The immutable in-memory catalog and its shared handle.
//!
//! A [`Catalog`] is built once from a directory tree and never mutated;
//! concurrent readers need no locks. [`SharedCatalog`] supports reloading by
//! building a complete new catalog and swapping the reference, so in-flight
//! readers never observe a half-built index.

use crate::config::SNIPPET_MAX_CHARS;
use crate::document::{self, Document, LoadWarning};
use crate::error::{KbError, Result};
use crate::index::Index;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// A search result with document metadata and a context snippet.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Document id.
    pub id: String,
    /// Short docid handle.
    pub docid: String,
    /// Document title.
    pub title: String,
    /// Document category.
    pub category: String,
    /// Relevance score (0-1).
    pub score: f64,
    /// Snippet around the first query term occurrence.
    pub snippet: String,
    /// Line number where the snippet starts.
    pub line: usize,
    /// Full body, only populated on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Per-category document count.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    /// Category name (slugified directory name).
    pub name: String,
    /// Number of documents in the category.
    pub count: usize,
}

/// Catalog summary for the status command and health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    /// Total loaded documents.
    pub total_documents: usize,
    /// Categories with counts, in insertion order.
    pub categories: Vec<CategoryInfo>,
    /// Distinct terms in the index.
    pub term_count: usize,
    /// Files skipped during the load.
    pub warning_count: usize,
    /// When the catalog was built, RFC 3339.
    pub loaded_at: String,
}

/// The immutable collection of all loaded documents plus their index.
#[derive(Debug)]
pub struct Catalog {
    documents: Vec<Document>,
    by_id: HashMap<String, usize>,
    by_docid: HashMap<String, usize>,
    categories: Vec<String>,
    index: Index,
    warnings: Vec<LoadWarning>,
    loaded_at: String,
    root: PathBuf,
    pattern: String,
    stopwords: Vec<String>,
}

impl Catalog {
    /// Load a catalog from a directory tree and build its index.
    pub fn load(root: &Path, pattern: &str, extra_stopwords: &[String]) -> Result<Self> {
        let report = document::load_root(root, pattern)?;

        let mut documents = Vec::with_capacity(report.documents.len());
        let mut by_id = HashMap::new();
        let mut by_docid = HashMap::new();
        let mut categories = Vec::new();

        for mut doc in report.documents {
            // Distinct files can slugify to the same id; suffix the later ones.
            if by_id.contains_key(&doc.id) {
                let mut n = 2;
                while by_id.contains_key(&format!("{}-{n}", doc.id)) {
                    n += 1;
                }
                doc.id = format!("{}-{n}", doc.id);
            }

            let ordinal = documents.len();
            by_id.insert(doc.id.clone(), ordinal);
            by_docid.entry(doc.docid.clone()).or_insert(ordinal);
            if !categories.contains(&doc.category) {
                categories.push(doc.category.clone());
            }
            documents.push(doc);
        }

        let index = Index::build(&documents, extra_stopwords);

        Ok(Self {
            documents,
            by_id,
            by_docid,
            categories,
            index,
            warnings: report.warnings,
            loaded_at: chrono::Utc::now().to_rfc3339(),
            root: root.to_path_buf(),
            pattern: pattern.to_string(),
            stopwords: extra_stopwords.to_vec(),
        })
    }

    /// Get a document by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&i| &self.documents[i])
    }

    /// Get a document by its short docid handle.
    #[must_use]
    pub fn get_by_docid(&self, docid: &str) -> Option<&Document> {
        let clean = docid.trim_start_matches('#');
        self.by_docid.get(clean).map(|&i| &self.documents[i])
    }

    /// Resolve a reference that is either an id or a `#docid` handle.
    pub fn resolve(&self, reference: &str) -> Result<&Document> {
        let found = if document::is_docid(reference) {
            self.get_by_docid(reference)
        } else {
            self.get(&document::slugify_path(reference))
        };
        found.ok_or_else(|| KbError::DocumentNotFound(reference.to_string()))
    }

    /// All documents, in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Document] {
        &self.documents
    }

    /// Category names, in insertion order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Documents of one category, in insertion order.
    ///
    /// The category argument is slugified, so both `01-React-Core-Advanced`
    /// and `01-react-core-advanced` match.
    pub fn list_category(&self, category: &str) -> Result<Vec<&Document>> {
        let slug = document::slugify_path(category);
        if !self.categories.contains(&slug) {
            return Err(KbError::CategoryNotFound(category.to_string()));
        }
        Ok(self
            .documents
            .iter()
            .filter(|d| d.category == slug)
            .collect())
    }

    /// Ranked keyword search with snippets.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let hits = self.index.search(query)?;

        Ok(hits
            .into_iter()
            .take(limit)
            .map(|hit| {
                let doc = &self.documents[hit.doc];
                let (snippet, line) = extract_snippet(&doc.body, query, SNIPPET_MAX_CHARS);
                SearchHit {
                    id: doc.id.clone(),
                    docid: doc.docid.clone(),
                    title: doc.title.clone(),
                    category: doc.category.clone(),
                    score: hit.score,
                    snippet,
                    line,
                    body: None,
                }
            })
            .collect())
    }

    /// Load warnings recorded while building this catalog.
    #[must_use]
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// The root directory this catalog was loaded from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Catalog summary.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let categories = self
            .categories
            .iter()
            .map(|name| CategoryInfo {
                name: name.clone(),
                count: self.documents.iter().filter(|d| &d.category == name).count(),
            })
            .collect();

        CatalogStats {
            total_documents: self.documents.len(),
            categories,
            term_count: self.index.term_count(),
            warning_count: self.warnings.len(),
            loaded_at: self.loaded_at.clone(),
        }
    }
}

/// Shared handle over an immutable catalog, supporting atomic replacement.
#[derive(Clone)]
pub struct SharedCatalog {
    inner: Arc<RwLock<Arc<Catalog>>>,
}

impl SharedCatalog {
    /// Wrap a freshly built catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Get the current catalog snapshot.
    ///
    /// The returned `Arc` stays valid across reloads.
    #[must_use]
    pub fn current(&self) -> Arc<Catalog> {
        self.inner
            .read()
            .map_or_else(|e| Arc::clone(&e.into_inner()), |g| Arc::clone(&g))
    }

    /// Rebuild the catalog from its source tree and publish the result.
    ///
    /// The new catalog is fully built before the swap; a failed rebuild
    /// leaves the current snapshot in place.
    pub fn reload(&self) -> Result<CatalogStats> {
        let (root, pattern, stopwords) = {
            let current = self.current();
            (
                current.root.clone(),
                current.pattern.clone(),
                current.stopwords.clone(),
            )
        };

        let rebuilt = Catalog::load(&root, &pattern, &stopwords)?;
        let stats = rebuilt.stats();

        if let Ok(mut guard) = self.inner.write() {
            *guard = Arc::new(rebuilt);
        }
        Ok(stats)
    }
}

/// Extract a snippet around the first query term occurrence, extended to
/// line boundaries. Returns the snippet and its 1-based starting line.
#[must_use]
pub fn extract_snippet(body: &str, query: &str, max_chars: usize) -> (String, usize) {
    if body.len() <= max_chars {
        return (body.to_string(), 1);
    }

    let terms: Vec<String> = query
        .split_whitespace()
        .filter(|t| t.len() >= 3)
        .map(str::to_lowercase)
        .collect();

    let body_lower = body.to_lowercase();

    // Start shortly before the first matching term.
    let mut start_pos = 0;
    for term in &terms {
        if let Some(pos) = body_lower.find(term.as_str()) {
            start_pos = pos.saturating_sub(50);
            break;
        }
    }

    while !body.is_char_boundary(start_pos) {
        start_pos -= 1;
    }

    let line_start = body[..start_pos].rfind('\n').map_or(0, |p| p + 1);
    let mut end_pos = (line_start + max_chars).min(body.len());
    while !body.is_char_boundary(end_pos) {
        end_pos += 1;
    }
    let line_end = body[end_pos..].find('\n').map_or(body.len(), |p| end_pos + p);

    let line = body[..line_start].matches('\n').count() + 1;
    (body[line_start..line_end].to_string(), line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_tree(root: &Path) {
        let advanced = root.join("01-React-Core-Advanced");
        fs::create_dir_all(&advanced).unwrap();
        fs::write(
            advanced.join("custom-hooks-form-handling.md"),
            "# Custom hooks for form handling\n\nBuild a useForm hook.\n",
        )
        .unwrap();
        fs::write(
            advanced.join("usememo-vs-usecallback.md"),
            "# useMemo vs useCallback - difference and use cases\n\nBoth memoize.\n",
        )
        .unwrap();
        let routing = root.join("02-Routing");
        fs::create_dir_all(&routing).unwrap();
        fs::write(
            routing.join("nested-routes.md"),
            "# Nested routes in React Router\n\nOutlet renders children.\n",
        )
        .unwrap();
    }

    #[test]
    fn test_roundtrip_get_by_id() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();

        assert_eq!(catalog.all().len(), 3);
        for doc in catalog.all() {
            let fetched = catalog.get(&doc.id).unwrap();
            assert_eq!(fetched.docid, doc.docid);
            assert_eq!(fetched.body, doc.body);
        }
    }

    #[test]
    fn test_list_category_accepts_unslugged_name() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();

        let docs = catalog.list_category("01-React-Core-Advanced").unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs
            .iter()
            .any(|d| d.title.contains("Custom hooks for form handling")));
    }

    #[test]
    fn test_unknown_category_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();
        assert!(matches!(
            catalog.list_category("99-missing"),
            Err(KbError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn test_search_finds_title_terms() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();

        let hits = catalog.search("useMemo", 10).unwrap();
        assert!(!hits.is_empty());
        assert!(hits[0].title.contains("useMemo"));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let first = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();
        let second = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();

        assert_eq!(first.all().len(), second.all().len());
        let mut a: Vec<&str> = first.all().iter().map(|d| d.id.as_str()).collect();
        let mut b: Vec<&str> = second.all().iter().map(|d| d.id.as_str()).collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_by_docid_handle() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();

        let doc = catalog.all().first().unwrap();
        let resolved = catalog.resolve(&format!("#{}", doc.docid)).unwrap();
        assert_eq!(resolved.id, doc.id);

        assert!(matches!(
            catalog.resolve("no/such/doc"),
            Err(KbError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_shared_catalog_reload_swaps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let shared = SharedCatalog::new(Catalog::load(dir.path(), "**/*.md", &[]).unwrap());

        let before = shared.current();
        assert_eq!(before.all().len(), 3);

        fs::write(
            dir.path().join("02-Routing").join("loaders.md"),
            "# Route loaders\n\nData before render.\n",
        )
        .unwrap();

        let stats = shared.reload().unwrap();
        assert_eq!(stats.total_documents, 4);
        assert_eq!(shared.current().all().len(), 4);
        // The old snapshot is still intact for in-flight readers.
        assert_eq!(before.all().len(), 3);
    }

    #[test]
    fn test_snippet_centers_on_term() {
        let mut body = String::from("# Title\n\n");
        for i in 0..100 {
            body.push_str(&format!("filler line {i}\n"));
        }
        body.push_str("the useMemo hook caches computed values\n");
        for i in 0..100 {
            body.push_str(&format!("trailing line {i}\n"));
        }

        let (snippet, line) = extract_snippet(&body, "useMemo", 240);
        assert!(snippet.contains("useMemo"));
        assert!(line > 1);
    }
}
