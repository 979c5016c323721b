//! In-memory inverted index and keyword search.
//!
//! Terms come from lowercased title and body text split on non-alphanumeric
//! boundaries. Postings record term frequency and whether the term appears
//! in the title, which gets a scoring boost. Building the index from the
//! same documents is deterministic.

use crate::config::{MIN_TOKEN_LEN, STOPWORDS};
use crate::document::Document;
use crate::error::{KbError, Result};
use std::collections::HashMap;

/// A single posting: one term's occurrences in one document.
#[derive(Debug, Clone, Copy)]
struct Posting {
    /// Ordinal of the document in the catalog's document vector.
    doc: usize,
    /// Term frequency in the body.
    tf: u32,
    /// Whether the term occurs in the title.
    in_title: bool,
}

/// A ranked search hit, by document ordinal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ordinal of the matching document.
    pub doc: usize,
    /// Relevance score, normalized to 0-1 within the result set.
    pub score: f64,
}

/// Inverted term-to-postings index over a set of documents.
#[derive(Debug, Default)]
pub struct Index {
    postings: HashMap<String, Vec<Posting>>,
    stopwords: Vec<String>,
    term_count: usize,
}

/// Score multiplier for terms that occur in the title.
const TITLE_BOOST: f64 = 3.0;

/// Split text into normalized index terms.
pub fn tokenize(text: &str, extra_stopwords: &[String]) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .filter(|t| !STOPWORDS.contains(t))
        .filter(|t| !extra_stopwords.iter().any(|s| s == t))
        .map(str::to_string)
        .collect()
}

impl Index {
    /// Build the index over all documents, in document order.
    #[must_use]
    pub fn build(documents: &[Document], extra_stopwords: &[String]) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();

        for (ordinal, doc) in documents.iter().enumerate() {
            let mut freqs: HashMap<String, u32> = HashMap::new();
            for term in tokenize(&doc.body, extra_stopwords) {
                *freqs.entry(term).or_insert(0) += 1;
            }

            // Title terms always index, even when absent from the body.
            let title_terms: Vec<String> = tokenize(&doc.title, extra_stopwords);
            for term in &title_terms {
                freqs.entry(term.clone()).or_insert(0);
            }

            for (term, tf) in freqs {
                let in_title = title_terms.contains(&term);
                postings
                    .entry(term)
                    .or_default()
                    .push(Posting { doc: ordinal, tf, in_title });
            }
        }

        let term_count = postings.len();
        Self {
            postings,
            stopwords: extra_stopwords.to_vec(),
            term_count,
        }
    }

    /// Number of distinct terms in the index.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.term_count
    }

    /// Whether a single normalized term is present in the index.
    #[must_use]
    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(&term.to_lowercase())
    }

    /// Ranked OR search across all query terms.
    ///
    /// Returns hits sorted by descending score, normalized so the best hit
    /// scores 1.0. Unknown terms contribute nothing; a query with no usable
    /// terms is a `BadQuery` error.
    pub fn search(&self, query: &str) -> Result<Vec<Hit>> {
        let terms = tokenize(query, &self.stopwords);
        if terms.is_empty() {
            return Err(KbError::BadQuery(format!(
                "No searchable terms in query: {query:?}"
            )));
        }

        let mut scores: HashMap<usize, f64> = HashMap::new();
        for term in &terms {
            let Some(list) = self.postings.get(term) else {
                continue;
            };
            for posting in list {
                let mut score = f64::from(posting.tf.max(1));
                if posting.in_title {
                    score *= TITLE_BOOST;
                }
                *scores.entry(posting.doc).or_insert(0.0) += score;
            }
        }

        let max = scores.values().fold(0.0_f64, |acc, s| acc.max(*s));
        let mut hits: Vec<Hit> = scores
            .into_iter()
            .map(|(doc, score)| Hit {
                doc,
                score: if max > 0.0 { score / max } else { 0.0 },
            })
            .collect();

        // Descending score, ties broken by document order for stable output.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.doc.cmp(&b.doc))
        });

        Ok(hits)
    }
}
