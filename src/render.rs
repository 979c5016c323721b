//! Markdown to HTML rendering.

use crate::document::Document;
use pulldown_cmark::{html, Options, Parser};

/// Convert markdown to an HTML fragment.
///
/// Tables, strikethrough, and footnotes are enabled since the article
/// corpus uses all three.
#[must_use]
pub fn render_body(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Render a document as a minimal standalone HTML page.
#[must_use]
pub fn render_page(doc: &Document) -> String {
    let body = render_body(&doc.body);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ max-width: 46rem; margin: 2rem auto; padding: 0 1rem; font-family: sans-serif; line-height: 1.6; }}
pre {{ background: #f4f4f4; padding: 0.8rem; overflow-x: auto; }}
code {{ background: #f4f4f4; padding: 0.1rem 0.3rem; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #ccc; padding: 0.3rem 0.6rem; }}
</style>
</head>
<body>
<p><small>{category} &middot; #{docid}</small></p>
{body}
</body>
</html>
"#,
        title = escape_html(&doc.title),
        category = escape_html(&doc.category),
        docid = escape_html(&doc.docid),
        body = body,
    )
}

/// Escape a string for use in HTML text content or attributes.
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_body_heading_and_code() {
        let html = render_body("# Hooks\n\n```js\nconst [n] = useState(0);\n```\n");
        assert!(html.contains("<h1>Hooks</h1>"));
        assert!(html.contains("<code"));
        assert!(html.contains("useState"));
    }

    #[test]
    fn test_render_body_table() {
        let html = render_body("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_render_page_escapes_title() {
        let doc = Document {
            id: "cat/doc".to_string(),
            docid: "abc123".to_string(),
            category: "cat".to_string(),
            title: "a < b".to_string(),
            tags: Vec::new(),
            body: "body".to_string(),
            modified_at: "2026-01-01T00:00:00+00:00".to_string(),
            size: 4,
        };
        let page = render_page(&doc);
        assert!(page.contains("<title>a &lt; b</title>"));
    }
}
