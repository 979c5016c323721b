//! End-to-end catalog behavior over a realistic article tree.

use qkb::catalog::Catalog;
use std::fs;
use std::path::Path;

fn write_article_tree(root: &Path) {
    let react = root.join("01-React-Core-Advanced");
    fs::create_dir_all(&react).unwrap();
    fs::write(
        react.join("custom-hooks-form-handling.md"),
        "# Custom hooks for form handling\n\n\
         ## Question\n\nHow do you build a reusable form hook?\n\n\
         ## Answer\n\n```jsx\nconst useForm = (initial) => { /* ... */ };\n```\n",
    )
    .unwrap();
    fs::write(
        react.join("usememo-vs-usecallback.md"),
        "# useMemo vs useCallback - difference and use cases\n\n\
         useMemo caches a computed value, useCallback caches a function.\n",
    )
    .unwrap();
    fs::write(
        react.join("hooks-behavior-usememo.md"),
        "# React Hooks Behavior Scenarios - useMemo\n\n\
         Scenario walkthroughs for dependency arrays.\n",
    )
    .unwrap();

    let nextjs = root.join("04-NextJS");
    fs::create_dir_all(&nextjs).unwrap();
    fs::write(
        nextjs.join("ssr-vs-ssg.md"),
        "# SSR vs SSG in Next.js\n\nRendering strategies compared.\n",
    )
    .unwrap();
}

#[test]
fn loads_every_article_and_round_trips_by_id() {
    let dir = tempfile::tempdir().unwrap();
    write_article_tree(dir.path());

    let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();
    assert_eq!(catalog.all().len(), 4);
    assert!(catalog.warnings().is_empty());

    for doc in catalog.all() {
        let fetched = catalog.get(&doc.id).expect("document by its own id");
        assert_eq!(fetched.title, doc.title);
    }
}

#[test]
fn category_listing_matches_directory_layout() {
    let dir = tempfile::tempdir().unwrap();
    write_article_tree(dir.path());

    let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();
    let docs = catalog.list_category("01-React-Core-Advanced").unwrap();

    assert_eq!(docs.len(), 3);
    assert!(docs
        .iter()
        .any(|d| d.title.contains("Custom hooks for form handling")));
}

#[test]
fn usememo_search_finds_both_articles() {
    let dir = tempfile::tempdir().unwrap();
    write_article_tree(dir.path());

    let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();
    let hits = catalog.search("useMemo", 10).unwrap();

    let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
    assert!(titles
        .iter()
        .any(|t| t.contains("useMemo vs useCallback")));
    assert!(titles
        .iter()
        .any(|t| t.contains("React Hooks Behavior Scenarios")));
}

#[test]
fn unreadable_file_is_skipped_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    write_article_tree(dir.path());

    // Invalid UTF-8 payload in a matching file.
    fs::write(
        dir.path().join("01-React-Core-Advanced").join("corrupt.md"),
        [0xff, 0xfe, 0x00, 0x80],
    )
    .unwrap();

    let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();
    assert_eq!(catalog.all().len(), 4);
    assert_eq!(catalog.warnings().len(), 1);
    assert!(catalog.warnings()[0].path.contains("corrupt.md"));
}

#[cfg(unix)]
#[test]
fn dangling_symlink_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_article_tree(dir.path());

    std::os::unix::fs::symlink("/no/such/target", dir.path().join("broken-link")).unwrap();

    let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();
    assert_eq!(catalog.all().len(), 4);
    assert_eq!(catalog.warnings().len(), 1);
    assert!(catalog.warnings()[0].path.contains("broken-link"));
}

#[test]
fn missing_root_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    assert!(Catalog::load(&missing, "**/*.md", &[]).is_err());
}

#[test]
fn tags_come_from_section_headings() {
    let dir = tempfile::tempdir().unwrap();
    write_article_tree(dir.path());

    let catalog = Catalog::load(dir.path(), "**/*.md", &[]).unwrap();
    let doc = catalog
        .get("01-react-core-advanced/custom-hooks-form-handling")
        .unwrap();
    assert_eq!(doc.tags, vec!["Question", "Answer"]);
}
