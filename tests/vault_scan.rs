//! Vault document-store tests: glob filtering, scope prefixes, ordering.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use vault_recall::config::VaultConfig;
use vault_recall::vault;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

fn config(root: &Path) -> VaultConfig {
    VaultConfig {
        root: root.to_path_buf(),
        include_globs: vec!["**/*.md".to_string(), "**/*.txt".to_string()],
        exclude_globs: vec![],
    }
}

#[test]
fn lists_matching_files_sorted_by_id() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "zebra.md", "z");
    write(tmp.path(), "alpha.md", "a");
    write(tmp.path(), "notes/middle.txt", "m");
    write(tmp.path(), "image.png", "binary-ish");

    let docs = vault::list_documents(&config(tmp.path()), None).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha.md", "notes/middle.txt", "zebra.md"]);
}

#[test]
fn hidden_app_directories_are_excluded() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "note.md", "n");
    write(tmp.path(), ".obsidian/workspace.md", "internal");
    write(tmp.path(), ".trash/old.md", "deleted");

    let docs = vault::list_documents(&config(tmp.path()), None).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "note.md");
}

#[test]
fn custom_excludes_apply() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "keep.md", "k");
    write(tmp.path(), "drafts/skip.md", "s");

    let mut cfg = config(tmp.path());
    cfg.exclude_globs = vec!["drafts/**".to_string()];

    let docs = vault::list_documents(&cfg, None).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "keep.md");
}

#[test]
fn scope_prefix_restricts_the_scan() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "root.md", "r");
    write(tmp.path(), "projects/a.md", "a");
    write(tmp.path(), "projects/b.md", "b");

    let docs = vault::list_documents(&config(tmp.path()), Some("projects/")).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["projects/a.md", "projects/b.md"]);
}

#[test]
fn empty_and_slash_scopes_mean_the_whole_vault() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.md", "a");
    write(tmp.path(), "sub/b.md", "b");

    for scope in [None, Some(""), Some("/")] {
        let docs = vault::list_documents(&config(tmp.path()), scope).unwrap();
        assert_eq!(docs.len(), 2, "scope {:?}", scope);
    }
}

#[test]
fn missing_root_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let cfg = config(&tmp.path().join("does-not-exist"));
    assert!(vault::list_documents(&cfg, None).is_err());
}

#[test]
fn read_returns_note_body() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "sub/note.md", "the body");

    let body = vault::read(&config(tmp.path()), "sub/note.md").unwrap();
    assert_eq!(body, "the body");
    assert!(vault::read(&config(tmp.path()), "missing.md").is_err());
}

#[test]
fn modification_timestamps_are_populated() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.md", "a");

    let docs = vault::list_documents(&config(tmp.path()), None).unwrap();
    assert!(docs[0].modified_at.timestamp() > 0);
}
