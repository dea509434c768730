use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;

use crate::error::GitsubError;
use crate::models::outcome::SubmodulePath;

/// One `[submodule "name"]` block of a `.gitmodules` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmoduleEntry {
    pub name: String,
    pub path: SubmodulePath,
    pub url: Option<String>,
    pub branch: Option<String>,
}

/// Read the manifest text. A missing file maps to `ManifestMissing`.
pub fn read_manifest(path: &Path) -> Result<String, GitsubError> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            tracing::debug!("read manifest {} ({} bytes)", path.display(), text.len());
            Ok(text)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("no manifest at {}", path.display());
            Err(GitsubError::ManifestMissing {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Extract every `path = <value>` entry, in document order.
///
/// Sections and all other keys are ignored. Duplicates are kept.
pub fn parse(text: &str) -> Vec<SubmodulePath> {
    text.lines()
        .filter_map(|line| key_value(line.trim(), "path"))
        .map(SubmodulePath::new)
        .collect()
}

/// Parse `[submodule "..."]` blocks into entries, skipping blocks without a path.
pub fn parse_entries(text: &str) -> Vec<SubmoduleEntry> {
    let mut entries = Vec::new();
    let mut current: Option<PartialEntry> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            if let Some(done) = current.take().and_then(PartialEntry::finish) {
                entries.push(done);
            }
            current = trimmed
                .strip_prefix("[submodule \"")
                .and_then(|s| s.strip_suffix("\"]"))
                .map(|name| PartialEntry {
                    name: name.to_string(),
                    ..PartialEntry::default()
                });
        } else if let Some(ref mut entry) = current {
            if let Some(path) = key_value(trimmed, "path") {
                entry.path = Some(path.to_string());
            } else if let Some(url) = key_value(trimmed, "url") {
                entry.url = Some(url.to_string());
            } else if let Some(branch) = key_value(trimmed, "branch") {
                entry.branch = Some(branch.to_string());
            }
        }
    }

    if let Some(done) = current.and_then(PartialEntry::finish) {
        entries.push(done);
    }

    entries
}

#[derive(Default)]
struct PartialEntry {
    name: String,
    path: Option<String>,
    url: Option<String>,
    branch: Option<String>,
}

impl PartialEntry {
    fn finish(self) -> Option<SubmoduleEntry> {
        Some(SubmoduleEntry {
            path: SubmodulePath::new(self.path?),
            name: self.name,
            url: self.url,
            branch: self.branch,
        })
    }
}

/// Match `<key> = <value>` on an already-trimmed line.
fn key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?.trim_start();
    let value = rest.strip_prefix('=')?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GITMODULES: &str = r#"[submodule "foo"]
	path = libs/foo
	url = https://example.com/foo.git
[submodule "bar"]
	path = libs/bar
	url = git@example.com:org/bar.git
	branch = develop
"#;

    #[test]
    fn test_parse_document_order() {
        let paths = parse(GITMODULES);
        let paths: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(paths, vec!["libs/foo", "libs/bar"]);
    }

    #[test]
    fn test_parse_no_matches() {
        assert!(parse("").is_empty());
        assert!(parse("[core]\n\tbare = false\n").is_empty());
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        let paths = parse("path = a\npath = a\n");
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_parse_ignores_similar_keys() {
        let text = "pathspec = nope\nsubpath = nope\npath =\npath=tight\n  path   =   spaced  \n";
        let paths = parse(text);
        let paths: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(paths, vec!["tight", "spaced"]);
    }

    #[test]
    fn test_parse_entries() {
        let entries = parse_entries(GITMODULES);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "foo");
        assert_eq!(entries[0].path.as_str(), "libs/foo");
        assert_eq!(entries[0].branch, None);
        assert_eq!(entries[1].url.as_deref(), Some("git@example.com:org/bar.git"));
        assert_eq!(entries[1].branch.as_deref(), Some("develop"));
    }

    #[test]
    fn test_parse_entries_skips_pathless_and_foreign_sections() {
        let text = "[submodule \"nopath\"]\n\turl = x\n[core]\n\tpath = ignored\n[submodule \"ok\"]\n\tpath = ok\n";
        let entries = parse_entries(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "ok");
    }

    #[test]
    fn test_read_manifest_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_manifest(&dir.path().join(".gitmodules")).unwrap_err();
        assert!(matches!(err, GitsubError::ManifestMissing { .. }));
    }

    #[test]
    fn test_read_manifest_present() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(".gitmodules");
        std::fs::write(&file, "[submodule \"a\"]\n\tpath = a\n").unwrap();
        let text = read_manifest(&file).unwrap();
        assert_eq!(parse(&text), vec![SubmodulePath::new("a")]);
    }
}
