//! Exact-match trigger table.
//!
//! Inputs listed here are answered with canned text and never reach the
//! backend. Matching is case-sensitive on the trimmed input; there is no
//! fuzzy or prefix matching.

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Entries every deployment starts with.
pub const BUILTIN_TRIGGERS: &[(&str, &str)] = &[("안녕하세요", "안녕하세요! 무엇을 도와드릴까요?")];

#[derive(Debug, Error)]
pub enum TriggerTableError {
    #[error("Failed to read trigger file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Trigger file {path} is not a JSON object of strings: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Trigger keys must not be blank")]
    BlankKey,
}

/// Immutable mapping from trimmed input to canned answer.
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    entries: HashMap<String, String>,
}

impl TriggerTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        let entries = BUILTIN_TRIGGERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { entries }
    }

    /// Build a table from arbitrary entries. Keys are trimmed.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, TriggerTableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = Self::default();
        table.extend(entries)?;
        Ok(table)
    }

    /// Built-in entries overlaid with the JSON object at `path`, if any.
    pub fn load(path: Option<&Path>) -> Result<Self, TriggerTableError> {
        let mut table = Self::builtin();

        if let Some(path) = path {
            let path_label = path.display().to_string();
            let raw = std::fs::read_to_string(path).map_err(|source| TriggerTableError::Read {
                path: path_label.clone(),
                source,
            })?;
            let extra: HashMap<String, String> =
                serde_json::from_str(&raw).map_err(|source| TriggerTableError::Parse {
                    path: path_label.clone(),
                    source,
                })?;

            tracing::info!(path = %path_label, entries = extra.len(), "Loaded trigger file");
            table.extend(extra)?;
        }

        Ok(table)
    }

    fn extend<I, K, V>(&mut self, entries: I) -> Result<(), TriggerTableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in entries {
            let key = key.as_ref().trim();
            if key.is_empty() {
                return Err(TriggerTableError::BlankKey);
            }
            self.entries.insert(key.to_string(), value.into());
        }
        Ok(())
    }

    /// Canned answer for `input`, compared after trimming.
    pub fn lookup(&self, input: &str) -> Option<&str> {
        self.entries.get(input.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_greeting_matches() {
        let table = TriggerTable::builtin();
        assert_eq!(
            table.lookup("안녕하세요"),
            Some("안녕하세요! 무엇을 도와드릴까요?")
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let table = TriggerTable::builtin();
        assert!(table.lookup("  안녕하세요\n").is_some());
    }

    #[test]
    fn no_partial_or_case_insensitive_matching() {
        let table = TriggerTable::from_entries([("Hello", "hi there")]).unwrap();
        assert_eq!(table.lookup("Hello"), Some("hi there"));
        assert_eq!(table.lookup("hello"), None);
        assert_eq!(table.lookup("Hello!"), None);
        assert_eq!(table.lookup("Hell"), None);
    }

    #[test]
    fn keys_are_trimmed_on_insert() {
        let table = TriggerTable::from_entries([("  ping  ", "pong")]).unwrap();
        assert_eq!(table.lookup("ping"), Some("pong"));
    }

    #[test]
    fn blank_keys_are_rejected() {
        let err = TriggerTable::from_entries([("   ", "x")]).unwrap_err();
        assert!(matches!(err, TriggerTableError::BlankKey));
    }

    #[test]
    fn file_entries_overlay_builtins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ping": "pong", "안녕하세요": "반갑습니다"}}"#
        )
        .unwrap();

        let table = TriggerTable::load(Some(file.path())).unwrap();
        assert_eq!(table.lookup("ping"), Some("pong"));
        assert_eq!(table.lookup("안녕하세요"), Some("반갑습니다"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = TriggerTable::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, TriggerTableError::Read { .. }));
    }

    #[test]
    fn load_errors_name_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let expected = file.path().display().to_string();

        match TriggerTable::load(Some(file.path())).unwrap_err() {
            TriggerTableError::Parse { path, .. } => assert_eq!(path, expected),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();

        let err = TriggerTable::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, TriggerTableError::Parse { .. }));
    }
}
