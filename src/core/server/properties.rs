// ─── server.properties ───
// Idempotent key=value text-file editor. Comments and unknown lines
// survive every rewrite byte-for-byte.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::core::error::{InstallerError, InstallerResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Comment,
    KeyValue,
    Blank,
}

/// One line of a property file. `raw` is authoritative for everything
/// we did not touch.
#[derive(Debug, Clone)]
pub struct PropertyRecord {
    pub kind: RecordKind,
    pub key: Option<String>,
    pub value: Option<String>,
    pub raw: String,
}

#[derive(Debug, Clone, Default)]
pub struct PropertyFile {
    records: Vec<PropertyRecord>,
}

impl PropertyFile {
    /// Load an existing file. Missing file is a `PropertyUpdate` failure:
    /// callers materialize the file first when that is intended.
    pub fn load(path: &Path) -> InstallerResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| InstallerError::PropertyUpdate {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::parse(&raw))
    }

    /// Load if present, start empty otherwise.
    pub fn load_or_default(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(text: &str) -> Self {
        let records = text.lines().map(parse_line).collect();
        Self { records }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.kind == RecordKind::KeyValue && r.key.as_deref() == Some(key))
            .and_then(|r| r.value.as_deref())
    }

    /// Set `key` to `value`, replacing an existing record in place or
    /// appending a new one. Returns whether anything changed, so a repeat
    /// call with the same pair is a visible no-op.
    pub fn upsert(&mut self, key: &str, value: &str) -> bool {
        for record in &mut self.records {
            if record.kind == RecordKind::KeyValue && record.key.as_deref() == Some(key) {
                if record.value.as_deref() == Some(value) {
                    return false;
                }
                record.value = Some(value.to_string());
                record.raw = format!("{key}={value}");
                return true;
            }
        }

        self.records.push(PropertyRecord {
            kind: RecordKind::KeyValue,
            key: Some(key.to_string()),
            value: Some(value.to_string()),
            raw: format!("{key}={value}"),
        });
        true
    }

    pub fn save(&self, path: &Path) -> InstallerResult<()> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.raw);
            out.push('\n');
        }
        fs::write(path, out).map_err(|e| InstallerError::PropertyUpdate {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("Saved {} property records to {:?}", self.records.len(), path);
        Ok(())
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    /// Sanity-check well-known keys. Problems are reported, never fatal:
    /// the server itself is the final authority on its config.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Some(port) = self.get("server-port") {
            match port.parse::<u32>() {
                Ok(n) if (1..=65535).contains(&n) => {}
                _ => problems.push(format!("server-port {port:?} is not a valid port")),
            }
        }

        if let Some(difficulty) = self.get("difficulty") {
            const ALLOWED: &[&str] = &["peaceful", "easy", "normal", "hard", "0", "1", "2", "3"];
            if !ALLOWED.contains(&difficulty) {
                problems.push(format!("difficulty {difficulty:?} is not recognized"));
            }
        }

        const BOOLEAN_KEYS: &[&str] = &["pvp", "online-mode", "hardcore", "white-list", "allow-flight"];
        for key in BOOLEAN_KEYS {
            if let Some(value) = self.get(key) {
                if value != "true" && value != "false" {
                    problems.push(format!("{key} must be true or false, got {value:?}"));
                }
            }
        }

        const NUMERIC_KEYS: &[&str] = &["max-players", "view-distance", "simulation-distance"];
        for key in NUMERIC_KEYS {
            if let Some(value) = self.get(key) {
                if value.parse::<i64>().is_err() {
                    problems.push(format!("{key} must be numeric, got {value:?}"));
                }
            }
        }

        problems
    }
}

fn parse_line(line: &str) -> PropertyRecord {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return PropertyRecord {
            kind: RecordKind::Blank,
            key: None,
            value: None,
            raw: line.to_string(),
        };
    }
    if trimmed.starts_with('#') || trimmed.starts_with('!') {
        return PropertyRecord {
            kind: RecordKind::Comment,
            key: None,
            value: None,
            raw: line.to_string(),
        };
    }
    match line.split_once('=') {
        Some((key, value)) => PropertyRecord {
            kind: RecordKind::KeyValue,
            key: Some(key.trim().to_string()),
            value: Some(value.to_string()),
            raw: line.to_string(),
        },
        // A bare word without '=' is kept verbatim, treated as opaque.
        None => PropertyRecord {
            kind: RecordKind::Comment,
            key: None,
            value: None,
            raw: line.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_round_trip_has_no_duplicates() {
        let mut file = PropertyFile::default();
        assert!(file.upsert("difficulty", "normal"));
        assert!(file.upsert("pvp", "true"));
        assert!(!file.upsert("difficulty", "normal"));

        let kv: Vec<_> = file
            .records()
            .iter()
            .filter(|r| r.kind == RecordKind::KeyValue)
            .collect();
        assert_eq!(kv.len(), 2);
        assert_eq!(file.get("difficulty"), Some("normal"));
        assert_eq!(file.get("pvp"), Some("true"));
    }

    #[test]
    fn comments_and_unknown_lines_survive_byte_for_byte() {
        let text = "#Minecraft server properties\n#Mon Jan 01 00:00:00 UTC 2024\nmotd=A Server\n\nlevel-seed=\n";
        let mut file = PropertyFile::parse(text);
        file.upsert("difficulty", "hard");
        file.upsert("motd", "A Server");

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("server.properties");
        file.save(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("#Minecraft server properties\n#Mon Jan 01 00:00:00 UTC 2024\nmotd=A Server\n\nlevel-seed=\n"));
        assert!(written.ends_with("difficulty=hard\n"));
    }

    #[test]
    fn identical_update_set_is_a_noop_diff() {
        let text = "difficulty=normal\npvp=true\n";
        let mut file = PropertyFile::parse(text);
        let changed = file.upsert("difficulty", "normal") | file.upsert("pvp", "true");
        assert!(!changed);

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("server.properties");
        file.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn upsert_replaces_value_in_place() {
        let mut file = PropertyFile::parse("a=1\ndifficulty=easy\nz=9\n");
        file.upsert("difficulty", "hard");

        let keys: Vec<_> = file
            .records()
            .iter()
            .filter_map(|r| r.key.as_deref())
            .collect();
        assert_eq!(keys, vec!["a", "difficulty", "z"]);
        assert_eq!(file.get("difficulty"), Some("hard"));
    }

    #[test]
    fn unrelated_keys_are_untouched_by_later_upserts() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("server.properties");

        let mut first = PropertyFile::default();
        first.upsert("motd", "Welcome");
        first.save(&path).unwrap();

        let mut second = PropertyFile::load(&path).unwrap();
        second.upsert("pvp", "false");
        second.save(&path).unwrap();

        let reloaded = PropertyFile::load(&path).unwrap();
        assert_eq!(reloaded.get("motd"), Some("Welcome"));
        assert_eq!(reloaded.get("pvp"), Some("false"));
    }

    #[test]
    fn load_of_missing_file_is_a_property_update_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = PropertyFile::load(&tmp.path().join("absent.properties")).unwrap_err();
        assert!(matches!(err, InstallerError::PropertyUpdate { .. }));
    }

    #[test]
    fn validation_flags_bad_values_only() {
        let file = PropertyFile::parse(
            "server-port=99999\ndifficulty=normal\npvp=maybe\nmax-players=20\n",
        );
        let problems = file.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("server-port")));
        assert!(problems.iter().any(|p| p.contains("pvp")));
    }
}
