//! INI file configuration adapter.

use crate::domain::error::JournalError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JournalError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| JournalError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, JournalError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| JournalError::ConfigParse {
                file: "<inline>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[store]
backend = sqlite
path = /var/lib/journal/trades.db
pool_size = 2

[auth]
user_id = kilali
email = k@example.com

[report]
title = Weekly Review
template_path = /custom.typ

[log]
level = debug
verbose = on
"#;

    #[test]
    fn reads_journal_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("store", "path"),
            Some("/var/lib/journal/trades.db".to_string())
        );
        assert_eq!(adapter.get_string("auth", "user_id"), Some("kilali".into()));
        assert_eq!(
            adapter.get_string("report", "title"),
            Some("Weekly Review".into())
        );
    }

    #[test]
    fn missing_keys_are_none() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("store", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn int_value_and_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("store", "pool_size", 4), 2);
        assert_eq!(adapter.get_int("store", "missing", 4), 4);
        assert_eq!(adapter.get_int("store", "backend", 7), 7);
    }

    #[test]
    fn double_value_and_defaults() {
        let adapter =
            FileConfigAdapter::from_string("[risk]\ndefault_lot = 0.25\nbad = x\n").unwrap();
        assert_eq!(adapter.get_double("risk", "default_lot", 1.0), 0.25);
        assert_eq!(adapter.get_double("risk", "missing", 1.0), 1.0);
        assert_eq!(adapter.get_double("risk", "bad", 1.0), 1.0);
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[flags]\na = true\nb = yes\nc = off\nd = 0\ne = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("flags", "a", false));
        assert!(adapter.get_bool("flags", "b", false));
        assert!(!adapter.get_bool("flags", "c", true));
        assert!(!adapter.get_bool("flags", "d", true));
        assert!(adapter.get_bool("flags", "e", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("log", "level"), Some("debug".into()));
        assert!(adapter.get_bool("log", "verbose", false));
    }

    #[test]
    fn from_file_missing_names_file() {
        let err = FileConfigAdapter::from_file("/nonexistent/journal.ini").unwrap_err();
        match err {
            JournalError::ConfigParse { file, .. } => assert!(file.ends_with("journal.ini")),
            other => panic!("expected ConfigParse, got: {other}"),
        }
    }
}
