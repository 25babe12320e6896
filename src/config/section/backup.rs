//! `[backup]` section configuration.
//!
//! ```toml
//! [backup]
//! enable = true
//! at = "04:00"                 # Daily dump time
//! dir = "backups"              # Dump directory (supports ~)
//! keep = 7                     # Dumps kept per database, 0 = keep all
//! dump = ["mongodump"]         # Dump command, gets --uri and --out
//! restore = ["mongorestore"]   # Restore command, gets --uri, --drop and the dump dir
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::jobs::DailyAt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub enable: bool,
    pub at: String,
    pub dir: PathBuf,
    pub keep: usize,
    pub dump: Vec<String>,
    pub restore: Vec<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enable: true,
            at: "04:00".into(),
            dir: "backups".into(),
            keep: 7,
            dump: vec!["mongodump".into()],
            restore: vec!["mongorestore".into()],
        }
    }
}

impl BackupConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if DailyAt::parse(&self.at).is_none() {
            diag.error_with_hint(
                FieldPath::new("backup.at"),
                format!("invalid time `{}`", self.at),
                "use 24-hour HH:MM, e.g. \"04:00\"",
            );
        }
        if self.dump.first().is_none_or(|s| s.is_empty()) {
            diag.error(FieldPath::new("backup.dump"), "command must not be empty");
        }
        if self.restore.first().is_none_or(|s| s.is_empty()) {
            diag.error(FieldPath::new("backup.restore"), "command must not be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_backup_defaults() {
        let config = test_parse_config("");
        assert!(config.backup.enable);
        assert_eq!(config.backup.at, "04:00");
        assert_eq!(config.backup.keep, 7);
        assert_eq!(config.backup.dump, vec!["mongodump"]);
    }

    #[test]
    fn test_backup_custom_command() {
        let config =
            test_parse_config("[backup]\ndump = [\"docker\", \"exec\", \"db\", \"mongodump\"]");
        assert_eq!(config.backup.dump.len(), 4);
    }

    #[test]
    fn test_validate_rejects_empty_commands() {
        let backup = BackupConfig {
            dump: Vec::new(),
            restore: vec![String::new()],
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        backup.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }
}
