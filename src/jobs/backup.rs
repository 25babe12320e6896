//! Database dumps.
//!
//! ```text
//! backups/
//! ├── site-2026-01-29/     ← pruned once more than `keep` exist
//! ├── site-2026-01-30/
//! └── site-2026-01-31/     ← <dump...> --uri=<url> --out=backups/site-2026-01-31
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use super::JobError;
use crate::config::{BackupConfig, SiteConfig};
use crate::utils::exec::{Cmd, FilterRule};
use crate::{debug, log};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-collection progress lines from the dump tools.
const DUMP_FILTER: FilterRule = FilterRule::new(&[
    "writing ",
    "done dumping",
    "restoring ",
    "finished restoring",
]);

/// Directory name of the dump of `db` taken on `date`.
pub fn dump_dir_name(db: &str, date: NaiveDate) -> String {
    format!("{db}-{}", date.format(DATE_FORMAT))
}

/// Dump the database into today's directory, then prune old dumps.
pub fn backup_now(config: &SiteConfig) -> Result<PathBuf, JobError> {
    let backup = &config.backup;
    let db = config.database.name();
    let out = backup
        .dir
        .join(dump_dir_name(&db, Local::now().date_naive()));

    fs::create_dir_all(&backup.dir).map_err(|e| JobError::Write(backup.dir.clone(), e))?;

    log!("backup"; "dumping {} -> {}", db, out.display());
    Cmd::from_slice(&dump_argv(backup, &config.database.url, &out))
        .filter(&DUMP_FILTER)
        .run()
        .map_err(JobError::Command)?;

    let removed = prune_dumps(&backup.dir, &db, backup.keep)?;
    if !removed.is_empty() {
        log!("backup"; "pruned {} old dump(s)", removed.len());
    }
    Ok(out)
}

/// Restore the dump directory `name` from the backup directory.
pub fn restore(config: &SiteConfig, name: &str) -> Result<PathBuf, JobError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(JobError::InvalidDumpName(name.to_string()));
    }

    let dir = config.backup.dir.join(name);
    if !dir.is_dir() {
        return Err(JobError::MissingDump(dir));
    }

    log!("backup"; "restoring {} into {}", name, config.database.name());
    Cmd::from_slice(&restore_argv(&config.backup, &config.database.url, &dir))
        .filter(&DUMP_FILTER)
        .run()
        .map_err(JobError::Command)?;
    Ok(dir)
}

/// Remove dumps of `db` in `dir` beyond the newest `keep`. `keep == 0`
/// keeps everything.
pub fn prune_dumps(dir: &Path, db: &str, keep: usize) -> Result<Vec<PathBuf>, JobError> {
    if keep == 0 {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| JobError::ListDumps(dir.to_path_buf(), e))?;
    let prefix = format!("{db}-");

    let mut dumps: Vec<(NaiveDate, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| {
            let name = entry.file_name();
            let date = name.to_str()?.strip_prefix(&prefix)?;
            let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
            Some((date, entry.path()))
        })
        .collect();

    dumps.sort_unstable_by(|a, b| b.0.cmp(&a.0));

    let mut removed = Vec::new();
    for (_, path) in dumps.into_iter().skip(keep) {
        fs::remove_dir_all(&path).map_err(|e| JobError::Prune(path.clone(), e))?;
        debug!("backup"; "removed {}", path.display());
        removed.push(path);
    }
    Ok(removed)
}

fn dump_argv(backup: &BackupConfig, url: &str, out: &Path) -> Vec<String> {
    let mut argv = backup.dump.clone();
    argv.push(format!("--uri={url}"));
    argv.push(format!("--out={}", out.display()));
    argv
}

fn restore_argv(backup: &BackupConfig, url: &str, dir: &Path) -> Vec<String> {
    let mut argv = backup.restore.clone();
    argv.push(format!("--uri={url}"));
    argv.push("--drop".into());
    argv.push(dir.display().to_string());
    argv
}
