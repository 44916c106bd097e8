//! Filesystem-backed JSON persistence for project documents and their
//! backups.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::core::migrate::{load_project_str, MigrationOutcome};
use crate::domain::project::Project;
use crate::errors::ProjectError;

const PROJECT_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Outcome of a load: the migrated project plus provenance metadata.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub project: Project,
    pub migrations: Vec<String>,
    pub warnings: Vec<String>,
    pub path: PathBuf,
    pub name: Option<String>,
}

/// Describes a persisted backup artifact for a project.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// Store directory layout: named documents under `projects/`, timestamped
/// copies under `backups/<slug>/`, oldest pruned past the retention cap.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    projects_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl ProjectStore {
    pub fn new(base_dir: Option<PathBuf>, retention: Option<usize>) -> Result<Self, ProjectError> {
        let base = base_dir.unwrap_or_else(default_base_dir);
        let projects_dir = base.join("projects");
        let backups_dir = base.join("backups");
        fs::create_dir_all(&projects_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            projects_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn project_path(&self, name: &str) -> PathBuf {
        self.projects_dir
            .join(format!("{}.{}", canonical_name(name), PROJECT_EXTENSION))
    }

    pub fn save_named(&self, name: &str, project: &Project) -> Result<PathBuf, ProjectError> {
        let path = self.project_path(name);
        if path.exists() {
            self.backup_existing_file(name, &path)?;
        }
        write_document(project, &path)?;
        Ok(path)
    }

    pub fn load_named(&self, name: &str) -> Result<LoadReport, ProjectError> {
        let mut report = self.load_from_path(&self.project_path(name))?;
        report.name = Some(canonical_name(name));
        Ok(report)
    }

    pub fn save_to_path(&self, project: &Project, path: &Path) -> Result<(), ProjectError> {
        if path.starts_with(&self.projects_dir) {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                self.backup_existing_file(stem, path)?;
            }
        }
        write_document(project, path)
    }

    /// Loads and migrates the document at `path`.
    ///
    /// A missing or malformed document yields a fresh default project with
    /// a warning; only genuine IO failures surface as errors.
    pub fn load_from_path(&self, path: &Path) -> Result<LoadReport, ProjectError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("no project document at {}; starting fresh", path.display());
                return Ok(LoadReport {
                    project: Project::default(),
                    migrations: Vec::new(),
                    warnings: vec![format!(
                        "no document at {}; starting fresh",
                        path.display()
                    )],
                    path: path.to_path_buf(),
                    name: None,
                });
            }
            Err(err) => return Err(err.into()),
        };
        let MigrationOutcome {
            project,
            migrations,
            warnings,
        } = load_project_str(&raw);
        Ok(LoadReport {
            project,
            migrations,
            warnings,
            path: path.to_path_buf(),
            name: None,
        })
    }

    pub fn list_projects(&self) -> Result<Vec<String>, ProjectError> {
        if !self.projects_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.projects_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(PROJECT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete_project(&self, name: &str) -> Result<(), ProjectError> {
        let path = self.project_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn backup_named(&self, name: &str, note: Option<&str>) -> Result<PathBuf, ProjectError> {
        let source = self.project_path(name);
        if !source.exists() {
            return Err(ProjectError::Persistence(format!(
                "project `{}` has no saved document to back up",
                name
            )));
        }
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let path = dir.join(format!("{}.{}", stem, PROJECT_EXTENSION));
        fs::copy(&source, &path)?;
        self.prune_backups(name)?;
        Ok(path)
    }

    pub fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>, ProjectError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PROJECT_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BackupInfo {
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse(info.created_at));
        Ok(entries)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<(), ProjectError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_path = dir.join(format!(
            "{}_{}.{}",
            canonical_name(name),
            timestamp,
            PROJECT_EXTENSION
        ));
        fs::copy(path, &backup_path)?;
        self.prune_backups(name)?;
        Ok(())
    }

    fn prune_backups(&self, name: &str) -> Result<(), ProjectError> {
        let entries = self.list_backups(name)?;
        for entry in entries.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

/// Saves a project document to an arbitrary path via tmp-file staging.
pub fn write_document(project: &Project, path: &Path) -> Result<(), ProjectError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(project)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("costplan")
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "project".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(&format!(".{}", PROJECT_EXTENSION))?;
    let segments = trimmed.split('_').collect::<Vec<_>>();
    // A sanitized note may trail the timestamp, so scan for the
    // date/time pair instead of assuming it sits at the end.
    segments
        .windows(2)
        .rev()
        .find_map(|pair| {
            if !is_digits(pair[0], 8) || !is_digits(pair[1], 6) {
                return None;
            }
            NaiveDateTime::parse_from_str(&format!("{}{}", pair[0], pair[1]), "%Y%m%d%H%M%S").ok()
        })
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ProjectError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_are_slugs() {
        assert_eq!(canonical_name("Platform Rollout 2024"), "platform_rollout_2024");
        assert_eq!(canonical_name("///"), "project");
    }

    #[test]
    fn backup_timestamps_parse_from_file_names() {
        let parsed = parse_backup_timestamp("rollout_20240301_120000.json").expect("timestamp");
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2024-03-01 12:00");
        let noted =
            parse_backup_timestamp("rollout_20240301_120000_quarter-close.json").expect("noted");
        assert_eq!(noted, parsed);
        assert!(parse_backup_timestamp("rollout.json").is_none());
        assert!(parse_backup_timestamp("rollout_2024_12.json").is_none());
    }

    #[test]
    fn backup_notes_are_sanitized() {
        assert_eq!(
            sanitize_backup_note(Some("Quarter Close!")).as_deref(),
            Some("quarter-close")
        );
        assert_eq!(sanitize_backup_note(Some("   ")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }
}
