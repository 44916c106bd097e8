//! Facade that owns the live project document and coordinates state,
//! persistence, and derived views.
//!
//! There is exactly one live project per manager. Every mutation funnels
//! through a validated operation here, and autosave re-persists the
//! document before the call returns, so callers always observe storage
//! consistent with the last edit.

use std::path::{Path, PathBuf};

use crate::core::aggregate::{summarize, ProjectSummary};
use crate::core::timeline::{compute_timeline, Timeline};
use crate::domain::line_items::{InternalResource, MiscCost, Risk, ToolCost, VendorCost};
use crate::domain::project::{Project, ProjectInfo};
use crate::domain::rate_card::RateCard;
use crate::errors::ProjectError;
use crate::export::render_report;
use crate::utils::persistence::{BackupInfo, LoadReport, ProjectStore};

/// Trait that abstracts interaction with the persistence layer.
pub trait StorageBackend: Send + Sync {
    fn save_named(&self, name: &str, project: &Project) -> Result<PathBuf, ProjectError>;
    fn load_named(&self, name: &str) -> Result<LoadReport, ProjectError>;
    fn save_to_path(&self, project: &Project, path: &Path) -> Result<(), ProjectError>;
    fn load_from_path(&self, path: &Path) -> Result<LoadReport, ProjectError>;
    fn list_projects(&self) -> Result<Vec<String>, ProjectError>;
    fn delete_project(&self, name: &str) -> Result<(), ProjectError>;
    fn project_path(&self, name: &str) -> PathBuf;
    fn backup_named(&self, name: &str, note: Option<&str>) -> Result<PathBuf, ProjectError>;
    fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>, ProjectError>;
}

impl StorageBackend for ProjectStore {
    fn save_named(&self, name: &str, project: &Project) -> Result<PathBuf, ProjectError> {
        ProjectStore::save_named(self, name, project)
    }

    fn load_named(&self, name: &str) -> Result<LoadReport, ProjectError> {
        ProjectStore::load_named(self, name)
    }

    fn save_to_path(&self, project: &Project, path: &Path) -> Result<(), ProjectError> {
        ProjectStore::save_to_path(self, project, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<LoadReport, ProjectError> {
        ProjectStore::load_from_path(self, path)
    }

    fn list_projects(&self) -> Result<Vec<String>, ProjectError> {
        ProjectStore::list_projects(self)
    }

    fn delete_project(&self, name: &str) -> Result<(), ProjectError> {
        ProjectStore::delete_project(self, name)
    }

    fn project_path(&self, name: &str) -> PathBuf {
        ProjectStore::project_path(self, name)
    }

    fn backup_named(&self, name: &str, note: Option<&str>) -> Result<PathBuf, ProjectError> {
        ProjectStore::backup_named(self, name, note)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>, ProjectError> {
        ProjectStore::list_backups(self, name)
    }
}

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub migrations: Vec<String>,
    pub warnings: Vec<String>,
    pub path: PathBuf,
    pub name: Option<String>,
}

/// Owns the live project and its persistence target.
pub struct ProjectManager {
    current: Option<Project>,
    current_name: Option<String>,
    current_path: Option<PathBuf>,
    storage: Box<dyn StorageBackend>,
    autosave: bool,
}

impl ProjectManager {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            current: None,
            current_name: None,
            current_path: None,
            storage,
            autosave: true,
        }
    }

    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn current(&self) -> Option<&Project> {
        self.current.as_ref()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Replaces whatever was loaded with a fresh project.
    pub fn new_project(&mut self, name: &str) -> &Project {
        self.current = Some(Project::new(name));
        self.current_name = None;
        self.current_path = None;
        self.current.as_ref().unwrap()
    }

    pub fn load(&mut self, name: &str) -> Result<LoadMetadata, ProjectError> {
        let report = self.storage.load_named(name)?;
        Ok(self.apply_load(report))
    }

    pub fn load_from_path(&mut self, path: &Path) -> Result<LoadMetadata, ProjectError> {
        let report = self.storage.load_from_path(path)?;
        Ok(self.apply_load(report))
    }

    pub fn save(&mut self) -> Result<PathBuf, ProjectError> {
        let project = self.require_current()?;
        if let Some(name) = self.current_name.clone() {
            let path = self.storage.save_named(&name, project)?;
            self.current_path = Some(path.clone());
            Ok(path)
        } else if let Some(path) = self.current_path.clone() {
            self.storage.save_to_path(project, &path)?;
            Ok(path)
        } else {
            Err(ProjectError::Persistence(
                "unable to determine save target for current project".into(),
            ))
        }
    }

    pub fn save_as(&mut self, name: &str) -> Result<PathBuf, ProjectError> {
        let project = self.require_current()?;
        let path = self.storage.save_named(name, project)?;
        self.current_name = Some(name.to_string());
        self.current_path = Some(path.clone());
        Ok(path)
    }

    pub fn save_to_path(&mut self, path: &Path) -> Result<(), ProjectError> {
        let project = self.require_current()?;
        self.storage.save_to_path(project, path)?;
        self.current_path = Some(path.to_path_buf());
        self.current_name = None;
        Ok(())
    }

    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf, ProjectError> {
        let name = self.current_name.as_deref().ok_or_else(|| {
            ProjectError::Persistence("current project is unnamed".into())
        })?;
        self.storage.backup_named(name, note)
    }

    /// The column axis derived from the current project's date range.
    pub fn timeline(&self) -> Result<Timeline, ProjectError> {
        let info = &self.require_current()?.project_info;
        Ok(compute_timeline(info.start_date, info.end_date))
    }

    pub fn summary(&self) -> Result<ProjectSummary, ProjectError> {
        let project = self.require_current()?;
        let timeline = self.timeline()?;
        Ok(summarize(project, &timeline))
    }

    pub fn report(&self) -> Result<String, ProjectError> {
        let project = self.require_current()?;
        let timeline = self.timeline()?;
        Ok(render_report(project, &timeline))
    }

    pub fn set_info(&mut self, info: ProjectInfo) -> Result<(), ProjectError> {
        self.require_current_mut()?.set_info(info);
        self.after_mutation()
    }

    pub fn set_contingency_percentage(&mut self, percentage: f64) -> Result<(), ProjectError> {
        self.require_current_mut()?.set_contingency_percentage(percentage)?;
        self.after_mutation()
    }

    pub fn add_internal_resource(
        &mut self,
        resource: InternalResource,
    ) -> Result<String, ProjectError> {
        let id = self.require_current_mut()?.add_internal_resource(resource)?;
        self.after_mutation()?;
        Ok(id)
    }

    pub fn update_internal_resource(
        &mut self,
        resource: InternalResource,
    ) -> Result<(), ProjectError> {
        self.require_current_mut()?.update_internal_resource(resource)?;
        self.after_mutation()
    }

    pub fn remove_internal_resource(&mut self, id: &str) -> Result<bool, ProjectError> {
        let removed = self.require_current_mut()?.remove_internal_resource(id);
        self.after_mutation()?;
        Ok(removed)
    }

    pub fn add_vendor_cost(&mut self, vendor: VendorCost) -> Result<String, ProjectError> {
        let id = self.require_current_mut()?.add_vendor_cost(vendor)?;
        self.after_mutation()?;
        Ok(id)
    }

    pub fn update_vendor_cost(&mut self, vendor: VendorCost) -> Result<(), ProjectError> {
        self.require_current_mut()?.update_vendor_cost(vendor)?;
        self.after_mutation()
    }

    pub fn remove_vendor_cost(&mut self, id: &str) -> Result<bool, ProjectError> {
        let removed = self.require_current_mut()?.remove_vendor_cost(id);
        self.after_mutation()?;
        Ok(removed)
    }

    pub fn add_tool_cost(&mut self, tool: ToolCost) -> Result<String, ProjectError> {
        let id = self.require_current_mut()?.add_tool_cost(tool)?;
        self.after_mutation()?;
        Ok(id)
    }

    pub fn update_tool_cost(&mut self, tool: ToolCost) -> Result<(), ProjectError> {
        self.require_current_mut()?.update_tool_cost(tool)?;
        self.after_mutation()
    }

    pub fn remove_tool_cost(&mut self, id: &str) -> Result<bool, ProjectError> {
        let removed = self.require_current_mut()?.remove_tool_cost(id);
        self.after_mutation()?;
        Ok(removed)
    }

    pub fn add_misc_cost(&mut self, misc: MiscCost) -> Result<String, ProjectError> {
        let id = self.require_current_mut()?.add_misc_cost(misc)?;
        self.after_mutation()?;
        Ok(id)
    }

    pub fn update_misc_cost(&mut self, misc: MiscCost) -> Result<(), ProjectError> {
        self.require_current_mut()?.update_misc_cost(misc)?;
        self.after_mutation()
    }

    pub fn remove_misc_cost(&mut self, id: &str) -> Result<bool, ProjectError> {
        let removed = self.require_current_mut()?.remove_misc_cost(id);
        self.after_mutation()?;
        Ok(removed)
    }

    pub fn add_risk(&mut self, risk: Risk) -> Result<String, ProjectError> {
        let id = self.require_current_mut()?.add_risk(risk)?;
        self.after_mutation()?;
        Ok(id)
    }

    pub fn update_risk(&mut self, risk: Risk) -> Result<(), ProjectError> {
        self.require_current_mut()?.update_risk(risk)?;
        self.after_mutation()
    }

    pub fn remove_risk(&mut self, id: &str) -> Result<bool, ProjectError> {
        let removed = self.require_current_mut()?.remove_risk(id);
        self.after_mutation()?;
        Ok(removed)
    }

    pub fn add_rate_card(&mut self, card: RateCard) -> Result<String, ProjectError> {
        let id = self.require_current_mut()?.add_rate_card(card)?;
        self.after_mutation()?;
        Ok(id)
    }

    pub fn update_rate_card(&mut self, card: RateCard) -> Result<(), ProjectError> {
        self.require_current_mut()?.update_rate_card(card)?;
        self.after_mutation()
    }

    pub fn remove_rate_card(&mut self, id: &str) -> Result<bool, ProjectError> {
        let removed = self.require_current_mut()?.remove_rate_card(id);
        self.after_mutation()?;
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.current_name = None;
        self.current_path = None;
    }

    fn apply_load(&mut self, report: LoadReport) -> LoadMetadata {
        let LoadReport {
            project,
            migrations,
            warnings,
            path,
            name,
        } = report;
        self.current = Some(project);
        self.current_path = Some(path.clone());
        self.current_name = name.clone();
        LoadMetadata {
            migrations,
            warnings,
            path,
            name,
        }
    }

    fn after_mutation(&mut self) -> Result<(), ProjectError> {
        if !self.autosave {
            return Ok(());
        }
        if self.current_name.is_some() || self.current_path.is_some() {
            self.save()?;
        }
        Ok(())
    }

    fn require_current(&self) -> Result<&Project, ProjectError> {
        self.current
            .as_ref()
            .ok_or_else(|| ProjectError::Persistence("no project loaded".into()))
    }

    fn require_current_mut(&mut self) -> Result<&mut Project, ProjectError> {
        self.current
            .as_mut()
            .ok_or_else(|| ProjectError::Persistence("no project loaded".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate_card::RateCategory;
    use tempfile::tempdir;

    fn manager_in(dir: &Path) -> ProjectManager {
        let store = ProjectStore::new(Some(dir.to_path_buf()), Some(3)).expect("create store");
        ProjectManager::new(Box::new(store))
    }

    #[test]
    fn save_and_load_named_roundtrip() {
        let temp = tempdir().unwrap();
        let mut manager = manager_in(temp.path());

        manager.new_project("Platform Rollout");
        let path = manager.save_as("platform-rollout").expect("save project");
        assert!(path.exists());

        manager.clear();
        let metadata = manager.load("platform-rollout").expect("load project");
        assert_eq!(metadata.name.as_deref(), Some("platform_rollout"));
        assert!(metadata.migrations.is_empty());
        assert_eq!(
            manager.current().unwrap().project_info.name,
            "Platform Rollout"
        );
    }

    #[test]
    fn mutations_autosave_to_the_current_target() {
        let temp = tempdir().unwrap();
        let mut manager = manager_in(temp.path());
        manager.new_project("Rollout");
        let path = manager.save_as("rollout").unwrap();

        manager
            .add_rate_card(RateCard::new("PM", 800.0, RateCategory::Internal))
            .expect("add rate card");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"PM\""), "autosave should persist the new card");
    }

    #[test]
    fn operations_without_a_project_fail() {
        let temp = tempdir().unwrap();
        let mut manager = manager_in(temp.path());
        assert!(manager.timeline().is_err());
        assert!(manager
            .add_misc_cost(MiscCost::new("Travel", 100.0))
            .is_err());
    }

    #[test]
    fn new_project_replaces_state_wholesale() {
        let temp = tempdir().unwrap();
        let mut manager = manager_in(temp.path());
        manager.new_project("First");
        manager.save_as("first").unwrap();
        manager.new_project("Second");
        assert_eq!(manager.current_name(), None);
        assert_eq!(manager.current_path(), None);
        assert_eq!(manager.current().unwrap().project_info.name, "Second");
    }
}
