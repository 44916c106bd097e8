use costplan_core::core::ProjectManager;
use costplan_core::domain::{InternalResource, ProjectInfo, RateCard, RateCategory, VendorCost};
use costplan_core::utils::persistence::ProjectStore;
use chrono::NaiveDate;
use tempfile::tempdir;

fn manager(temp: &tempfile::TempDir) -> ProjectManager {
    let store = ProjectStore::new(Some(temp.path().to_path_buf()), Some(3)).expect("store");
    ProjectManager::new(Box::new(store))
}

#[test]
fn full_editing_flow_survives_a_reload() {
    let temp = tempdir().unwrap();
    let mut manager = manager(&temp);

    manager.new_project("Platform Rollout");
    manager
        .set_info(ProjectInfo {
            name: "Platform Rollout".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            manager: "Dana".into(),
            description: String::new(),
        })
        .expect("set info");
    manager.set_contingency_percentage(10.0).expect("set contingency");
    manager
        .add_rate_card(RateCard::new("PM", 800.0, RateCategory::Internal))
        .expect("add rate card");

    let mut resource = InternalResource::new("PM", "Alex");
    resource.days.set_month(1, 10.0);
    let resource_id = manager.add_internal_resource(resource.clone()).expect("add resource");

    let mut vendor = VendorCost::new("Acme", "Integration");
    vendor.costs.set_month(3, 2000.0);
    manager.add_vendor_cost(vendor).expect("add vendor");

    manager.save_as("platform-rollout").expect("save");

    // Edit after save: autosave keeps the document current.
    resource.days.set_month(2, 4.0);
    manager.update_internal_resource(resource).expect("update resource");

    let mut reloaded = manager_for_reload(&temp);
    let metadata = reloaded.load("platform-rollout").expect("reload");
    assert!(metadata.migrations.is_empty());

    let timeline = reloaded.timeline().expect("timeline");
    assert_eq!(timeline.len(), 6);

    let summary = reloaded.summary().expect("summary");
    assert_eq!(summary.categories.internal, 14.0 * 800.0);
    assert_eq!(summary.categories.vendor, 2000.0);
    assert_eq!(summary.totals.subtotal, 13200.0);
    assert!((summary.totals.total - 14520.0).abs() < 1e-9);

    assert!(reloaded.remove_internal_resource(&resource_id).expect("remove"));
    assert_eq!(reloaded.summary().unwrap().categories.internal, 0.0);
}

fn manager_for_reload(temp: &tempfile::TempDir) -> ProjectManager {
    manager(temp)
}

#[test]
fn timeline_follows_date_edits() {
    let temp = tempdir().unwrap();
    let mut manager = manager(&temp);
    manager.new_project("Rollout");

    // No dates yet: the generic default axis.
    assert_eq!(manager.timeline().unwrap().len(), 4);

    manager
        .set_info(ProjectInfo {
            name: "Rollout".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 10, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 31),
            manager: String::new(),
            description: String::new(),
        })
        .unwrap();
    let timeline = manager.timeline().unwrap();
    assert_eq!(timeline.len(), 6);
    assert_eq!(timeline.year_groups.len(), 2);
}

#[test]
fn invalid_line_items_are_never_committed() {
    let temp = tempdir().unwrap();
    let mut manager = manager(&temp);
    manager.new_project("Rollout");

    let blank_role = InternalResource::new("", "Nobody");
    assert!(manager.add_internal_resource(blank_role).is_err());
    assert!(manager.current().unwrap().internal_resources.is_empty());
}

#[test]
fn report_renders_from_the_live_document() {
    let temp = tempdir().unwrap();
    let mut manager = manager(&temp);
    manager.new_project("Rollout");
    manager
        .add_rate_card(RateCard::new("PM", 800.0, RateCategory::Internal))
        .unwrap();
    let report = manager.report().expect("render report");
    assert!(report.contains("PROJECT COST ESTIMATE"));
    assert!(report.contains("RATE CARDS"));
    assert!(report.contains("SUMMARY"));
}
