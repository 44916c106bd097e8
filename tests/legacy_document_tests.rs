mod common;

use std::fs;

use costplan_core::core::aggregate::summarize;
use costplan_core::core::migrate::migrate_document;
use costplan_core::core::timeline::compute_timeline_at;
use costplan_core::domain::RateCategory;
use costplan_core::utils::persistence::ProjectStore;
use chrono::NaiveDate;
use tempfile::tempdir;

use common::legacy_document;

#[test]
fn loading_a_legacy_file_migrates_and_reports_it() {
    let temp = tempdir().unwrap();
    let store = ProjectStore::new(Some(temp.path().to_path_buf()), None).unwrap();

    let path = temp.path().join("legacy.json");
    fs::write(&path, serde_json::to_string_pretty(&legacy_document()).unwrap()).unwrap();

    let report = store.load_from_path(&path).expect("load legacy document");
    assert_eq!(report.migrations.len(), 1);
    assert!(report.migrations[0].contains("3 rate cards"));

    let cards = &report.project.rate_cards;
    assert_eq!(cards.len(), 3);
    assert!(cards
        .iter()
        .any(|card| card.role == "Consultant" && card.category == RateCategory::External));
    // The legacy lists stay behind for older readers.
    assert_eq!(report.project.internal_rates.len(), 2);
    assert_eq!(report.project.external_rates.len(), 1);
}

#[test]
fn quarterly_records_populate_the_monthly_grid() {
    let outcome = migrate_document(legacy_document());
    let project = outcome.project;
    let timeline = compute_timeline_at(
        project.project_info.start_date,
        project.project_info.end_date,
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
    );
    assert_eq!(timeline.len(), 12);

    let summary = summarize(&project, &timeline);
    // PM at 800/day: q1 30 days over 3 months + q2 15 days over 3 months.
    assert_eq!(summary.categories.internal, (30.0 * 3.0 + 15.0 * 3.0) * 800.0);
    // Acme: 300 repeated across the three months of quarter 1.
    assert_eq!(summary.categories.vendor, 900.0);
}

#[test]
fn saving_a_migrated_document_keeps_it_stable() {
    let first = migrate_document(legacy_document()).project;
    let serialized = serde_json::to_value(&first).expect("serialize migrated project");
    let second = migrate_document(serialized);
    assert!(second.migrations.is_empty(), "migration must not run twice");
    assert_eq!(first, second.project);
}
