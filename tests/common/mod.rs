#![allow(dead_code)]

use chrono::NaiveDate;
use costplan_core::domain::{
    InternalResource, MiscCost, Project, RateCard, RateCategory, Risk, ToolCost, VendorCost,
};

/// A populated project spanning November 2024 through February 2025.
pub fn sample_project() -> Project {
    let mut project = Project::new("Platform Rollout");
    project.project_info.manager = "Dana".into();
    project.project_info.start_date = NaiveDate::from_ymd_opt(2024, 11, 1);
    project.project_info.end_date = NaiveDate::from_ymd_opt(2025, 2, 28);
    project.set_contingency_percentage(10.0).expect("valid contingency");

    project
        .add_rate_card(RateCard::new("PM", 800.0, RateCategory::Internal))
        .expect("internal PM rate");
    project
        .add_rate_card(RateCard::new("Dev", 650.0, RateCategory::Internal))
        .expect("internal Dev rate");

    let mut pm = InternalResource::new("PM", "Alex");
    pm.days.set_month(1, 10.0);
    pm.days.set_month(2, 5.0);
    project.add_internal_resource(pm).expect("add PM resource");

    let mut vendor = VendorCost::new("Acme", "Integration work");
    vendor.costs.set_month(2, 1500.0);
    project.add_vendor_cost(vendor).expect("add vendor");

    project
        .add_tool_cost(ToolCost::new("CI seats", 5, 40.0, 4))
        .expect("add tool");
    project
        .add_misc_cost(MiscCost::new("Travel", 500.0))
        .expect("add misc");
    project
        .add_risk(Risk::new("Scope creep", 4, 3))
        .expect("add risk");
    project
}

/// A raw document in the oldest persisted shape: quarterly buckets and
/// legacy rate lists, no unified rate cards.
pub fn legacy_document() -> serde_json::Value {
    serde_json::json!({
        "projectInfo": {
            "name": "Legacy Migration",
            "startDate": "2023-01-01",
            "endDate": "2023-12-31",
            "manager": "Kim",
            "description": "Carried over from the quarterly format"
        },
        "contingencyPercentage": 5.0,
        "internalRates": [
            { "role": "PM", "rate": 800.0 },
            { "role": "Dev", "rate": 650.0 }
        ],
        "externalRates": [
            { "id": "1699999999-442", "role": "Consultant", "rate": 1200.0 }
        ],
        "internalResources": [
            { "id": "1699999999-127", "role": "PM", "name": "Kim", "q1Days": 30.0, "q2Days": 15.0 }
        ],
        "vendorCosts": [
            { "id": "1699999999-128", "vendor": "Acme", "q1Cost": 300.0 }
        ],
        "toolCosts": [],
        "miscCosts": [],
        "risks": []
    })
}
