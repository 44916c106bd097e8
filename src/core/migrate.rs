//! Load-time migration of persisted documents.
//!
//! Persisted documents carry no version field; the format is inferred
//! structurally. A document without a unified rate-card collection but
//! with the legacy `internalRates`/`externalRates` lists gets rate cards
//! synthesized from those lists. Migration is additive: the legacy lists
//! are preserved so nothing is lost, but they are frozen — no later edit
//! touches them.

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::common::new_record_id;
use crate::domain::project::{LegacyRate, Project};
use crate::domain::rate_card::{RateCard, RateCategory};

/// Result of loading one document: the migrated project plus what
/// happened on the way in.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub project: Project,
    pub migrations: Vec<String>,
    pub warnings: Vec<String>,
}

/// Parses and migrates a raw JSON document.
///
/// Fails safe: malformed input produces a fresh default project and a
/// warning, never an error.
pub fn load_project_str(raw: &str) -> MigrationOutcome {
    match serde_json::from_str::<Value>(raw) {
        Ok(document) => migrate_document(document),
        Err(err) => {
            warn!("discarding unreadable project document: {err}");
            fallback_outcome(format!("document is not valid JSON ({err}); starting fresh"))
        }
    }
}

/// Migrates an already-parsed document into a canonical [`Project`].
///
/// Running this on an already-migrated document is a no-op.
pub fn migrate_document(document: Value) -> MigrationOutcome {
    let mut project: Project = match serde_json::from_value(document) {
        Ok(project) => project,
        Err(err) => {
            warn!("discarding malformed project document: {err}");
            return fallback_outcome(format!(
                "document does not match the expected shape ({err}); starting fresh"
            ));
        }
    };

    let mut migrations = Vec::new();
    if project.rate_cards.is_empty()
        && (!project.internal_rates.is_empty() || !project.external_rates.is_empty())
    {
        let synthesized = synthesize_rate_cards(&project.internal_rates, &project.external_rates);
        let count = synthesized.len();
        project.rate_cards = synthesized;
        info!("synthesized {count} rate cards from legacy rate lists");
        migrations.push(format!(
            "synthesized {count} rate cards from legacy rate lists"
        ));
    }

    let warnings = project.warnings();
    MigrationOutcome {
        project,
        migrations,
        warnings,
    }
}

fn synthesize_rate_cards(internal: &[LegacyRate], external: &[LegacyRate]) -> Vec<RateCard> {
    let tagged = internal
        .iter()
        .map(|rate| (rate, RateCategory::Internal))
        .chain(external.iter().map(|rate| (rate, RateCategory::External)));
    tagged
        .map(|(rate, category)| RateCard {
            id: rate.id.clone().unwrap_or_else(new_record_id),
            role: rate.role.clone(),
            rate: rate.rate,
            category,
        })
        .collect()
}

fn fallback_outcome(warning: String) -> MigrationOutcome {
    MigrationOutcome {
        project: Project::default(),
        migrations: Vec::new(),
        warnings: vec![warning],
    }
}
