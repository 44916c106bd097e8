#![doc(test(attr(deny(warnings))))]

//! Costplan Core provides the estimation engine behind a project
//! cost-planning tool: timeline derivation, schema-tolerant field
//! resolution, aggregation, document migration, and persistence.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod export;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Costplan Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
