use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
///
/// Identifiers are strings on the wire: fresh records get UUIDs, while
/// tokens carried over from older documents are preserved verbatim.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Allocates a fresh unique record identifier.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use serde;
pub use uuid;
