pub mod common;
pub mod line_items;
pub mod project;
pub mod rate_card;

pub use common::{new_record_id, Identifiable, NamedEntity};
pub use line_items::{InternalResource, MiscCost, MonthSeries, Risk, ToolCost, VendorCost};
pub use project::{LegacyRate, Project, ProjectInfo};
pub use rate_card::{rate_for_role, RateCard, RateCategory};
