pub mod dto;
pub mod partition;
pub mod services;

pub use dto::{Event, Organization, Skill};
pub use partition::{partition, split_running_past, EventPartition};
pub use services::{fetch_events_by_ids, load_catalog, Catalog};
