pub mod directory;
pub mod past_events;
pub mod registrations;

pub use directory::{DirectoryEntry, DirectorySearch, DirectoryState};
pub use past_events::PastEvents;
pub use registrations::{ParticipantsState, RegistrationList};
