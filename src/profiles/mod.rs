pub mod dto;
pub mod fields;
pub mod follow;
pub mod loader;
pub mod services;
pub mod tabs;
pub mod view;

pub use dto::{CurrentUser, Profile, PublicProfile, Role};
pub use loader::{LoadedProfile, ProfileLoader, ProfileScreen};
pub use tabs::{tabs_for, SubTab, Tab, TabController};
pub use view::{Panel, RoleProfileView, TabContent};
