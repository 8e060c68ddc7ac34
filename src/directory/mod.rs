//! The profile directory: storage port, filtering and the use cases the web
//! and CLI layers call.

pub mod filter;
pub mod seed;
pub mod service;
pub mod store;

pub use filter::{collect_interests, ProfileFilter};
pub use seed::seed_profiles;
pub use service::{DirectoryService, GeocodeTask, Saved, PROFILE_MAP_ZOOM};
pub use store::{InMemoryProfileStore, ProfileEdit, ProfileStore};
