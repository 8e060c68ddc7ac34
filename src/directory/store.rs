use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{Coordinate, Profile};
use crate::error::{AppError, Result};

/// Edit applied to a stored profile. An error leaves the profile as it was.
pub type ProfileEdit = Box<dyn FnOnce(&mut Profile) -> Result<()> + Send>;

/// Storage port for directory entries.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// All profiles in insertion order.
    async fn list(&self) -> Result<Vec<Profile>>;
    async fn get(&self, id: &str) -> Result<Option<Profile>>;
    async fn contains(&self, id: &str) -> Result<bool>;

    /// Fails with `DuplicateId` if the id is taken.
    async fn insert(&self, profile: Profile) -> Result<()>;
    /// Reads, edits and writes back one profile as a single step, keeping its
    /// position. Returns the profile as stored.
    async fn update_with(&self, id: &str, edit: ProfileEdit) -> Result<Profile>;
    async fn remove(&self, id: &str) -> Result<Profile>;

    /// Sets coordinates only if the profile still exists and still has the
    /// address that was geocoded. Returns whether they were applied.
    async fn attach_coordinates(&self, id: &str, address: &str, coordinate: Coordinate) -> Result<bool>;
}

/// In-memory storage, lives as long as the process.
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<Vec<Profile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self { profiles: Arc::new(RwLock::new(profiles)) }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.profiles.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.profiles.read().await.iter().any(|p| p.id == id))
    }

    async fn insert(&self, profile: Profile) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        if profiles.iter().any(|p| p.id == profile.id) {
            return Err(AppError::DuplicateId(profile.id));
        }
        debug!("Created profile: {} with id {}", profile.name, profile.id);
        profiles.push(profile);
        Ok(())
    }

    async fn update_with(&self, id: &str, edit: ProfileEdit) -> Result<Profile> {
        let mut profiles = self.profiles.write().await;
        let slot = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        let mut edited = slot.clone();
        edit(&mut edited)?;
        debug!("Updated profile: {} with id {}", edited.name, edited.id);
        *slot = edited.clone();
        Ok(edited)
    }

    async fn remove(&self, id: &str) -> Result<Profile> {
        let mut profiles = self.profiles.write().await;
        let index = profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        let removed = profiles.remove(index);
        debug!("Removed profile: {} with id {}", removed.name, removed.id);
        Ok(removed)
    }

    async fn attach_coordinates(&self, id: &str, address: &str, coordinate: Coordinate) -> Result<bool> {
        let mut profiles = self.profiles.write().await;
        match profiles.iter_mut().find(|p| p.id == id) {
            Some(profile) if profile.address == address => {
                profile.coordinates = Some(coordinate);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
