use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use super::filter::{collect_interests, ProfileFilter};
use super::store::ProfileStore;
use crate::domain::{validate_draft, Coordinate, Profile, ProfileDraft, ProfileUpdate};
use crate::error::{AppError, Result};
use crate::geocoding::{self, Geocoder};
use crate::maps::MapView;
use crate::observability::metrics;

pub const PROFILE_MAP_ZOOM: u8 = 15;

/// Background geocode started by a save. Awaiting it is optional.
pub struct GeocodeTask {
    handle: JoinHandle<Option<Coordinate>>,
}

impl GeocodeTask {
    /// Waits for the lookup; `None` when nothing was attached.
    pub async fn settle(self) -> Option<Coordinate> {
        match self.handle.await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                warn!(error = %e, "geocode task did not complete");
                None
            }
        }
    }
}

/// Result of a create or update: the stored profile as of the save.
pub struct Saved {
    pub profile: Profile,
    pub geocoding: GeocodeTask,
}

/// Directory use cases over a [`ProfileStore`] and a [`Geocoder`].
pub struct DirectoryService {
    store: Arc<dyn ProfileStore>,
    geocoder: Arc<dyn Geocoder>,
    profile_zoom: u8,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn ProfileStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder, profile_zoom: PROFILE_MAP_ZOOM }
    }

    pub fn with_profile_zoom(mut self, zoom: u8) -> Self {
        self.profile_zoom = zoom;
        self
    }

    pub async fn list(&self, filter: &ProfileFilter) -> Result<Vec<Profile>> {
        let profiles = self.store.list().await?;
        Ok(filter.apply(profiles))
    }

    pub async fn get(&self, id: &str) -> Result<Profile> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    pub async fn interests(&self) -> Result<Vec<String>> {
        Ok(collect_interests(&self.store.list().await?))
    }

    /// Saves a new profile right away; coordinates follow when the geocoder
    /// answers.
    pub async fn create(&self, draft: ProfileDraft) -> Result<Saved> {
        let draft = draft.normalized();
        validate_draft(&draft).map_err(AppError::Validation)?;

        let id = self.fresh_id().await?;
        let profile = Profile::from_draft(id, draft, Utc::now());
        self.store.insert(profile.clone()).await?;
        metrics::directory::profile_created();
        info!(id = %profile.id, name = %profile.name, "profile added");

        let geocoding = self.spawn_geocode(&profile.id, &profile.address);
        Ok(Saved { profile, geocoding })
    }

    /// Merges the edit into the stored profile. Coordinates are kept until a
    /// new lookup of the (possibly new) address succeeds.
    pub async fn update(&self, id: &str, update: ProfileUpdate) -> Result<Saved> {
        // One store step, so coordinates attached meanwhile are not lost.
        let profile = self
            .store
            .update_with(
                id,
                Box::new(move |profile: &mut Profile| {
                    profile.apply(update);
                    let draft = profile.as_draft().normalized();
                    validate_draft(&draft).map_err(AppError::Validation)?;
                    *profile = Profile {
                        id: profile.id.clone(),
                        coordinates: profile.coordinates,
                        joined_at: profile.joined_at,
                        ..Profile::from_draft(String::new(), draft, profile.joined_at)
                    };
                    Ok(())
                }),
            )
            .await?;
        metrics::directory::profile_updated();
        info!(id = %profile.id, "profile updated");

        let geocoding = self.spawn_geocode(&profile.id, &profile.address);
        Ok(Saved { profile, geocoding })
    }

    pub async fn delete(&self, id: &str) -> Result<Profile> {
        let removed = self.store.remove(id).await?;
        metrics::directory::profile_deleted();
        info!(id = %removed.id, "profile deleted");
        Ok(removed)
    }

    /// Inputs for the profile's map modal; `None` when it has no location.
    pub async fn map_request(&self, id: &str) -> Result<Option<MapView>> {
        let profile = self.get(id).await?;
        Ok(profile.coordinates.map(|coordinate| {
            MapView::new(coordinate)
                .with_markers(vec![coordinate])
                .with_zoom(self.profile_zoom)
        }))
    }

    pub async fn geocode(&self, address: &str) -> Option<Coordinate> {
        geocoding::resolve(self.geocoder.as_ref(), address).await
    }

    async fn fresh_id(&self) -> Result<String> {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.store.contains(&id).await? {
                return Ok(id);
            }
            debug!(%id, "generated id already taken, retrying");
        }
    }

    fn spawn_geocode(&self, id: &str, address: &str) -> GeocodeTask {
        let store = Arc::clone(&self.store);
        let geocoder = Arc::clone(&self.geocoder);
        let id = id.to_string();
        let address = address.to_string();
        let span = tracing::info_span!("geocode", profile = %id);

        let handle = tokio::spawn(
            async move {
                let coordinate = geocoding::resolve(geocoder.as_ref(), &address).await?;
                match store.attach_coordinates(&id, &address, coordinate).await {
                    Ok(true) => {
                        debug!(%coordinate, "coordinates attached");
                        Some(coordinate)
                    }
                    Ok(false) => {
                        debug!("profile changed or removed before geocoding finished");
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "could not attach coordinates");
                        None
                    }
                }
            }
            .instrument(span),
        );
        GeocodeTask { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::seed_profiles;
    use crate::directory::store::InMemoryProfileStore;
    use crate::geocoding::FixedGeocoder;

    fn service() -> DirectoryService {
        let store = Arc::new(InMemoryProfileStore::with_profiles(seed_profiles()));
        let geocoder = FixedGeocoder::with_seed_addresses()
            .with("Pike Place Market, Seattle", Coordinate::new(47.6097, -122.3422));
        DirectoryService::new(store, Arc::new(geocoder))
    }

    fn draft(address: &str) -> ProfileDraft {
        ProfileDraft {
            name: "  Grace Hopper ".to_string(),
            photo: String::new(),
            description: "Compiler pioneer".to_string(),
            address: address.to_string(),
            email: "grace@example.com".to_string(),
            phone: "+1 555 0000".to_string(),
            interests: vec!["COBOL".to_string(), " COBOL".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_id_and_geocodes() {
        let service = service();
        let saved = service.create(draft("Pike Place Market, Seattle")).await.unwrap();
        assert_eq!(saved.profile.name, "Grace Hopper");
        assert_eq!(saved.profile.interests, vec!["COBOL".to_string()]);
        assert!(saved.profile.coordinates.is_none());
        assert!(!["1", "2", "3"].contains(&saved.profile.id.as_str()));

        let coordinate = saved.geocoding.settle().await;
        assert_eq!(coordinate, Some(Coordinate::new(47.6097, -122.3422)));
        let stored = service.get(&saved.profile.id).await.unwrap();
        assert_eq!(stored.coordinates, coordinate);
    }

    #[tokio::test]
    async fn test_create_survives_unresolvable_address() {
        let service = service();
        let saved = service.create(draft("Atlantis")).await.unwrap();
        assert_eq!(saved.geocoding.settle().await, None);

        let stored = service.get(&saved.profile.id).await.unwrap();
        assert!(stored.coordinates.is_none());
        assert!(service.map_request(&stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let service = service();
        let mut bad = draft("Atlantis");
        bad.email = "nope".to_string();
        match service.create(bad).await {
            Err(AppError::Validation(errors)) => assert_eq!(errors.get("email"), Some("Email is invalid")),
            other => panic!("unexpected result {:?}", other.map(|s| s.profile)),
        }
        assert_eq!(service.list(&ProfileFilter::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_preserves_identity_and_location_on_miss() {
        let service = service();
        let before = service.get("1").await.unwrap();

        let saved = service
            .update(
                "1",
                ProfileUpdate { address: Some("Somewhere unknown".to_string()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(saved.geocoding.settle().await, None);

        let after = service.get("1").await.unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.joined_at, before.joined_at);
        assert_eq!(after.name, before.name);
        assert_eq!(after.address, "Somewhere unknown");
        assert_eq!(after.coordinates, before.coordinates);
    }

    #[tokio::test]
    async fn test_update_validation_leaves_profile_untouched() {
        let service = service();
        let result = service
            .update("2", ProfileUpdate { name: Some("   ".to_string()), ..Default::default() })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(service.get("2").await.unwrap().name, "Jane Smith");
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let service = service();
        let removed = service.delete("2").await.unwrap();
        assert_eq!(removed.name, "Jane Smith");

        let ids: Vec<String> = service
            .list(&ProfileFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(matches!(service.delete("2").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_map_view_for_seeded_profile() {
        let service = service().with_profile_zoom(12);
        let view = service.map_request("3").await.unwrap().unwrap();
        assert_eq!(view.center, Coordinate::new(47.6205099, -122.3492774));
        assert_eq!(view.markers, vec![view.center]);
        assert_eq!(view.zoom, 12);
    }

    #[tokio::test]
    async fn test_geocode_result_dropped_after_delete() {
        let service = service();
        let saved = service.create(draft("Pike Place Market, Seattle")).await.unwrap();
        service.delete(&saved.profile.id).await.unwrap();
        // Either the lookup finished before the delete or its result is discarded.
        let _ = saved.geocoding.settle().await;
        assert!(matches!(service.get(&saved.profile.id).await, Err(AppError::NotFound(_))));
    }
}
