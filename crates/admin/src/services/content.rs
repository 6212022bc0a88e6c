//! Public landing page content.
//!
//! Assembles sections, products and feature cards into one payload and caches
//! it (`moka`). Admin writes invalidate the cache, so the TTL only bounds how
//! stale content can get when another process edits the backend directly.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use landing_cms_core::LandingContent;

use crate::store::{Backend, StoreError};

/// Cached landing content reader.
#[derive(Clone)]
pub struct ContentService {
    backend: Backend,
    cache: Cache<(), Arc<LandingContent>>,
    /// Bumped by every invalidation. A read only caches its payload if no
    /// invalidation happened while it was fetching.
    generation: Arc<AtomicU64>,
}

impl ContentService {
    /// Create a content service with the given cache TTL.
    #[must_use]
    pub fn new(backend: Backend, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self {
            backend,
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current landing content, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three tables cannot be read.
    #[instrument(skip(self))]
    pub async fn landing(&self) -> Result<Arc<LandingContent>, StoreError> {
        if let Some(content) = self.cache.get(&()).await {
            debug!("Landing content cache hit");
            return Ok(content);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let (sections, products, features) = tokio::try_join!(
            self.backend.sections.list_sections(),
            self.backend.products.list(),
            self.backend.features.list(),
        )?;

        let content = Arc::new(LandingContent::new(sections, products, features));
        if self.generation.load(Ordering::SeqCst) == generation {
            self.cache.insert((), content.clone()).await;
            // An invalidation may land between the check and the insert
            if self.generation.load(Ordering::SeqCst) != generation {
                self.cache.invalidate(&()).await;
            }
        } else {
            debug!("Content changed during read; not caching");
        }
        Ok(content)
    }

    /// Drop the cached payload so the next read hits the store.
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(&()).await;
        debug!("Landing content cache invalidated");
    }
}

impl std::fmt::Debug for ContentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentService")
            .field("cached", &self.cache.contains_key(&()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use async_trait::async_trait;
    use landing_cms_core::{
        Feature, FeatureIcon, FeatureId, FeaturePatch, NewFeature, Position, SectionKey,
        SectionUpdate,
    };
    use tokio::sync::Notify;

    use super::*;
    use crate::store::{CollectionStore, MemoryStore, SectionStore};

    /// Feature store whose first `list` pauses after reading until released.
    struct PausedFeatures {
        inner: Arc<MemoryStore>,
        pause_next: AtomicBool,
        listed: Notify,
        release: Notify,
    }

    #[async_trait]
    impl CollectionStore<Feature> for PausedFeatures {
        async fn list(&self) -> Result<Vec<Feature>, StoreError> {
            let rows = CollectionStore::<Feature>::list(self.inner.as_ref()).await?;
            if self.pause_next.swap(false, Ordering::SeqCst) {
                self.listed.notify_one();
                self.release.notified().await;
            }
            Ok(rows)
        }

        async fn max_position(&self) -> Result<Option<Position>, StoreError> {
            CollectionStore::<Feature>::max_position(self.inner.as_ref()).await
        }

        async fn insert(&self, new: &NewFeature, position: Position) -> Result<Feature, StoreError> {
            CollectionStore::<Feature>::insert(self.inner.as_ref(), new, position).await
        }

        async fn update(&self, id: FeatureId, patch: &FeaturePatch) -> Result<Feature, StoreError> {
            CollectionStore::<Feature>::update(self.inner.as_ref(), id, patch).await
        }

        async fn delete(&self, id: FeatureId) -> Result<(), StoreError> {
            CollectionStore::<Feature>::delete(self.inner.as_ref(), id).await
        }

        async fn write_positions(&self, ordered_ids: &[FeatureId]) -> Result<(), StoreError> {
            CollectionStore::<Feature>::write_positions(self.inner.as_ref(), ordered_ids).await
        }
    }

    fn fast() -> NewFeature {
        NewFeature {
            title: "Fast".to_string(),
            description: String::new(),
            icon: FeatureIcon::Zap,
        }
    }

    #[tokio::test]
    async fn test_landing_is_cached_until_invalidated() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert_section(
                &SectionKey::hero(),
                &SectionUpdate {
                    title: "Hello".to_string(),
                    description: None,
                    image_url: None,
                },
            )
            .await
            .unwrap();
        let service = ContentService::new(Backend::memory(store.clone()), Duration::from_secs(60));

        let first = service.landing().await.unwrap();
        assert_eq!(first.section(&SectionKey::hero()).unwrap().title, "Hello");
        assert!(first.features.is_empty());

        CollectionStore::<Feature>::insert(store.as_ref(), &fast(), Position::FIRST)
            .await
            .unwrap();

        assert!(service.landing().await.unwrap().features.is_empty());

        service.invalidate().await;
        assert_eq!(service.landing().await.unwrap().features.len(), 1);
    }

    #[tokio::test]
    async fn test_read_overlapping_an_edit_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let features = Arc::new(PausedFeatures {
            inner: store.clone(),
            pause_next: AtomicBool::new(true),
            listed: Notify::new(),
            release: Notify::new(),
        });
        let backend = Backend {
            features: features.clone(),
            ..Backend::memory(store.clone())
        };
        let service = ContentService::new(backend, Duration::from_secs(60));

        let reader = tokio::spawn({
            let service = service.clone();
            async move { service.landing().await }
        });
        features.listed.notified().await;

        CollectionStore::<Feature>::insert(store.as_ref(), &fast(), Position::FIRST)
            .await
            .unwrap();
        service.invalidate().await;
        features.release.notify_one();

        let before_edit = reader.await.unwrap().unwrap();
        assert!(before_edit.features.is_empty());
        assert_eq!(service.landing().await.unwrap().features.len(), 1);
    }
}
