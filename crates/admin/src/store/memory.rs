//! In-process content store.
//!
//! Used when `STORE_BACKEND=memory` and as the fixture behind the admin tests.
//! Writes are applied under one table lock, so `write_positions` is atomic in
//! the same way the backend's reorder functions are.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

use landing_cms_core::ordering::sort_by_position;
use landing_cms_core::{
    Feature, FeatureId, OrderedEntity, PageContentId, PageSection, Position, Product, ProductId,
    SectionKey, SectionUpdate,
};

use super::{CollectionStore, SectionStore, StoreError};
use crate::services::auth::Authenticator;

/// In-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    sections: RwLock<BTreeMap<SectionKey, PageSection>>,
    products: RwLock<Vec<Product>>,
    features: RwLock<Vec<Feature>>,
    admins: RwLock<HashMap<String, SecretString>>,
}

impl MemoryStore {
    /// Empty store with no admin accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with one admin account.
    #[must_use]
    pub fn with_admin(username: &str, password: SecretString) -> Self {
        let admins = HashMap::from([(username.to_string(), password)]);
        Self {
            admins: RwLock::new(admins),
            ..Self::default()
        }
    }

    /// Add or replace an admin account.
    pub async fn add_admin(&self, username: &str, password: SecretString) {
        self.admins
            .write()
            .await
            .insert(username.to_string(), password);
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

/// Entities with a table in [`MemoryStore`].
pub trait MemoryTable: OrderedEntity {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>>;

    fn new_id() -> Self::Id;
}

impl MemoryTable for Product {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.products
    }

    fn new_id() -> ProductId {
        ProductId::generate()
    }
}

impl MemoryTable for Feature {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.features
    }

    fn new_id() -> FeatureId {
        FeatureId::generate()
    }
}

fn not_found<E: OrderedEntity>(id: E::Id) -> StoreError {
    StoreError::NotFound(format!("{} {id}", E::KIND))
}

#[async_trait]
impl<E: MemoryTable> CollectionStore<E> for MemoryStore {
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        let mut rows = E::table(self).read().await.clone();
        sort_by_position(&mut rows);
        Ok(rows)
    }

    async fn max_position(&self) -> Result<Option<Position>, StoreError> {
        Ok(E::table(self)
            .read()
            .await
            .iter()
            .map(OrderedEntity::position)
            .max())
    }

    async fn insert(&self, new: &E::New, position: Position) -> Result<E, StoreError> {
        let row = E::from_new(E::new_id(), new.clone(), position, Utc::now());
        E::table(self).write().await.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: E::Id, patch: &E::Patch) -> Result<E, StoreError> {
        let mut rows = E::table(self).write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(|| not_found::<E>(id))?;
        row.apply_patch(patch, Utc::now());
        Ok(row.clone())
    }

    async fn delete(&self, id: E::Id) -> Result<(), StoreError> {
        let mut rows = E::table(self).write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(not_found::<E>(id));
        }
        Ok(())
    }

    async fn write_positions(&self, ordered_ids: &[E::Id]) -> Result<(), StoreError> {
        let mut rows = E::table(self).write().await;

        let wanted: HashSet<E::Id> = ordered_ids.iter().copied().collect();
        let stored: HashSet<E::Id> = rows.iter().map(OrderedEntity::id).collect();
        if wanted.len() != ordered_ids.len() || wanted != stored {
            return Err(StoreError::Conflict(format!(
                "stale order: {} ids given for {} {} rows",
                ordered_ids.len(),
                rows.len(),
                E::KIND
            )));
        }

        for (index, id) in ordered_ids.iter().enumerate() {
            if let Some(row) = rows.iter_mut().find(|row| row.id() == *id) {
                row.set_position(Position::from_index(index));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SectionStore for MemoryStore {
    async fn list_sections(&self) -> Result<Vec<PageSection>, StoreError> {
        Ok(self.sections.read().await.values().cloned().collect())
    }

    async fn update_section(
        &self,
        key: &SectionKey,
        update: &SectionUpdate,
    ) -> Result<PageSection, StoreError> {
        let mut sections = self.sections.write().await;
        let section = sections
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(format!("section {key}")))?;
        section.apply(update, Utc::now());
        Ok(section.clone())
    }

    async fn upsert_section(
        &self,
        key: &SectionKey,
        update: &SectionUpdate,
    ) -> Result<PageSection, StoreError> {
        let now = Utc::now();
        let mut sections = self.sections.write().await;
        let section = sections.entry(key.clone()).or_insert_with(|| PageSection {
            id: PageContentId::generate(),
            section_id: key.clone(),
            title: String::new(),
            description: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        });
        section.apply(update, now);
        Ok(section.clone())
    }
}

#[async_trait]
impl Authenticator for MemoryStore {
    async fn verify(&self, username: &str, password: &SecretString) -> Result<bool, StoreError> {
        Ok(self
            .admins
            .read()
            .await
            .get(username)
            .is_some_and(|stored| {
                constant_time_eq(
                    stored.expose_secret().as_bytes(),
                    password.expose_secret().as_bytes(),
                )
            }))
    }
}

/// Byte comparison whose timing does not depend on where the inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use landing_cms_core::{FeatureIcon, NewFeature, NewProduct, ProductPatch};

    use super::*;

    fn new_feature(title: &str) -> NewFeature {
        NewFeature {
            title: title.to_string(),
            description: String::new(),
            icon: FeatureIcon::Check,
        }
    }

    async fn seeded(titles: &[&str]) -> (MemoryStore, Vec<FeatureId>) {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for (index, title) in titles.iter().enumerate() {
            let row = CollectionStore::<Feature>::insert(
                &store,
                &new_feature(title),
                Position::from_index(index),
            )
            .await
            .unwrap();
            ids.push(row.id);
        }
        (store, ids)
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_position() {
        let store = MemoryStore::new();
        CollectionStore::<Feature>::insert(&store, &new_feature("B"), Position::new(2))
            .await
            .unwrap();
        CollectionStore::<Feature>::insert(&store, &new_feature("A"), Position::new(1))
            .await
            .unwrap();

        let rows = CollectionStore::<Feature>::list(&store).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
    }

    #[tokio::test]
    async fn test_max_position() {
        let (store, _) = seeded(&["A", "B", "C"]).await;
        let max = CollectionStore::<Feature>::max_position(&store).await.unwrap();
        assert_eq!(max, Some(Position::new(3)));

        let empty = CollectionStore::<Product>::max_position(&store).await.unwrap();
        assert_eq!(empty, None);
    }

    #[tokio::test]
    async fn test_write_positions_rewrites_dense() {
        let (store, ids) = seeded(&["A", "B", "C"]).await;
        let order = [ids[2], ids[0], ids[1]];
        CollectionStore::<Feature>::write_positions(&store, &order)
            .await
            .unwrap();

        let rows = CollectionStore::<Feature>::list(&store).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["C", "A", "B"]);
        assert!(landing_cms_core::ordering::is_dense(&rows));
    }

    #[tokio::test]
    async fn test_write_positions_rejects_stale_ids() {
        let (store, ids) = seeded(&["A", "B", "C"]).await;

        let missing = [ids[1], ids[0]];
        let result = CollectionStore::<Feature>::write_positions(&store, &missing).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let duplicated = [ids[0], ids[0], ids[1]];
        let result = CollectionStore::<Feature>::write_positions(&store, &duplicated).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let rows = CollectionStore::<Feature>::list(&store).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryStore::new();
        let result = CollectionStore::<Product>::update(
            &store,
            ProductId::generate(),
            &ProductPatch::default(),
        )
        .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        let result = CollectionStore::<Product>::delete(&store, ProductId::generate()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_product_patch_clears_image() {
        let store = MemoryStore::new();
        let new = NewProduct {
            title: "Pro".to_string(),
            description: String::new(),
            image_url: Some("https://cdn.example.com/pro.png".to_string()),
            features: vec![],
        };
        let product = CollectionStore::<Product>::insert(&store, &new, Position::FIRST)
            .await
            .unwrap();

        let patch = ProductPatch {
            image_url: Some(None),
            ..ProductPatch::default()
        };
        let updated = CollectionStore::<Product>::update(&store, product.id, &patch)
            .await
            .unwrap();
        assert_eq!(updated.image_url, None);
        assert_eq!(updated.title, "Pro");
    }

    #[tokio::test]
    async fn test_sections_update_requires_existing_key() {
        let store = MemoryStore::new();
        let update = SectionUpdate {
            title: "About us".to_string(),
            description: Some("Since 2019".to_string()),
            image_url: None,
        };

        let missing = store.update_section(&SectionKey::about(), &update).await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));

        let created = store
            .upsert_section(&SectionKey::about(), &update)
            .await
            .unwrap();
        let updated = store
            .update_section(&SectionKey::about(), &update)
            .await
            .unwrap();
        assert_eq!(created.id, updated.id);
        assert_eq!(store.list_sections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_verify_admin() {
        let store = MemoryStore::with_admin("admin", SecretString::from("correct horse"));
        assert!(store
            .verify("admin", &SecretString::from("correct horse"))
            .await
            .unwrap());
        assert!(!store
            .verify("admin", &SecretString::from("wrong"))
            .await
            .unwrap());
        assert!(!store
            .verify("nobody", &SecretString::from("correct horse"))
            .await
            .unwrap());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hunter2", b"hunter2"));
        assert!(!constant_time_eq(b"hunter2", b"hunter3"));
        assert!(!constant_time_eq(b"hunter2", b"hunter22"));
        assert!(constant_time_eq(b"", b""));
    }
}
