//! Editor for position-ordered collections (products, feature cards).
//!
//! The editor keeps a local copy of the remote table in display order, tracks
//! whether the admin is creating or editing an entity, and turns a drag from
//! one index to another into one atomic position rewrite.

use std::sync::Arc;

use landing_cms_core::ordering::{
    assign_dense_positions, move_item, ordered_ids, position_after, sort_by_position,
};
use landing_cms_core::{EditForm, OrderedEntity};

use super::EditorError;
use crate::store::CollectionStore;

/// What the edit form is currently bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode<Id> {
    /// Nothing selected; the form is empty.
    Idle,
    /// The form holds values for a new entity.
    Creating,
    /// The form holds values for an existing entity.
    Editing(Id),
}

/// Result of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Source and destination were the same slot; nothing was written.
    Unchanged,
    /// The new order was persisted.
    Moved,
}

/// Local view of one ordered collection plus its edit form.
pub struct OrderedCollectionEditor<E: OrderedEntity> {
    store: Arc<dyn CollectionStore<E>>,
    items: Vec<E>,
    mode: EditorMode<E::Id>,
    form: E::Form,
}

impl<E: OrderedEntity> OrderedCollectionEditor<E> {
    /// Create an editor with an empty local list. Call [`Self::load`] first.
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore<E>>) -> Self {
        Self {
            store,
            items: Vec::new(),
            mode: EditorMode::Idle,
            form: E::Form::default(),
        }
    }

    /// Fetch all rows in position order, replacing the local list.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. The local list is left
    /// as it was.
    pub async fn load(&mut self) -> Result<&[E], EditorError> {
        let mut items = self.store.list().await?;
        sort_by_position(&mut items);
        self.items = items;
        Ok(&self.items)
    }

    #[must_use]
    pub fn items(&self) -> &[E] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn mode(&self) -> EditorMode<E::Id> {
        self.mode
    }

    /// Id of the entity being edited, if any.
    #[must_use]
    pub const fn selection(&self) -> Option<E::Id> {
        match self.mode {
            EditorMode::Editing(id) => Some(id),
            EditorMode::Idle | EditorMode::Creating => None,
        }
    }

    #[must_use]
    pub const fn form(&self) -> &E::Form {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut E::Form {
        &mut self.form
    }

    /// Start editing `id`, loading its values into the form.
    ///
    /// # Errors
    ///
    /// Returns `UnknownId` if `id` is not in the local list.
    pub fn select(&mut self, id: E::Id) -> Result<&E::Form, EditorError> {
        let entity = self
            .items
            .iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| EditorError::unknown_id::<E>(id))?;
        self.form = E::Form::from_entity(entity);
        self.mode = EditorMode::Editing(id);
        Ok(&self.form)
    }

    /// Switch to creating a new entity with an empty form.
    pub fn begin_create(&mut self) {
        self.form = E::Form::default();
        self.mode = EditorMode::Creating;
    }

    /// Discard the form and return to idle.
    pub fn cancel(&mut self) {
        self.form = E::Form::default();
        self.mode = EditorMode::Idle;
    }

    /// Save the form: create in `Creating` mode, update in `Editing` mode.
    ///
    /// Both paths reset the editor to idle on success.
    ///
    /// # Errors
    ///
    /// Returns `NotEditing` when idle, a validation error if the form is
    /// incomplete, or a store error.
    pub async fn submit(&mut self) -> Result<E, EditorError> {
        match self.mode {
            EditorMode::Idle => Err(EditorError::NotEditing),
            EditorMode::Creating => {
                let new = self.form.to_new()?;
                self.create(new).await
            }
            EditorMode::Editing(id) => {
                let patch = self.form.to_patch()?;
                let updated = self.update(id, patch).await?;
                self.cancel();
                Ok(updated)
            }
        }
    }

    /// Insert a new entity after the current last position.
    ///
    /// The position is taken from the store rather than the local list so a
    /// stale local copy cannot produce a duplicate.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the insert.
    pub async fn create(&mut self, new: E::New) -> Result<E, EditorError> {
        let position = position_after(self.store.max_position().await?)?;
        let created = self.store.insert(&new, position).await?;
        tracing::info!(kind = E::KIND, id = %created.id(), %position, "Created");

        self.cancel();
        self.load().await?;
        Ok(created)
    }

    /// Apply a partial update and refresh the list.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid fields, or a store error.
    pub async fn update(&mut self, id: E::Id, patch: E::Patch) -> Result<E, EditorError> {
        let patch = E::validate_patch(patch)?;
        let updated = self.store.update(id, &patch).await?;
        tracing::info!(kind = E::KIND, %id, "Updated");

        self.load().await?;
        Ok(updated)
    }

    /// Delete an entity. Positions of the remaining rows are not compacted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the delete.
    pub async fn delete(&mut self, id: E::Id) -> Result<(), EditorError> {
        self.store.delete(id).await?;
        tracing::info!(kind = E::KIND, %id, "Deleted");

        if self.selection() == Some(id) {
            self.cancel();
        }
        self.load().await?;
        Ok(())
    }

    /// Move the item at `from` to index `to` and persist the new order.
    ///
    /// The local list is reordered immediately. If the write fails, the list
    /// is re-read from the store and the error is returned once.
    ///
    /// # Errors
    ///
    /// Returns an ordering error for out-of-range indices (before any I/O) or
    /// `Reorder` if the new order could not be saved.
    pub async fn reorder(&mut self, from: usize, to: usize) -> Result<ReorderOutcome, EditorError> {
        let mut reordered = self.items.clone();
        if !move_item(&mut reordered, from, to)? {
            return Ok(ReorderOutcome::Unchanged);
        }
        assign_dense_positions(&mut reordered);

        let previous = std::mem::replace(&mut self.items, reordered);
        let ids = ordered_ids(&self.items);

        if let Err(error) = self.store.write_positions(&ids).await {
            tracing::error!(kind = E::KIND, from, to, error = %error, "Failed to save new order");
            if let Err(reload_error) = self.load().await {
                tracing::error!(kind = E::KIND, error = %reload_error, "Failed to reload after reorder");
                self.items = previous;
            }
            return Err(EditorError::Reorder(error));
        }

        tracing::info!(kind = E::KIND, from, to, "Reordered");
        if let Err(error) = self.load().await {
            tracing::warn!(kind = E::KIND, error = %error, "Reorder saved but reload failed");
        }
        Ok(ReorderOutcome::Moved)
    }

    /// Like [`Self::reorder`], but first checks that `expected` is the id at
    /// `from` in the current list.
    ///
    /// # Errors
    ///
    /// Returns `StaleOrder` if the caller's view of the list is out of date,
    /// otherwise as [`Self::reorder`].
    pub async fn reorder_checked(
        &mut self,
        from: usize,
        to: usize,
        expected: Option<E::Id>,
    ) -> Result<ReorderOutcome, EditorError> {
        if let Some(expected) = expected {
            let actual = self.items.get(from).map(OrderedEntity::id);
            if actual != Some(expected) {
                return Err(EditorError::StaleOrder {
                    kind: E::KIND,
                    index: from,
                    expected: expected.to_string(),
                });
            }
        }
        self.reorder(from, to).await
    }
}

impl<E: OrderedEntity> std::fmt::Debug for OrderedCollectionEditor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedCollectionEditor")
            .field("kind", &E::KIND)
            .field("items", &self.items.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use landing_cms_core::{
        Feature, FeatureForm, FeatureIcon, FeatureId, FeaturePatch, NewFeature, OrderingError,
        Position, Product, ProductForm,
    };

    use super::*;
    use crate::store::{MemoryStore, StoreError};

    /// Wraps the memory store, counting position writes and optionally
    /// failing them.
    struct Recording {
        inner: MemoryStore,
        fail_writes: AtomicBool,
        fail_lists: AtomicBool,
        writes: AtomicUsize,
    }

    impl Recording {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_writes: AtomicBool::new(false),
                fail_lists: AtomicBool::new(false),
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CollectionStore<Feature> for Recording {
        async fn list(&self) -> Result<Vec<Feature>, StoreError> {
            if self.fail_lists.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            CollectionStore::<Feature>::list(&self.inner).await
        }

        async fn max_position(&self) -> Result<Option<Position>, StoreError> {
            CollectionStore::<Feature>::max_position(&self.inner).await
        }

        async fn insert(&self, new: &NewFeature, position: Position) -> Result<Feature, StoreError> {
            CollectionStore::<Feature>::insert(&self.inner, new, position).await
        }

        async fn update(&self, id: FeatureId, patch: &FeaturePatch) -> Result<Feature, StoreError> {
            CollectionStore::<Feature>::update(&self.inner, id, patch).await
        }

        async fn delete(&self, id: FeatureId) -> Result<(), StoreError> {
            CollectionStore::<Feature>::delete(&self.inner, id).await
        }

        async fn write_positions(&self, ordered_ids: &[FeatureId]) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection reset".to_string()));
            }
            CollectionStore::<Feature>::write_positions(&self.inner, ordered_ids).await
        }
    }

    fn new_feature(title: &str) -> NewFeature {
        NewFeature {
            title: title.to_string(),
            description: String::new(),
            icon: FeatureIcon::Shield,
        }
    }

    async fn editor_with(titles: &[&str]) -> (OrderedCollectionEditor<Feature>, Arc<Recording>) {
        let store = Arc::new(Recording::new());
        let mut editor = OrderedCollectionEditor::<Feature>::new(store.clone());
        for title in titles {
            editor.create(new_feature(title)).await.unwrap();
        }
        (editor, store)
    }

    fn titles(editor: &OrderedCollectionEditor<Feature>) -> Vec<&str> {
        editor.items().iter().map(|f| f.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_appends_after_max_position() {
        let (editor, _) = editor_with(&["A", "B"]).await;
        let positions: Vec<i32> = editor.items().iter().map(|f| f.position.get()).collect();
        assert_eq!(positions, [1, 2]);
        assert_eq!(editor.mode(), EditorMode::Idle);
    }

    #[tokio::test]
    async fn test_create_into_empty_collection_gets_first_position() {
        let store: Arc<dyn CollectionStore<Product>> = Arc::new(MemoryStore::new());
        let mut editor = OrderedCollectionEditor::new(store);
        assert!(editor.load().await.unwrap().is_empty());

        editor.begin_create();
        editor.form_mut().title = "Starter".to_string();
        editor.form_mut().add_feature("1 site");
        let created = editor.submit().await.unwrap();

        assert_eq!(created.position, Position::FIRST);
        assert_eq!(created.features, ["1 site"]);
        assert_eq!(*editor.form(), ProductForm::default());
    }

    #[tokio::test]
    async fn test_reorder_moves_last_to_first() {
        let (mut editor, store) = editor_with(&["A", "B", "C"]).await;

        let outcome = editor.reorder(2, 0).await.unwrap();
        assert_eq!(outcome, ReorderOutcome::Moved);
        assert_eq!(titles(&editor), ["C", "A", "B"]);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        let positions: Vec<i32> = editor.items().iter().map(|f| f.position.get()).collect();
        assert_eq!(positions, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_reorder_same_slot_writes_nothing() {
        let (mut editor, store) = editor_with(&["A", "B"]).await;
        assert_eq!(
            editor.reorder(1, 1).await.unwrap(),
            ReorderOutcome::Unchanged
        );
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reorder_out_of_range_rejected_before_io() {
        let (mut editor, store) = editor_with(&["A", "B"]).await;
        let result = editor.reorder(0, 5).await;
        assert!(matches!(
            result,
            Err(EditorError::Ordering(OrderingError::IndexOutOfBounds { index: 5, len: 2 }))
        ));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(titles(&editor), ["A", "B"]);
    }

    #[tokio::test]
    async fn test_reorder_failure_restores_remote_order() {
        let (mut editor, store) = editor_with(&["A", "B", "C"]).await;
        store.fail_writes.store(true, Ordering::SeqCst);

        let result = editor.reorder(0, 2).await;
        assert!(matches!(result, Err(EditorError::Reorder(_))));
        assert_eq!(titles(&editor), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_reorder_keeps_previous_list_when_reload_also_fails() {
        let (mut editor, store) = editor_with(&["A", "B", "C"]).await;
        store.fail_writes.store(true, Ordering::SeqCst);
        store.fail_lists.store(true, Ordering::SeqCst);

        let result = editor.reorder(2, 0).await;
        assert!(matches!(
            result,
            Err(EditorError::Reorder(StoreError::Unavailable(ref msg))) if msg == "connection reset"
        ));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(titles(&editor), ["A", "B", "C"]);
        let positions: Vec<i32> = editor.items().iter().map(|f| f.position.get()).collect();
        assert_eq!(positions, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_create_after_last_position_is_rejected() {
        let store = Arc::new(Recording::new());
        CollectionStore::<Feature>::insert(&store.inner, &new_feature("Last"), Position::new(i32::MAX))
            .await
            .unwrap();
        let mut editor = OrderedCollectionEditor::<Feature>::new(store.clone());

        let result = editor.create(new_feature("Overflow")).await;
        assert!(matches!(
            result,
            Err(EditorError::Ordering(OrderingError::PositionOverflow(_)))
        ));
        assert_eq!(CollectionStore::<Feature>::list(&store.inner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reorder_checked_rejects_stale_id() {
        let (mut editor, store) = editor_with(&["A", "B"]).await;
        let b = editor.items()[1].id;

        let result = editor.reorder_checked(0, 1, Some(b)).await;
        assert!(matches!(result, Err(EditorError::StaleOrder { index: 0, .. })));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);

        let a = editor.items()[0].id;
        assert_eq!(
            editor.reorder_checked(0, 1, Some(a)).await.unwrap(),
            ReorderOutcome::Moved
        );
    }

    #[tokio::test]
    async fn test_select_and_submit_update() {
        let (mut editor, _) = editor_with(&["A", "B"]).await;
        let id = editor.items()[1].id;

        let form = editor.select(id).unwrap();
        assert_eq!(form.title, "B");
        assert_eq!(editor.selection(), Some(id));

        editor.form_mut().title = "Better".to_string();
        editor.form_mut().icon = FeatureIcon::Clock;
        let updated = editor.submit().await.unwrap();

        assert_eq!(updated.title, "Better");
        assert_eq!(updated.icon, FeatureIcon::Clock);
        assert_eq!(editor.selection(), None);
        assert_eq!(titles(&editor), ["A", "Better"]);
    }

    #[tokio::test]
    async fn test_select_unknown_id() {
        let (mut editor, _) = editor_with(&["A"]).await;
        let result = editor.select(FeatureId::generate());
        assert!(matches!(result, Err(EditorError::UnknownId { .. })));
    }

    #[tokio::test]
    async fn test_submit_when_idle() {
        let (mut editor, _) = editor_with(&[]).await;
        assert!(matches!(editor.submit().await, Err(EditorError::NotEditing)));
    }

    #[tokio::test]
    async fn test_submit_blank_title_is_validation_error() {
        let (mut editor, _) = editor_with(&[]).await;
        editor.begin_create();
        assert!(matches!(
            editor.submit().await,
            Err(EditorError::Validation(_))
        ));
        assert_eq!(editor.mode(), EditorMode::Creating);
    }

    #[tokio::test]
    async fn test_delete_clears_selection_and_keeps_gaps() {
        let (mut editor, _) = editor_with(&["A", "B", "C"]).await;
        let b = editor.items()[1].id;
        editor.select(b).unwrap();

        editor.delete(b).await.unwrap();
        assert_eq!(editor.selection(), None);
        assert_eq!(*editor.form(), FeatureForm::default());

        let positions: Vec<i32> = editor.items().iter().map(|f| f.position.get()).collect();
        assert_eq!(positions, [1, 3]);

        let created = editor.create(new_feature("D")).await.unwrap();
        assert_eq!(created.position, Position::new(4));
    }

    #[tokio::test]
    async fn test_cancel_resets_form() {
        let (mut editor, _) = editor_with(&["A"]).await;
        let id = editor.items()[0].id;
        editor.select(id).unwrap();
        editor.cancel();
        assert_eq!(editor.mode(), EditorMode::Idle);
        assert_eq!(*editor.form(), FeatureForm::default());
    }
}
