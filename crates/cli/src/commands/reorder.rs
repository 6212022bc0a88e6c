//! Move one item of an ordered collection.

use std::sync::Arc;

use tracing::info;

use landing_cms_admin::editor::{OrderedCollectionEditor, ReorderOutcome};
use landing_cms_admin::store::CollectionStore;
use landing_cms_core::OrderedEntity;

use super::{CliError, CollectionArg, connect};

/// Move the item at `from` to `to` and persist the new order.
///
/// # Errors
///
/// Returns an error for out-of-range indices or if the order cannot be saved.
#[allow(clippy::print_stdout)]
pub async fn run(collection: CollectionArg, from: usize, to: usize) -> Result<(), CliError> {
    let backend = connect()?;
    let titles = match collection {
        CollectionArg::Features => move_item(backend.features.clone(), from, to).await?,
        CollectionArg::Products => move_item(backend.products.clone(), from, to).await?,
    };
    for (index, title) in titles.iter().enumerate() {
        println!("{index:>3}  {title}");
    }
    Ok(())
}

/// Reorder through the collection editor and return titles in the new order.
///
/// # Errors
///
/// Returns an error for out-of-range indices or if the order cannot be saved.
pub async fn move_item<E: OrderedEntity>(
    store: Arc<dyn CollectionStore<E>>,
    from: usize,
    to: usize,
) -> Result<Vec<String>, CliError> {
    let mut editor = OrderedCollectionEditor::new(store);
    editor.load().await?;

    match editor.reorder(from, to).await? {
        ReorderOutcome::Unchanged => info!(kind = E::KIND, from, "Already in place"),
        ReorderOutcome::Moved => info!(kind = E::KIND, from, to, "Moved"),
    }

    Ok(editor
        .items()
        .iter()
        .map(|item| item.title().to_string())
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use landing_cms_admin::editor::EditorError;
    use landing_cms_admin::store::MemoryStore;
    use landing_cms_core::{Feature, FeatureIcon, NewFeature, Position};

    use super::*;

    async fn store_with(titles: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for (index, title) in titles.iter().enumerate() {
            let new = NewFeature {
                title: (*title).to_string(),
                description: String::new(),
                icon: FeatureIcon::Users,
            };
            CollectionStore::<Feature>::insert(store.as_ref(), &new, Position::from_index(index))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_move_last_to_first() {
        let store = store_with(&["A", "B", "C"]).await;
        let titles = move_item::<Feature>(store, 2, 0).await.unwrap();
        assert_eq!(titles, ["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_move_out_of_range() {
        let store = store_with(&["A"]).await;
        let result = move_item::<Feature>(store, 0, 3).await;
        assert!(matches!(result, Err(CliError::Editor(EditorError::Ordering(_)))));
    }
}
