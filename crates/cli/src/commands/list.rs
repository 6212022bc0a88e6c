//! Print content rows in display order.

use std::sync::Arc;

use landing_cms_admin::editor::{OrderedCollectionEditor, SectionEditor};
use landing_cms_admin::store::{Backend, CollectionStore};
use landing_cms_core::OrderedEntity;

use super::{CliError, ListTarget, connect};

/// List features, products or sections from the configured backend.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached.
#[allow(clippy::print_stdout)]
pub async fn run(target: ListTarget) -> Result<(), CliError> {
    let backend = connect()?;
    for line in lines(&backend, target).await? {
        println!("{line}");
    }
    Ok(())
}

/// One printable line per row.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn lines(backend: &Backend, target: ListTarget) -> Result<Vec<String>, CliError> {
    match target {
        ListTarget::Features => collection_lines(backend.features.clone()).await,
        ListTarget::Products => collection_lines(backend.products.clone()).await,
        ListTarget::Sections => {
            let mut editor = SectionEditor::new(backend.sections.clone());
            let sections = editor.load().await?;
            Ok(sections
                .values()
                .map(|section| format!("{:<12} {}", section.section_id, section.title))
                .collect())
        }
    }
}

async fn collection_lines<E: OrderedEntity>(
    store: Arc<dyn CollectionStore<E>>,
) -> Result<Vec<String>, CliError> {
    let mut editor = OrderedCollectionEditor::new(store);
    let items = editor.load().await?;
    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            format!(
                "{index:>3}  pos={:<4} {}  {}",
                item.position(),
                item.id(),
                item.title()
            )
        })
        .collect())
}
