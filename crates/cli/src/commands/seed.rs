//! Seed landing content from a YAML file.
//!
//! # File format
//!
//! ```yaml
//! sections:
//!   hero:
//!     title: Build your site in minutes
//!     description: No code required.
//!     image_url: https://cdn.example.com/hero.png
//! features:
//!   - title: Fast
//!     description: Pages load instantly.
//!     icon: Zap
//! products:
//!   - title: Starter
//!     description: For small teams.
//!     features: [1 site, Email support]
//! ```
//!
//! Sections are upserted by key. Features and products are appended after the
//! existing rows, or replace them with `--replace-collections`. The whole file
//! is validated before anything is written.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};

use landing_cms_admin::editor::OrderedCollectionEditor;
use landing_cms_admin::store::{Backend, CollectionStore, SectionStore};
use landing_cms_core::{
    EditForm, FeatureForm, NewFeature, NewProduct, OrderedEntity, ProductForm, SectionKey,
    SectionUpdate,
};

use super::{CliError, connect};

/// Raw seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub sections: BTreeMap<SectionKey, SectionUpdate>,
    #[serde(default)]
    pub features: Vec<FeatureForm>,
    #[serde(default)]
    pub products: Vec<ProductForm>,
}

/// Seed content that passed validation.
#[derive(Debug, Default)]
pub struct SeedPlan {
    pub sections: Vec<(SectionKey, SectionUpdate)>,
    pub features: Vec<NewFeature>,
    pub products: Vec<NewProduct>,
}

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub sections: usize,
    pub features_removed: usize,
    pub features: usize,
    pub products_removed: usize,
    pub products: usize,
}

/// Validate every entry, collecting all problems rather than stopping at the
/// first.
///
/// # Errors
///
/// Returns one message per invalid entry.
pub fn validate(file: SeedFile) -> Result<SeedPlan, Vec<String>> {
    let mut plan = SeedPlan::default();
    let mut errors = Vec::new();

    for (key, update) in file.sections {
        match update.validated() {
            Ok(update) => plan.sections.push((key, update)),
            Err(e) => errors.push(format!("sections.{key}: {e}")),
        }
    }
    for (index, form) in file.features.iter().enumerate() {
        match form.to_new() {
            Ok(new) => plan.features.push(new),
            Err(e) => errors.push(format!("features[{index}]: {e}")),
        }
    }
    for (index, form) in file.products.iter().enumerate() {
        match form.to_new() {
            Ok(new) => plan.products.push(new),
            Err(e) => errors.push(format!("products[{index}]: {e}")),
        }
    }

    if errors.is_empty() {
        Ok(plan)
    } else {
        Err(errors)
    }
}

/// Read, validate and apply a seed file against the configured backend.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid, or a store
/// operation fails.
pub async fn run(file_path: &str, replace_collections: bool) -> Result<(), CliError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading seed file");

    // Read and validate YAML before connecting to the backend
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: file_path.to_string(),
            source,
        })?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    let plan = validate(file).map_err(|errors| {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        CliError::InvalidSeed(errors.len())
    })?;
    info!(
        sections = plan.sections.len(),
        features = plan.features.len(),
        products = plan.products.len(),
        "Seed file validated"
    );

    let backend = connect()?;
    let summary = apply(&backend, plan, replace_collections).await?;

    info!("Seeding complete!");
    info!("  Sections upserted: {}", summary.sections);
    info!(
        "  Features: {} removed, {} added",
        summary.features_removed, summary.features
    );
    info!(
        "  Products: {} removed, {} added",
        summary.products_removed, summary.products
    );
    Ok(())
}

/// Write a validated plan to the backend.
///
/// # Errors
///
/// Returns the first store error; rows written before it are kept.
pub async fn apply(
    backend: &Backend,
    plan: SeedPlan,
    replace_collections: bool,
) -> Result<SeedSummary, CliError> {
    let mut summary = SeedSummary::default();

    for (key, update) in &plan.sections {
        backend.sections.upsert_section(key, update).await?;
        summary.sections += 1;
    }

    (summary.features_removed, summary.features) =
        append(backend.features.clone(), plan.features, replace_collections).await?;
    (summary.products_removed, summary.products) =
        append(backend.products.clone(), plan.products, replace_collections).await?;

    Ok(summary)
}

/// Append rows through the collection editor, optionally clearing first.
async fn append<E: OrderedEntity>(
    store: Arc<dyn CollectionStore<E>>,
    rows: Vec<E::New>,
    replace: bool,
) -> Result<(usize, usize), CliError> {
    let mut editor = OrderedCollectionEditor::new(store);
    editor.load().await?;

    let mut removed = 0;
    if replace {
        let ids: Vec<E::Id> = editor.items().iter().map(OrderedEntity::id).collect();
        for id in ids {
            editor.delete(id).await?;
            removed += 1;
        }
    }

    let mut added = 0;
    for new in rows {
        editor.create(new).await?;
        added += 1;
    }
    Ok((removed, added))
}
