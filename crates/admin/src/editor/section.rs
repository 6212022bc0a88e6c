//! Editor for the fixed landing page sections.

use std::collections::BTreeMap;
use std::sync::Arc;

use landing_cms_core::{PageSection, SectionForm, SectionKey, SectionUpdate};

use super::EditorError;
use crate::store::{SectionStore, StoreError};

/// Local view of all sections plus the form for the selected one.
pub struct SectionEditor {
    store: Arc<dyn SectionStore>,
    sections: BTreeMap<SectionKey, PageSection>,
    selected: Option<SectionKey>,
    form: SectionForm,
}

impl SectionEditor {
    #[must_use]
    pub fn new(store: Arc<dyn SectionStore>) -> Self {
        Self {
            store,
            sections: BTreeMap::new(),
            selected: None,
            form: SectionForm::default(),
        }
    }

    /// Fetch all sections, replacing the local copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn load(&mut self) -> Result<&BTreeMap<SectionKey, PageSection>, EditorError> {
        self.sections = self
            .store
            .list_sections()
            .await?
            .into_iter()
            .map(|section| (section.section_id.clone(), section))
            .collect();
        Ok(&self.sections)
    }

    #[must_use]
    pub const fn sections(&self) -> &BTreeMap<SectionKey, PageSection> {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, key: &SectionKey) -> Option<&PageSection> {
        self.sections.get(key)
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&SectionKey> {
        self.selected.as_ref()
    }

    #[must_use]
    pub const fn form(&self) -> &SectionForm {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut SectionForm {
        &mut self.form
    }

    /// Load a section's values into the form.
    ///
    /// # Errors
    ///
    /// Returns `UnknownId` if the section is not loaded.
    pub fn select(&mut self, key: &SectionKey) -> Result<&SectionForm, EditorError> {
        let section = self.sections.get(key).ok_or_else(|| EditorError::UnknownId {
            kind: "section",
            id: key.to_string(),
        })?;
        self.form = SectionForm::from_section(section);
        self.selected = Some(key.clone());
        Ok(&self.form)
    }

    pub fn cancel(&mut self) {
        self.selected = None;
        self.form = SectionForm::default();
    }

    /// Save the form to the selected section.
    ///
    /// The section stays selected with the saved values in the form.
    ///
    /// # Errors
    ///
    /// Returns `NotEditing` if no section is selected, a validation error, or
    /// a store error.
    pub async fn submit(&mut self) -> Result<PageSection, EditorError> {
        let key = self.selected.clone().ok_or(EditorError::NotEditing)?;
        let update = self.form.to_update()?;
        let saved = self.update(&key, update).await?;
        self.form = SectionForm::from_section(&saved);
        Ok(saved)
    }

    /// Replace one section's content and refresh.
    ///
    /// # Errors
    ///
    /// Returns `UnknownId` for a key the store does not have, a validation
    /// error, or a store error.
    pub async fn update(
        &mut self,
        key: &SectionKey,
        update: SectionUpdate,
    ) -> Result<PageSection, EditorError> {
        let update = update.validated()?;
        let saved = match self.store.update_section(key, &update).await {
            Ok(saved) => saved,
            Err(StoreError::NotFound(_)) => {
                return Err(EditorError::UnknownId {
                    kind: "section",
                    id: key.to_string(),
                });
            }
            Err(error) => return Err(error.into()),
        };
        tracing::info!(section = %key, "Section updated");

        self.load().await?;
        Ok(saved)
    }
}

impl std::fmt::Debug for SectionEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionEditor")
            .field("sections", &self.sections.len())
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}
