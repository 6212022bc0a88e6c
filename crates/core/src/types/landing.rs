//! Public landing page payload.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Feature, PageSection, Product, SectionKey};

/// Everything the landing page needs in one response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LandingContent {
    /// Sections keyed by section key.
    pub sections: BTreeMap<SectionKey, PageSection>,
    /// Products in display order.
    pub products: Vec<Product>,
    /// Feature cards in display order.
    pub features: Vec<Feature>,
}

impl LandingContent {
    /// Assemble the payload from rows as loaded from the backend.
    #[must_use]
    pub fn new(sections: Vec<PageSection>, products: Vec<Product>, features: Vec<Feature>) -> Self {
        Self {
            sections: sections
                .into_iter()
                .map(|section| (section.section_id.clone(), section))
                .collect(),
            products,
            features,
        }
    }

    /// Look up one section.
    #[must_use]
    pub fn section(&self, key: &SectionKey) -> Option<&PageSection> {
        self.sections.get(key)
    }
}
