use std::hash::{Hash, Hasher};

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::{Color, Preciousness};

/// One group of visual parameters attached to a gem
///
/// Equality is structural over all fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualParameters {
    /// Colors in document order (duplicates kept)
    pub colors: Vec<Color>,
    /// Transparency percentage, exact as written in the document
    pub transparency: Option<BigDecimal>,
    /// Number of facets
    pub facets: Option<i32>,
}

impl VisualParameters {
    /// Create a visual-parameters group from its parts
    pub fn new(colors: Vec<Color>, transparency: BigDecimal, facets: i32) -> Self {
        Self {
            colors,
            transparency: Some(transparency),
            facets: Some(facets),
        }
    }
}

/// A gem record from the catalog
///
/// Identity is the `id` attribute alone: `PartialEq` and `Hash` only look at
/// [`Gem::id`], so two gems with the same id (including two gems without one)
/// compare equal whatever their other fields hold. Use [`Gem::same_content`]
/// to compare every field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Gem {
    /// Identifier from the `id` attribute (empty when absent)
    pub id: String,
    /// Display name
    pub name: String,
    /// Category, if the document supplied one
    pub preciousness: Option<Preciousness>,
    /// Place of origin
    pub origin: String,
    /// Visual-parameter groups in document order
    pub visual_parameters: Vec<VisualParameters>,
    /// Value in carats, exact as written in the document
    pub value: Option<BigDecimal>,
}

impl Gem {
    /// Structural equality over every field, including nested groups
    pub fn same_content(&self, other: &Gem) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.preciousness == other.preciousness
            && self.origin == other.origin
            && self.value == other.value
            && self.visual_parameters == other.visual_parameters
    }

    /// Total number of colors across all visual-parameter groups
    pub fn color_count(&self) -> usize {
        self.visual_parameters.iter().map(|vp| vp.colors.len()).sum()
    }
}

impl PartialEq for Gem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Gem {}

impl Hash for Gem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
