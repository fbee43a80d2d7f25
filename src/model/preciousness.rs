use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownEnumValue;

/// Gem category
///
/// Variants are declared in category rank order, so the derived `Ord` places
/// precious gems before semi-precious ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preciousness {
    /// "precious"
    Precious,
    /// "semi-precious"
    SemiPrecious,
}

impl Preciousness {
    /// Every variant in rank order
    pub const ALL: [Preciousness; 2] = [Preciousness::Precious, Preciousness::SemiPrecious];

    /// Canonical document text for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Preciousness::Precious => "precious",
            Preciousness::SemiPrecious => "semi-precious",
        }
    }

    /// Decode a category from its exact canonical text
    pub fn decode(text: &str) -> Result<Self, UnknownEnumValue> {
        match text {
            "precious" => Ok(Preciousness::Precious),
            "semi-precious" => Ok(Preciousness::SemiPrecious),
            other => Err(UnknownEnumValue::new("preciousness", other)),
        }
    }

    /// Sort rank of the category (precious first)
    #[inline]
    pub fn rank(&self) -> u8 {
        match self {
            Preciousness::Precious => 0,
            Preciousness::SemiPrecious => 1,
        }
    }
}

impl FromStr for Preciousness {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Preciousness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
