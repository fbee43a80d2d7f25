use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownEnumValue;

/// Visual color of a gem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// "green"
    Green,
    /// "red"
    Red,
    /// "yellow"
    Yellow,
    /// "blue"
    Blue,
    /// "white"
    White,
    /// "pink"
    Pink,
    /// "purple"
    Purple,
    /// "orange"
    Orange,
    /// "black"
    Black,
}

impl Color {
    /// Every variant in declaration order
    pub const ALL: [Color; 9] = [
        Color::Green,
        Color::Red,
        Color::Yellow,
        Color::Blue,
        Color::White,
        Color::Pink,
        Color::Purple,
        Color::Orange,
        Color::Black,
    ];

    /// Canonical document text for this color
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::White => "white",
            Color::Pink => "pink",
            Color::Purple => "purple",
            Color::Orange => "orange",
            Color::Black => "black",
        }
    }

    /// Decode a color from its exact canonical text
    pub fn decode(text: &str) -> Result<Self, UnknownEnumValue> {
        match text {
            "green" => Ok(Color::Green),
            "red" => Ok(Color::Red),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "white" => Ok(Color::White),
            "pink" => Ok(Color::Pink),
            "purple" => Ok(Color::Purple),
            "orange" => Ok(Color::Orange),
            "black" => Ok(Color::Black),
            other => Err(UnknownEnumValue::new("color", other)),
        }
    }
}

impl FromStr for Color {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
