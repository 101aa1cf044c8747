use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// One of the four fixed houses registrants are balanced across.
///
/// The set is closed: houses are defined at build time and are not
/// user-creatable. Wire form is the stable upper-case key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum House {
    Red,
    Yellow,
    Blue,
    Purple,
}

impl House {
    pub const COUNT: usize = 4;

    /// Stable key stored in registration documents.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
            Self::Blue => "BLUE",
            Self::Purple => "PURPLE",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_uppercase().as_str() {
            "RED" => Some(Self::Red),
            "YELLOW" => Some(Self::Yellow),
            "BLUE" => Some(Self::Blue),
            "PURPLE" => Some(Self::Purple),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

impl std::fmt::Display for House {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Display metadata for a house.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseDefinition {
    pub house: House,
    pub name: String,
    /// Hex color used by the dashboard.
    pub color: String,
}

impl HouseDefinition {
    pub fn new(house: House, name: &str, color: &str) -> Self {
        Self {
            house,
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}
