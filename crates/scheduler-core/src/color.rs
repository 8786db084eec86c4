use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared::error::CoreError;

/// One of the twelve paint colors the shop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
    C9,
    C10,
    C11,
    C12,
}

impl Color {
    pub const ALL: [Color; 12] = [
        Color::C1,
        Color::C2,
        Color::C3,
        Color::C4,
        Color::C5,
        Color::C6,
        Color::C7,
        Color::C8,
        Color::C9,
        Color::C10,
        Color::C11,
        Color::C12,
    ];

    /// The numeric suffix, e.g. `Color::C12.index() == 12`. Used to derive vehicle priority.
    pub fn index(self) -> u32 {
        match self {
            Color::C1 => 1,
            Color::C2 => 2,
            Color::C3 => 3,
            Color::C4 => 4,
            Color::C5 => 5,
            Color::C6 => 6,
            Color::C7 => 7,
            Color::C8 => 8,
            Color::C9 => 9,
            Color::C10 => 10,
            Color::C11 => 11,
            Color::C12 => 12,
        }
    }

    /// C1, C2, C3 are the high-volume colors routed to oven O1.
    pub fn is_high_volume(self) -> bool {
        matches!(self, Color::C1 | Color::C2 | Color::C3)
    }

    /// Fraction of the input stream this color should occupy, per the production mix.
    pub fn distribution_share(self) -> f64 {
        match self {
            Color::C1 => 0.40,
            Color::C2 => 0.25,
            Color::C3 => 0.12,
            Color::C4 => 0.08,
            Color::C5 => 0.03,
            Color::C6 | Color::C7 | Color::C8 | Color::C9 | Color::C10 | Color::C11 => 0.02,
            Color::C12 => 0.01,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.index())
    }
}

impl FromStr for Color {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .iter()
            .copied()
            .find(|c| c.to_string() == s)
            .ok_or_else(|| CoreError::UnknownColor(s.to_string()))
    }
}
