use serde::{Deserialize, Serialize};

/// Card fidelity tier, declared best-to-worst.
///
/// The abstract cell footprints encode a fixed visual-space equivalence:
/// one full card ≡ two compact cards ≡ four title-only cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardType {
    Full,
    Compact,
    TitleOnly,
}

impl CardType {
    /// Abstract cell cost used for capacity accounting, independent of
    /// pixel size.
    pub fn footprint(self) -> u32 {
        match self {
            Self::Full => 4,
            Self::Compact => 2,
            Self::TitleOnly => 1,
        }
    }

    /// Maximum visible cards of this type in one half-column.
    pub fn max_cards(self) -> usize {
        match self {
            Self::Full => 2,
            Self::Compact => 4,
            Self::TitleOnly => 8,
        }
    }

    /// Next tier down the degradation cascade, toward title-only.
    pub fn degrade(self) -> Option<CardType> {
        match self {
            Self::Full => Some(Self::Compact),
            Self::Compact => Some(Self::TitleOnly),
            Self::TitleOnly => None,
        }
    }

    /// Next tier up the cascade, toward full.
    pub fn promote(self) -> Option<CardType> {
        match self {
            Self::Full => None,
            Self::Compact => Some(Self::Full),
            Self::TitleOnly => Some(Self::Compact),
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Compact => write!(f, "compact"),
            Self::TitleOnly => write!(f, "title-only"),
        }
    }
}

/// Fixed pixel dimensions for one card tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardSize {
    pub width: f64,
    pub height: f64,
}

impl CardSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
