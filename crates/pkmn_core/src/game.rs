use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Generation {
    One,
    Two,
    Three,
}

/// One save-file family. Titles that share a layout share a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameVariant {
    /// Red, Blue, Yellow and Japanese Green.
    RedBlue,
    GoldSilver,
    Crystal,
    RubySapphire,
    Emerald,
    FireRedLeafGreen,
}

/// The Generation 3 subset of [`GameVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gen3Variant {
    RubySapphire,
    Emerald,
    FireRedLeafGreen,
}

/// Caller-supplied selector; the codec never guesses the game from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub variant: GameVariant,
    pub japanese: bool,
}

impl GameVariant {
    pub const ALL: [GameVariant; 6] = [
        Self::RedBlue,
        Self::GoldSilver,
        Self::Crystal,
        Self::RubySapphire,
        Self::Emerald,
        Self::FireRedLeafGreen,
    ];

    pub fn generation(self) -> Generation {
        match self {
            Self::RedBlue => Generation::One,
            Self::GoldSilver | Self::Crystal => Generation::Two,
            Self::RubySapphire | Self::Emerald | Self::FireRedLeafGreen => Generation::Three,
        }
    }

    pub fn gen3(self) -> Option<Gen3Variant> {
        match self {
            Self::RubySapphire => Some(Gen3Variant::RubySapphire),
            Self::Emerald => Some(Gen3Variant::Emerald),
            Self::FireRedLeafGreen => Some(Gen3Variant::FireRedLeafGreen),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RedBlue => "Red/Blue/Yellow",
            Self::GoldSilver => "Gold/Silver",
            Self::Crystal => "Crystal",
            Self::RubySapphire => "Ruby/Sapphire",
            Self::Emerald => "Emerald",
            Self::FireRedLeafGreen => "FireRed/LeafGreen",
        }
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let name = lowered.strip_prefix("pokemon_").unwrap_or(&lowered);
        let variant = match name {
            "red" | "blue" | "yellow" | "green" | "red_blue" | "redblue" => Self::RedBlue,
            "gold" | "silver" | "gold_silver" | "goldsilver" => Self::GoldSilver,
            "crystal" => Self::Crystal,
            "ruby" | "sapphire" | "ruby_sapphire" | "rubysapphire" => Self::RubySapphire,
            "emerald" => Self::Emerald,
            "firered" | "fire_red" | "leafgreen" | "leaf_green" | "frlg" => {
                Self::FireRedLeafGreen
            }
            other => {
                return Err(CoreError::invalid(format!(
                    "unknown game '{other}' (expected one of: red, blue, yellow, green, gold, \
                     silver, crystal, ruby, sapphire, emerald, firered, leafgreen)"
                )));
            }
        };
        Ok(variant)
    }
}

impl Gen3Variant {
    /// Offset of the item security key inside section 0, if the variant has one.
    pub fn security_key_offset(self) -> Option<usize> {
        match self {
            Self::RubySapphire => None,
            Self::Emerald => Some(0x00AC),
            Self::FireRedLeafGreen => Some(0x0AF8),
        }
    }
}

impl From<Gen3Variant> for GameVariant {
    fn from(value: Gen3Variant) -> Self {
        match value {
            Gen3Variant::RubySapphire => Self::RubySapphire,
            Gen3Variant::Emerald => Self::Emerald,
            Gen3Variant::FireRedLeafGreen => Self::FireRedLeafGreen,
        }
    }
}

impl Game {
    pub fn new(variant: GameVariant, japanese: bool) -> Self {
        Self { variant, japanese }
    }

    pub fn generation(&self) -> Generation {
        self.variant.generation()
    }

    /// Smallest buffer the codec accepts for this game.
    pub fn min_save_size(&self) -> usize {
        match self.generation() {
            Generation::One => crate::gen1::MIN_SAVE_SIZE,
            Generation::Two => crate::gen2::MIN_SAVE_SIZE,
            Generation::Three => crate::gen3::SAVE_SIZE,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.japanese {
            write!(f, "{} (Japanese)", self.variant)
        } else {
            write!(f, "{}", self.variant)
        }
    }
}
