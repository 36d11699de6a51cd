//! Bag types shared by every generation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PocketKind {
    Items,
    KeyItems,
    PokeBalls,
    TmsHms,
    Berries,
}

impl PocketKind {
    pub const ALL: [PocketKind; 5] = [
        Self::Items,
        Self::KeyItems,
        Self::PokeBalls,
        Self::TmsHms,
        Self::Berries,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Items => "Items",
            Self::KeyItems => "Key Items",
            Self::PokeBalls => "Poke Balls",
            Self::TmsHms => "TMs/HMs",
            Self::Berries => "Berries",
        }
    }
}

impl fmt::Display for PocketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PocketKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "items" | "item" => Ok(Self::Items),
            "key" | "keyitems" | "key_items" => Ok(Self::KeyItems),
            "balls" | "pokeballs" | "poke_balls" => Ok(Self::PokeBalls),
            "tm" | "tms" | "tmhm" | "tms_hms" => Ok(Self::TmsHms),
            "berries" | "berry" => Ok(Self::Berries),
            other => Err(CoreError::invalid(format!(
                "unknown pocket '{other}' (expected items, key, balls, tms or berries)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagSlot {
    pub index: usize,
    pub item_id: u16,
    /// Decoded quantity.
    pub quantity: u16,
}

impl BagSlot {
    pub(crate) fn empty(index: usize) -> Self {
        Self {
            index,
            item_id: 0,
            quantity: 0,
        }
    }

    /// No item, or an item the player holds none of.
    pub fn is_empty(&self) -> bool {
        self.item_id == 0 || self.quantity == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pocket {
    pub kind: PocketKind,
    pub capacity: usize,
    pub slots: Vec<BagSlot>,
}
