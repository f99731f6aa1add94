use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Identifier domain for likeable content.
///
/// Discovery and recommendation items live in disjoint ID spaces; an item id
/// is only meaningful paired with its space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSpace {
    Discovery,
    Recommendation,
}

impl ItemSpace {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSpace::Discovery => "discovery",
            ItemSpace::Recommendation => "recommendation",
        }
    }
}

impl Display for ItemSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemSpace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(ItemSpace::Discovery),
            "recommendation" => Ok(ItemSpace::Recommendation),
            other => Err(format!("unknown item space: {}", other)),
        }
    }
}

/// Price tier of an item, from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceTier {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Premium,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTier::Budget => "$",
            PriceTier::Moderate => "$$",
            PriceTier::Premium => "$$$",
            PriceTier::Luxury => "$$$$",
        }
    }
}

impl Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PriceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "$" => Ok(PriceTier::Budget),
            "$$" => Ok(PriceTier::Moderate),
            "$$$" => Ok(PriceTier::Premium),
            "$$$$" => Ok(PriceTier::Luxury),
            other => Err(format!("unknown price tier: {}", other)),
        }
    }
}

/// A discovery or recommendation record as served to clients.
///
/// Items are created and updated by the content-management side; this core
/// only ever reads them. `rating` is always within [0, 5].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub location: String,
    pub price: PriceTier,
    pub rating: f64,
    pub trending: bool,
}
