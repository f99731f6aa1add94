//! Behavioral events consumed by the preference learner.
//!
//! Each event kind carries its own optional-field set. Parsing is permissive:
//! a malformed optional field deserializes to its default instead of failing
//! the request, so preference learning stays available even for sloppy
//! clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::{PriceTier, TimeOfDay};

/// Deserializes to `None` when the field is malformed rather than erroring.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Deserializes to `false` when the flag is missing or malformed.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(bool::deserialize(value).unwrap_or(false))
}

/// A content view, the weakest behavioral signal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewEvent {
    #[serde(deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub budget: Option<PriceTier>,
    #[serde(deserialize_with = "lenient")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(deserialize_with = "lenient")]
    pub rating: Option<f64>,
    /// Seconds spent on the item, when the client reports it.
    #[serde(deserialize_with = "lenient")]
    pub view_duration: Option<f64>,
    /// Percentage of the page scrolled, when the client reports it.
    #[serde(deserialize_with = "lenient")]
    pub scroll_depth: Option<f64>,
    #[serde(deserialize_with = "lenient_flag")]
    pub instagrammable: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub trending: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub exclusive: bool,
}

/// A like action, a stronger signal than a view but learned with the same
/// union and overwrite rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LikeEvent {
    #[serde(deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub budget: Option<PriceTier>,
    #[serde(deserialize_with = "lenient_flag")]
    pub instagrammable: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub trending: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub exclusive: bool,
}

/// A free-text search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchEvent {
    #[serde(deserialize_with = "lenient")]
    pub search_term: Option<String>,
}
