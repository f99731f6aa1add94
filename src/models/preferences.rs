use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use super::{ItemSpace, LikeEvent, SearchEvent, ViewEvent};
use crate::models::PriceTier;

/// Category vocabulary matched against free-text search terms.
pub const CATEGORY_KEYWORDS: [&str; 8] = [
    "adventure",
    "relaxation",
    "culture",
    "food",
    "nature",
    "nightlife",
    "shopping",
    "history",
];

/// Preferred time of day for activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
    Flexible,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
            TimeOfDay::Flexible => "flexible",
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening" => Ok(TimeOfDay::Evening),
            "night" => Ok(TimeOfDay::Night),
            "flexible" => Ok(TimeOfDay::Flexible),
            other => Err(format!("unknown time of day: {}", other)),
        }
    }
}

/// Implicitly learned preferences for one user, one row per user.
///
/// Update rules are designed to commute so events can be applied in any
/// order and still converge:
/// - collection fields only ever grow (union semantics),
/// - scalar fields are last-write-wins,
/// - `min_rating` is a ratchet: it only ever increases,
/// - boolean affinity flags are sticky-true: tracking never resets them.
///
/// The liked-ID sets are the one exception to monotonic growth; an explicit
/// unlike removes from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    pub user_id: i64,
    pub preferred_categories: BTreeSet<String>,
    pub preferred_locations: BTreeSet<String>,
    pub preferred_budget: Option<PriceTier>,
    pub min_rating: f64,
    pub preferred_time_of_day: Option<TimeOfDay>,
    pub instagrammable: bool,
    pub trending: bool,
    pub exclusive: bool,
    pub liked_discovery_ids: BTreeSet<i64>,
    pub liked_recommendation_ids: BTreeSet<i64>,
}

impl PreferenceProfile {
    pub const DEFAULT_MIN_RATING: f64 = 3.0;

    /// A fresh profile with safe defaults, as lazily created on a user's
    /// first behavioral event or first like.
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            preferred_categories: BTreeSet::new(),
            preferred_locations: BTreeSet::new(),
            preferred_budget: None,
            min_rating: Self::DEFAULT_MIN_RATING,
            preferred_time_of_day: None,
            instagrammable: false,
            trending: false,
            exclusive: false,
            liked_discovery_ids: BTreeSet::new(),
            liked_recommendation_ids: BTreeSet::new(),
        }
    }

    pub fn liked_ids(&self, space: ItemSpace) -> &BTreeSet<i64> {
        match space {
            ItemSpace::Discovery => &self.liked_discovery_ids,
            ItemSpace::Recommendation => &self.liked_recommendation_ids,
        }
    }

    pub fn liked_ids_mut(&mut self, space: ItemSpace) -> &mut BTreeSet<i64> {
        match space {
            ItemSpace::Discovery => &mut self.liked_discovery_ids,
            ItemSpace::Recommendation => &mut self.liked_recommendation_ids,
        }
    }

    /// Learns from a content view.
    ///
    /// Long view durations and deep scrolls carry no extra weight here:
    /// category and location are unioned unconditionally, so the engagement
    /// thresholds collapse into a single union.
    pub fn apply_view(&mut self, event: &ViewEvent) {
        if let Some(category) = &event.category {
            self.preferred_categories.insert(category.clone());
        }
        if let Some(location) = &event.location {
            self.preferred_locations.insert(location.clone());
        }
        if let Some(budget) = event.budget {
            self.preferred_budget = Some(budget);
        }
        if let Some(time_of_day) = event.time_of_day {
            self.preferred_time_of_day = Some(time_of_day);
        }
        if let Some(rating) = event.rating {
            // Viewing highly rated content raises the bar, never lowers it.
            if rating > 4.0 {
                self.min_rating = self.min_rating.max(rating - 0.5);
            }
        }
        self.instagrammable |= event.instagrammable;
        self.trending |= event.trending;
        self.exclusive |= event.exclusive;
    }

    /// Learns from a like action.
    pub fn apply_like(&mut self, event: &LikeEvent) {
        if let Some(category) = &event.category {
            self.preferred_categories.insert(category.clone());
        }
        if let Some(location) = &event.location {
            self.preferred_locations.insert(location.clone());
        }
        if let Some(budget) = event.budget {
            self.preferred_budget = Some(budget);
        }
        self.instagrammable |= event.instagrammable;
        self.trending |= event.trending;
        self.exclusive |= event.exclusive;
    }

    /// Learns from a free-text search.
    ///
    /// The first category keyword contained in the term (case-insensitive
    /// substring, no tokenization) is unioned into the preferred categories.
    pub fn apply_search(&mut self, event: &SearchEvent) {
        let Some(term) = &event.search_term else {
            return;
        };
        let term = term.to_lowercase();
        if let Some(keyword) = CATEGORY_KEYWORDS.iter().find(|k| term.contains(**k)) {
            self.preferred_categories.insert((*keyword).to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(category: Option<&str>, location: Option<&str>) -> ViewEvent {
        ViewEvent {
            category: category.map(String::from),
            location: location.map(String::from),
            ..ViewEvent::default()
        }
    }

    #[test]
    fn first_event_defaults() {
        let profile = PreferenceProfile::new(7);
        assert_eq!(profile.user_id, 7);
        assert!(profile.preferred_categories.is_empty());
        assert_eq!(profile.min_rating, PreferenceProfile::DEFAULT_MIN_RATING);
        assert!(!profile.instagrammable && !profile.trending && !profile.exclusive);
    }

    #[test]
    fn view_unions_are_idempotent() {
        let mut profile = PreferenceProfile::new(1);
        let event = ViewEvent {
            category: Some("adventure".into()),
            location: Some("Lisbon".into()),
            instagrammable: true,
            ..ViewEvent::default()
        };

        profile.apply_view(&event);
        let once = profile.clone();
        profile.apply_view(&event);

        assert_eq!(profile, once);
    }

    #[test]
    fn categories_accumulate_instead_of_overwriting() {
        let mut profile = PreferenceProfile::new(1);
        profile.apply_like(&LikeEvent {
            category: Some("adventure".into()),
            ..LikeEvent::default()
        });
        profile.apply_like(&LikeEvent {
            category: Some("culture".into()),
            ..LikeEvent::default()
        });

        let expected: BTreeSet<String> =
            ["adventure", "culture"].iter().map(|s| s.to_string()).collect();
        assert_eq!(profile.preferred_categories, expected);
    }

    #[test]
    fn min_rating_only_ratchets_up() {
        let mut profile = PreferenceProfile::new(1);

        // Below the 4.0 threshold: no effect.
        profile.apply_view(&ViewEvent {
            rating: Some(3.9),
            ..ViewEvent::default()
        });
        assert_eq!(profile.min_rating, 3.0);

        profile.apply_view(&ViewEvent {
            rating: Some(4.8),
            ..ViewEvent::default()
        });
        assert_eq!(profile.min_rating, 4.3);

        // A lower (but still > 4.0) rating must not decrease the ratchet.
        profile.apply_view(&ViewEvent {
            rating: Some(4.2),
            ..ViewEvent::default()
        });
        assert_eq!(profile.min_rating, 4.3);
    }

    #[test]
    fn affinity_flags_are_sticky_true() {
        let mut profile = PreferenceProfile::new(1);
        profile.apply_view(&ViewEvent {
            trending: true,
            ..ViewEvent::default()
        });
        assert!(profile.trending);

        // Later events without the flag must not reset it.
        profile.apply_view(&view(Some("food"), None));
        profile.apply_like(&LikeEvent::default());
        assert!(profile.trending);
    }

    #[test]
    fn budget_and_time_of_day_are_last_write_wins() {
        let mut profile = PreferenceProfile::new(1);
        profile.apply_view(&ViewEvent {
            budget: Some(PriceTier::Budget),
            time_of_day: Some(TimeOfDay::Morning),
            ..ViewEvent::default()
        });
        profile.apply_view(&ViewEvent {
            budget: Some(PriceTier::Luxury),
            time_of_day: Some(TimeOfDay::Night),
            ..ViewEvent::default()
        });

        assert_eq!(profile.preferred_budget, Some(PriceTier::Luxury));
        assert_eq!(profile.preferred_time_of_day, Some(TimeOfDay::Night));
    }

    #[test]
    fn search_matches_category_keywords_as_substrings() {
        let mut profile = PreferenceProfile::new(1);
        profile.apply_search(&SearchEvent {
            search_term: Some("Best ADVENTURE tours in Peru".into()),
        });
        assert!(profile.preferred_categories.contains("adventure"));

        // No keyword contained: nothing learned.
        profile.apply_search(&SearchEvent {
            search_term: Some("cheap flights".into()),
        });
        assert_eq!(profile.preferred_categories.len(), 1);
    }

    #[test]
    fn events_commute() {
        let like = LikeEvent {
            category: Some("nature".into()),
            trending: true,
            ..LikeEvent::default()
        };
        let view_event = ViewEvent {
            location: Some("Kyoto".into()),
            rating: Some(4.6),
            ..ViewEvent::default()
        };

        let mut forward = PreferenceProfile::new(1);
        forward.apply_like(&like);
        forward.apply_view(&view_event);

        let mut reverse = PreferenceProfile::new(1);
        reverse.apply_view(&view_event);
        reverse.apply_like(&like);

        assert_eq!(forward, reverse);
    }
}
