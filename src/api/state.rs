use std::sync::Arc;

use crate::services::{BehaviorService, RecommendationService};
use crate::store::{ItemCatalog, LikeStore, PreferenceStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
    pub behavior: Arc<BehaviorService>,
}

impl AppState {
    /// Wires the service layer over the given backing stores.
    pub fn new(
        likes: Arc<dyn LikeStore>,
        catalog: Arc<dyn ItemCatalog>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let recommendations = Arc::new(RecommendationService::new(
            Arc::clone(&likes),
            Arc::clone(&catalog),
        ));
        let behavior = Arc::new(BehaviorService::new(preferences, likes, catalog));
        Self {
            recommendations,
            behavior,
        }
    }
}
