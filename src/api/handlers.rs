use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::{Item, LikeEvent, PreferenceProfile, SearchEvent, ViewEvent};

use super::auth::CurrentUser;
use super::AppState;

// Request/Response types

/// Lenient `?limit=` query: non-numeric values parse to `None` and fall back
/// to the default downstream, rather than rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    fn parsed(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarUsersResponse {
    pub success: bool,
    pub data: Vec<i64>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub success: bool,
    pub data: Vec<Item>,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl RecommendationsResponse {
    fn new(kind: &'static str, data: Vec<Item>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            kind,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: PreferenceProfile,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Users with overlapping like history, most similar first
pub async fn similar_users(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<SimilarUsersResponse>> {
    let users = state
        .recommendations
        .similarity()
        .find_similar_users(user_id, query.parsed())
        .await?;
    Ok(Json(SimilarUsersResponse {
        success: true,
        count: users.len(),
        data: users,
    }))
}

/// Collaborative-filtering recommendations
pub async fn collaborative(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let items = state
        .recommendations
        .collaborative(user_id, query.parsed())
        .await?;
    Ok(Json(RecommendationsResponse::new(
        "collaborative_filtering",
        items,
    )))
}

/// Content-similarity recommendations from liked discoveries
pub async fn discovery_based(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let items = state
        .recommendations
        .discovery_based(user_id, query.parsed())
        .await?;
    Ok(Json(RecommendationsResponse::new("discovery_based", items)))
}

/// Weighted personalized discoveries
pub async fn personalized(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let items = state
        .recommendations
        .personalized(user_id, query.parsed())
        .await?;
    Ok(Json(RecommendationsResponse::new(
        "personalized_discoveries",
        items,
    )))
}

/// Track a content view and update learned preferences
pub async fn track_view(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(event): Json<ViewEvent>,
) -> AppResult<Json<PreferencesResponse>> {
    let profile = state.behavior.track_view(user_id, event).await?;
    Ok(Json(PreferencesResponse {
        success: true,
        message: Some("View behavior tracked and preferences updated"),
        data: profile,
    }))
}

/// Track a like signal and update learned preferences
pub async fn track_like(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(event): Json<LikeEvent>,
) -> AppResult<Json<PreferencesResponse>> {
    let profile = state.behavior.track_like(user_id, event).await?;
    Ok(Json(PreferencesResponse {
        success: true,
        message: Some("Like behavior tracked and preferences updated"),
        data: profile,
    }))
}

/// Track a search and update learned preferences
pub async fn track_search(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(event): Json<SearchEvent>,
) -> AppResult<Json<PreferencesResponse>> {
    let profile = state.behavior.track_search(user_id, event).await?;
    Ok(Json(PreferencesResponse {
        success: true,
        message: Some("Search behavior tracked and preferences updated"),
        data: profile,
    }))
}

/// Current learned preferences, lazily created with defaults
pub async fn get_preferences(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<PreferencesResponse>> {
    let profile = state.behavior.get_preferences(user_id).await?;
    Ok(Json(PreferencesResponse {
        success: true,
        message: None,
        data: profile,
    }))
}
