use axum::{extract::State, Json};

use crate::models::FeatureImportance;
use crate::AppState;

const TOP_FEATURES: usize = 10;

pub async fn list(State(state): State<AppState>) -> Json<Vec<FeatureImportance>> {
    let features = state
        .scorer
        .importances()
        .into_iter()
        .take(TOP_FEATURES)
        .map(|(name, importance)| FeatureImportance {
            name: name.to_string(),
            importance,
        })
        .collect();

    Json(features)
}
