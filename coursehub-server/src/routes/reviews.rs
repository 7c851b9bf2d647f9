//! Course review endpoints

use std::sync::Arc;

use axum::extract::State;
use coursehub_core::{average_rating, CourseId, Review};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::auth::current_user;
use crate::error::ApiError;
use crate::extract::{Json, Path};
use crate::notify::Notifier;
use crate::state::AppState;
use crate::store::Store;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsResponse {
    pub success: bool,
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
    pub review_count: usize,
}

/// GET /api/v1/courses/:course_id/reviews
pub async fn list_reviews<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
) -> Result<Json<ReviewsResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    super::visible_course(&*state, &cookies, course_id)?;
    let reviews = state.store.list_reviews(course_id)?;

    Ok(Json(ReviewsResponse {
        success: true,
        average_rating: average_rating(&reviews),
        review_count: reviews.len(),
        reviews,
    }))
}

#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub review: Review,
}

/// POST /api/v1/courses/:course_id/reviews
pub async fn create_review<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    cookies: Cookies,
    Path(course_id): Path<CourseId>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError>
where
    S: Store,
    N: Notifier,
{
    let user = current_user(&cookies, &state.tokens)?;
    super::visible_course(&*state, &cookies, course_id)?;

    let review = Review::new(course_id, user, req.rating, &req.comment)?;
    state.store.insert_review(&review)?;
    tracing::info!(course = %course_id, user = %user, rating = review.rating, "Review posted");

    Ok(Json(ReviewResponse {
        success: true,
        review,
    }))
}
