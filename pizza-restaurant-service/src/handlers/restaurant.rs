use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::serializer::*;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route(
            "/restaurants/{id}",
            get(get_restaurant).delete(delete_restaurant),
        )
}

// Non-numeric ids never name a restaurant.
fn restaurant_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::NotFound)
}

#[utoipa::path(
    get,
    path = "/restaurants",
    responses(
        (status = 200, description = "All restaurants", body = Vec<RestaurantSummary>),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantSummary>>, ApiError> {
    let restaurants = state
        .store
        .blocking(|store| store.list_restaurants())
        .await?;

    Ok(Json(restaurants.iter().map(serialize_restaurant).collect()))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    responses(
        (status = 200, description = "Restaurant with its priced pizzas", body = RestaurantDetail),
        (status = 404, description = "Restaurant not found", body = ErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<RestaurantDetail>, ApiError> {
    let id = restaurant_id(path)?;

    let (restaurant, menu) = state
        .store
        .blocking(move |store| store.restaurant_detail(id))
        .await?
        .ok_or(ApiError::RestaurantNotFound)?;

    Ok(Json(serialize_restaurant_detail(&restaurant, &menu)))
}

#[utoipa::path(
    delete,
    path = "/restaurants/{id}",
    responses(
        (status = 204, description = "Restaurant and its price rows deleted"),
        (status = 404, description = "Restaurant not found", body = ErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = restaurant_id(path)?;

    let deleted = state
        .store
        .blocking(move |store| store.delete_restaurant(id))
        .await?;
    if !deleted {
        return Err(ApiError::RestaurantNotFound);
    }

    info!(restaurant_id = id, "deleted restaurant");
    Ok(StatusCode::NO_CONTENT)
}
