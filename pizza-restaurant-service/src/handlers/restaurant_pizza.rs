use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::request::RestaurantPizzaPayload;
use crate::serializer::*;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurant_pizzas", post(create_restaurant_pizza))
}

#[utoipa::path(
    post,
    path = "/restaurant_pizzas",
    request_body(
        content = RestaurantPizzaPayload,
        description = "Also accepted as application/x-www-form-urlencoded",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Price row created", body = CreatedRestaurantPizza),
        (status = 400, description = "Price out of range, unknown ids or rejected write", body = ErrorsResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse),
    ),
    tag = "restaurant_pizzas"
)]
#[instrument(skip(state))]
pub async fn create_restaurant_pizza(
    State(state): State<AppState>,
    payload: RestaurantPizzaPayload,
) -> Result<(StatusCode, Json<CreatedRestaurantPizza>), ApiError> {
    if !payload.has_valid_price() {
        return Err(ApiError::Validation);
    }
    let new_restaurant_pizza = payload
        .to_new_restaurant_pizza()
        .ok_or(ApiError::InvalidReference)?;

    let (pizza, restaurant) = state
        .store
        .blocking(move |store| {
            Ok((
                store.find_pizza(new_restaurant_pizza.pizza_id)?,
                store.find_restaurant(new_restaurant_pizza.restaurant_id)?,
            ))
        })
        .await?;
    let (Some(pizza), Some(restaurant)) = (pizza, restaurant) else {
        return Err(ApiError::InvalidReference);
    };

    let created = state
        .store
        .blocking(move |store| store.create_restaurant_pizza(&new_restaurant_pizza))
        .await
        .map_err(ApiError::from_write)?;

    info!(
        id = created.id,
        restaurant_id = created.restaurant_id,
        pizza_id = created.pizza_id,
        "created restaurant pizza"
    );
    Ok((
        StatusCode::CREATED,
        Json(serialize_created_restaurant_pizza(
            &created,
            &pizza,
            &restaurant,
        )),
    ))
}
