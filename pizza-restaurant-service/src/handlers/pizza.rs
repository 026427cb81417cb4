use axum::{extract::State, response::Json, routing::get, Router};
use tracing::instrument;

use crate::error::ApiError;
use crate::serializer::*;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/pizzas", get(list_pizzas))
}

#[utoipa::path(
    get,
    path = "/pizzas",
    responses(
        (status = 200, description = "All pizzas", body = Vec<PizzaSummary>),
    ),
    tag = "pizzas"
)]
#[instrument(skip(state))]
pub async fn list_pizzas(
    State(state): State<AppState>,
) -> Result<Json<Vec<PizzaSummary>>, ApiError> {
    let pizzas = state.store.blocking(|store| store.list_pizzas()).await?;

    Ok(Json(pizzas.iter().map(serialize_pizza).collect()))
}
