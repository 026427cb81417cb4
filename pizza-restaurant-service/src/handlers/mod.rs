pub mod pizza;
pub mod restaurant;
pub mod restaurant_pizza;

use axum::{
    response::{Html, Json},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::request::RestaurantPizzaPayload;
use crate::serializer::*;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api-docs/openapi.json", get(openapi))
        .merge(restaurant::router())
        .merge(pizza::router())
        .merge(restaurant_pizza::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn index() -> Html<&'static str> {
    Html("<h1>Pizza Restaurants</h1>")
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        restaurant::list_restaurants,
        restaurant::get_restaurant,
        restaurant::delete_restaurant,
        pizza::list_pizzas,
        restaurant_pizza::create_restaurant_pizza,
    ),
    components(
        schemas(
            RestaurantSummary,
            RestaurantDetail,
            RestaurantPizzaEntry,
            PizzaSummary,
            CreatedRestaurantPizza,
            RestaurantPizzaPayload,
            ErrorResponse,
            ErrorsResponse,
            FieldErrorResponse,
        )
    ),
    tags(
        (name = "restaurants", description = "Restaurant endpoints"),
        (name = "pizzas", description = "Pizza endpoints"),
        (name = "restaurant_pizzas", description = "Restaurant price list endpoints")
    ),
    info(
        title = "Pizza Restaurant Service",
        description = "Restaurants, pizzas and the prices restaurants charge for them",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;
