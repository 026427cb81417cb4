use std::collections::HashMap;
use std::num::IntErrorKind;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderValue},
    Form,
};
use serde_json::{Map, Number, Value};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::{NewRestaurantPizza, MAX_PRICE, MIN_PRICE};

pub const PRICE_HELP: &str = "Price cannot be blank and must be an integer";
pub const PIZZA_ID_HELP: &str = "Pizza ID cannot be blank";
pub const RESTAURANT_ID_HELP: &str = "Restaurant ID cannot be blank";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A required field that was absent or not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Body of `POST /restaurant_pizzas`, decoded from JSON or a urlencoded form.
///
/// Values may be integers, whole-valued numbers, or strings holding integers.
/// Fields are checked in declaration order and the first bad one is reported.
/// Integers too large for `i64` saturate, so they still fail the range and
/// lookup checks rather than decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub struct RestaurantPizzaPayload {
    pub price: i64,
    pub pizza_id: i64,
    pub restaurant_id: i64,
}

impl RestaurantPizzaPayload {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, FieldError> {
        Ok(Self {
            price: integer_field(fields, "price", PRICE_HELP)?,
            pizza_id: integer_field(fields, "pizza_id", PIZZA_ID_HELP)?,
            restaurant_id: integer_field(fields, "restaurant_id", RESTAURANT_ID_HELP)?,
        })
    }

    pub fn has_valid_price(&self) -> bool {
        (i64::from(MIN_PRICE)..=i64::from(MAX_PRICE)).contains(&self.price)
    }

    /// The row to insert, or `None` when an id is outside the key range and
    /// so cannot name any row.
    pub fn to_new_restaurant_pizza(&self) -> Option<NewRestaurantPizza> {
        Some(NewRestaurantPizza {
            price: i32::try_from(self.price).ok()?,
            restaurant_id: i32::try_from(self.restaurant_id).ok()?,
            pizza_id: i32::try_from(self.pizza_id).ok()?,
        })
    }
}

fn integer_field(
    fields: &Map<String, Value>,
    field: &'static str,
    message: &'static str,
) -> Result<i64, FieldError> {
    let parsed = match fields.get(field) {
        Some(Value::Number(n)) => number_to_i64(n),
        Some(Value::String(s)) => parse_integer(s.trim()),
        _ => None,
    };
    parsed.ok_or(FieldError { field, message })
}

fn number_to_i64(n: &Number) -> Option<i64> {
    if let Some(v) = n.as_i64() {
        return Some(v);
    }
    if n.as_u64().is_some() {
        return Some(i64::MAX);
    }
    // `as` saturates out-of-range floats.
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

fn parse_integer(s: &str) -> Option<i64> {
    match s.parse::<i64>() {
        Ok(v) => Some(v),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

impl<S> FromRequest<S> for RestaurantPizzaPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Unreadable bodies decode as empty so the first field is reported missing.
        let fields = if is_form(&req) {
            // Media types are case-insensitive; hand `Form` the canonical spelling.
            req.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            match Form::<HashMap<String, String>>::from_request(req, state).await {
                Ok(Form(form)) => form
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
                Err(_) => Map::new(),
            }
        } else {
            let bytes = Bytes::from_request(req, state).await.unwrap_or_default();
            serde_json::from_slice::<Map<String, Value>>(&bytes).unwrap_or_default()
        };

        Ok(Self::from_fields(&fields)?)
    }
}
