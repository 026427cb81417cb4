use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Pizza, Restaurant, RestaurantPizza};

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct RestaurantSummary {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct PizzaSummary {
    pub id: i32,
    pub name: String,
    /// Comma-separated ingredient list
    pub ingredients: String,
}

/// One priced pizza on a restaurant's menu.
#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct RestaurantPizzaEntry {
    pub id: i32,
    pub pizza: PizzaSummary,
    pub pizza_id: i32,
    pub price: i32,
    pub restaurant_id: i32,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct RestaurantDetail {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub restaurant_pizzas: Vec<RestaurantPizzaEntry>,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct CreatedRestaurantPizza {
    pub id: i32,
    pub price: i32,
    pub pizza_id: i32,
    pub restaurant_id: i32,
    pub pizza: PizzaSummary,
    pub restaurant: RestaurantSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorsResponse {
    pub errors: Vec<String>,
}

/// Missing or malformed field, keyed by field name.
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldErrorResponse {
    pub message: std::collections::HashMap<String, String>,
}

pub fn serialize_restaurant(restaurant: &Restaurant) -> RestaurantSummary {
    RestaurantSummary {
        id: restaurant.id,
        name: restaurant.name.clone(),
        address: restaurant.address.clone(),
    }
}

pub fn serialize_pizza(pizza: &Pizza) -> PizzaSummary {
    PizzaSummary {
        id: pizza.id,
        name: pizza.name.clone(),
        ingredients: pizza.ingredients.clone(),
    }
}

pub fn serialize_restaurant_detail(
    restaurant: &Restaurant,
    menu: &[(RestaurantPizza, Pizza)],
) -> RestaurantDetail {
    RestaurantDetail {
        id: restaurant.id,
        name: restaurant.name.clone(),
        address: restaurant.address.clone(),
        restaurant_pizzas: menu
            .iter()
            .map(|(item, pizza)| RestaurantPizzaEntry {
                id: item.id,
                pizza: serialize_pizza(pizza),
                pizza_id: item.pizza_id,
                price: item.price,
                restaurant_id: item.restaurant_id,
            })
            .collect(),
    }
}

pub fn serialize_created_restaurant_pizza(
    item: &RestaurantPizza,
    pizza: &Pizza,
    restaurant: &Restaurant,
) -> CreatedRestaurantPizza {
    CreatedRestaurantPizza {
        id: item.id,
        price: item.price,
        pizza_id: item.pizza_id,
        restaurant_id: item.restaurant_id,
        pizza: serialize_pizza(pizza),
        restaurant: serialize_restaurant(restaurant),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_restaurant_detail_shape() {
        let restaurant = Restaurant {
            id: 1,
            name: "A".to_string(),
            address: "X".to_string(),
        };
        let pizza = Pizza {
            id: 2,
            name: "Cheese".to_string(),
            ingredients: "Dough,Cheese".to_string(),
        };
        let item = RestaurantPizza {
            id: 3,
            price: 10,
            restaurant_id: 1,
            pizza_id: 2,
        };

        let detail = serialize_restaurant_detail(&restaurant, &[(item, pizza)]);
        assert_eq!(
            serde_json::to_value(&detail).unwrap(),
            json!({
                "id": 1,
                "name": "A",
                "address": "X",
                "restaurant_pizzas": [{
                    "id": 3,
                    "pizza": {"id": 2, "name": "Cheese", "ingredients": "Dough,Cheese"},
                    "pizza_id": 2,
                    "price": 10,
                    "restaurant_id": 1,
                }],
            })
        );
    }
}
