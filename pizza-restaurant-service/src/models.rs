use diesel::prelude::*;

use crate::schema::{pizzas, restaurant_pizzas, restaurants};

pub const MIN_PRICE: i32 = 1;
pub const MAX_PRICE: i32 = 30;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant<'a> {
    pub name: &'a str,
    pub address: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = pizzas)]
pub struct Pizza {
    pub id: i32,
    pub name: String,
    pub ingredients: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = pizzas)]
pub struct NewPizza<'a> {
    pub name: &'a str,
    pub ingredients: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(belongs_to(Pizza))]
#[diesel(table_name = restaurant_pizzas)]
pub struct RestaurantPizza {
    pub id: i32,
    pub price: i32,
    pub restaurant_id: i32,
    pub pizza_id: i32,
}

#[derive(Insertable, Debug, Clone, Copy, PartialEq)]
#[diesel(table_name = restaurant_pizzas)]
pub struct NewRestaurantPizza {
    pub price: i32,
    pub restaurant_id: i32,
    pub pizza_id: i32,
}
