use diesel::prelude::*;
use tracing::info;

use crate::models::{NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};
use crate::store::{clear_tables, Store, StoreResult};

const RESTAURANTS: [(&str, &str); 3] = [
    ("Karen's Pizza Shack", "address1"),
    ("Sanjay's Pizza", "address2"),
    ("Kiki's Pizza", "address3"),
];

const PIZZAS: [(&str, &str); 3] = [
    ("Emma", "Dough, Tomato Sauce, Cheese"),
    ("Geri", "Dough, Tomato Sauce, Cheese, Pepperoni"),
    ("Melanie", "Dough, Sauce, Ricotta, Red peppers, Mustard"),
];

// (restaurant index, pizza index, price)
const PRICES: [(usize, usize, i32); 3] = [(0, 0, 1), (1, 1, 4), (2, 2, 5)];

/// Replaces every row with the demo data set.
pub fn seed(store: &Store) -> StoreResult<()> {
    seed_rows(store, &RESTAURANTS, &PIZZAS, &PRICES)
}

// Clearing and loading share one transaction, so a failed insert leaves the
// previous rows in place.
fn seed_rows(
    store: &Store,
    restaurant_rows: &[(&str, &str)],
    pizza_rows: &[(&str, &str)],
    price_rows: &[(usize, usize, i32)],
) -> StoreResult<()> {
    store.transaction(|conn| {
        clear_tables(conn)?;

        let mut created_restaurants = Vec::with_capacity(restaurant_rows.len());
        for &(name, address) in restaurant_rows {
            let restaurant = diesel::insert_into(restaurants::table)
                .values(NewRestaurant { name, address })
                .returning(Restaurant::as_returning())
                .get_result(conn)?;
            created_restaurants.push(restaurant);
        }

        let mut created_pizzas = Vec::with_capacity(pizza_rows.len());
        for &(name, ingredients) in pizza_rows {
            let pizza = diesel::insert_into(pizzas::table)
                .values(NewPizza { name, ingredients })
                .returning(Pizza::as_returning())
                .get_result(conn)?;
            created_pizzas.push(pizza);
        }

        let rows = price_rows
            .iter()
            .map(|&(restaurant, pizza, price)| NewRestaurantPizza {
                price,
                restaurant_id: created_restaurants[restaurant].id,
                pizza_id: created_pizzas[pizza].id,
            })
            .collect::<Vec<_>>();
        diesel::insert_into(restaurant_pizzas::table)
            .values(&rows)
            .execute(conn)?;

        info!(
            restaurants = created_restaurants.len(),
            pizzas = created_pizzas.len(),
            restaurant_pizzas = rows.len(),
            "seeded database"
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_store;

    #[test]
    fn test_seed_is_repeatable() {
        let (_dir, store) = test_store();
        seed(&store).unwrap();
        seed(&store).unwrap();

        let restaurants = store.list_restaurants().unwrap();
        assert_eq!(restaurants.len(), 3);
        assert_eq!(store.list_pizzas().unwrap().len(), 3);

        let (_, menu) = store.restaurant_detail(restaurants[1].id).unwrap().unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].0.price, 4);
        assert_eq!(menu[0].1.name, "Geri");
    }

    #[test]
    fn test_failed_seed_keeps_existing_rows() {
        let (_dir, store) = test_store();
        seed(&store).unwrap();

        let err = seed_rows(
            &store,
            &[("Replacement", "nowhere")],
            &[("Plain", "Dough")],
            &[(0, 0, 31)],
        )
        .unwrap_err();
        assert!(matches!(err, crate::store::StoreError::Constraint(_)));

        let restaurants = store.list_restaurants().unwrap();
        assert_eq!(restaurants.len(), 3);
        assert_eq!(restaurants[0].name, "Karen's Pizza Shack");
        let pizzas = store.list_pizzas().unwrap();
        assert_eq!(pizzas.len(), 3);
        assert_eq!(pizzas[0].name, "Emma");

        let (_, menu) = store.restaurant_detail(restaurants[2].id).unwrap().unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].0.price, 5);
    }
}
