use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, info};

use crate::models::{
    NewPizza, NewRestaurant, NewRestaurantPizza, Pizza, Restaurant, RestaurantPizza,
};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
pub type StoreResult<T> = Result<T, StoreError>;

/// A restaurant's price list, each row paired with the pizza it prices.
pub type RestaurantMenu = Vec<(RestaurantPizza, Pizza)>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database refused the statement (foreign key, check, unique or not-null).
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(DieselError),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("blocking task failed: {0}")]
    Task(String),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation => {
                    StoreError::Constraint(info.message().to_string())
                }
                DatabaseErrorKind::ClosedConnection => {
                    StoreError::Unavailable(info.message().to_string())
                }
                _ => StoreError::Query(DieselError::DatabaseError(kind, info)),
            },
            other => StoreError::Query(other),
        }
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

// SQLite leaves foreign keys off unless asked, per connection.
#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Handle to the restaurant database, shared by every request.
///
/// Cloning is cheap: clones share one connection pool. Each method checks out
/// its own connection and writes happen inside a single transaction.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn open(database_url: &str, pool_max: u32) -> StoreResult<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_max)
            .connection_customizer(Box::new(ConnectionOptions))
            .build(manager)?;
        info!(database_url, pool_max, "opened database");
        Ok(Self { pool })
    }

    fn connection(&self) -> StoreResult<PooledConnection<ConnectionManager<SqliteConnection>>> {
        Ok(self.pool.get()?)
    }

    pub fn run_migrations(&self) -> StoreResult<()> {
        let mut pooled = self.connection()?;
        let conn: &mut SqliteConnection = &mut pooled;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        debug!(count = applied.len(), "applied migrations");
        Ok(())
    }

    /// Runs `f` inside one transaction; any error rolls every statement back.
    pub fn transaction<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> QueryResult<T>,
    {
        let mut pooled = self.connection()?;
        let conn: &mut SqliteConnection = &mut pooled;
        Ok(conn.transaction(f)?)
    }

    /// Runs `f` on tokio's blocking pool so diesel never stalls the runtime.
    pub async fn blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    pub fn list_restaurants(&self) -> StoreResult<Vec<Restaurant>> {
        let conn = &mut self.connection()?;
        let results = restaurants::table
            .order(restaurants::id)
            .select(Restaurant::as_select())
            .load(conn)?;
        Ok(results)
    }

    pub fn find_restaurant(&self, id: i32) -> StoreResult<Option<Restaurant>> {
        let conn = &mut self.connection()?;
        let result = restaurants::table
            .find(id)
            .select(Restaurant::as_select())
            .first(conn)
            .optional()?;
        Ok(result)
    }

    pub fn restaurant_detail(&self, id: i32) -> StoreResult<Option<(Restaurant, RestaurantMenu)>> {
        let conn = &mut self.connection()?;
        let detail = conn.transaction::<_, DieselError, _>(|conn| {
            let Some(restaurant) = restaurants::table
                .find(id)
                .select(Restaurant::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(None);
            };

            let menu = RestaurantPizza::belonging_to(&restaurant)
                .inner_join(pizzas::table)
                .order(restaurant_pizzas::id)
                .select((RestaurantPizza::as_select(), Pizza::as_select()))
                .load(conn)?;
            Ok(Some((restaurant, menu)))
        })?;
        Ok(detail)
    }

    /// Deletes the restaurant and its price rows. Returns `false` when no
    /// restaurant has `id`.
    pub fn delete_restaurant(&self, id: i32) -> StoreResult<bool> {
        let conn = &mut self.connection()?;
        let deleted = conn.transaction::<_, DieselError, _>(|conn| {
            diesel::delete(
                restaurant_pizzas::table.filter(restaurant_pizzas::restaurant_id.eq(id)),
            )
            .execute(conn)?;
            diesel::delete(restaurants::table.find(id)).execute(conn)
        })?;
        Ok(deleted > 0)
    }

    pub fn list_pizzas(&self) -> StoreResult<Vec<Pizza>> {
        let conn = &mut self.connection()?;
        let results = pizzas::table
            .order(pizzas::id)
            .select(Pizza::as_select())
            .load(conn)?;
        Ok(results)
    }

    pub fn find_pizza(&self, id: i32) -> StoreResult<Option<Pizza>> {
        let conn = &mut self.connection()?;
        let result = pizzas::table
            .find(id)
            .select(Pizza::as_select())
            .first(conn)
            .optional()?;
        Ok(result)
    }

    pub fn create_restaurant_pizza(
        &self,
        new_restaurant_pizza: &NewRestaurantPizza,
    ) -> StoreResult<RestaurantPizza> {
        let conn = &mut self.connection()?;
        let created = conn.transaction::<_, DieselError, _>(|conn| {
            diesel::insert_into(restaurant_pizzas::table)
                .values(new_restaurant_pizza)
                .returning(RestaurantPizza::as_returning())
                .get_result(conn)
        })?;
        Ok(created)
    }

    pub fn insert_restaurant(&self, name: &str, address: &str) -> StoreResult<Restaurant> {
        let conn = &mut self.connection()?;
        let created = diesel::insert_into(restaurants::table)
            .values(NewRestaurant { name, address })
            .returning(Restaurant::as_returning())
            .get_result(conn)?;
        Ok(created)
    }

    pub fn insert_pizza(&self, name: &str, ingredients: &str) -> StoreResult<Pizza> {
        let conn = &mut self.connection()?;
        let created = diesel::insert_into(pizzas::table)
            .values(NewPizza { name, ingredients })
            .returning(Pizza::as_returning())
            .get_result(conn)?;
        Ok(created)
    }

    /// Removes every row from all three tables.
    pub fn clear(&self) -> StoreResult<()> {
        self.transaction(clear_tables)
    }
}

pub(crate) fn clear_tables(conn: &mut SqliteConnection) -> QueryResult<()> {
    diesel::delete(restaurant_pizzas::table).execute(conn)?;
    diesel::delete(restaurants::table).execute(conn)?;
    diesel::delete(pizzas::table).execute(conn)?;
    Ok(())
}
