pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod request;
pub mod schema;
pub mod seed;
pub mod serializer;
pub mod store;

#[cfg(test)]
mod testing;

pub use handlers::{router, AppState};
pub use store::Store;
