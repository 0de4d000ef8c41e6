pub mod auth;
pub mod config;
pub mod config_validator;
pub mod error;
pub mod handlers;
pub mod health;
pub mod id_generator;
pub mod metrics;
pub mod middleware;
pub mod model;
pub mod response;
pub mod seed;
pub mod server;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{ApiError, Result};
pub use handlers::AppState;
pub use server::create_app;
