pub mod controller;
pub mod routes;
pub mod schema;
pub mod service;
pub mod session;

pub use routes::auth_routes;
