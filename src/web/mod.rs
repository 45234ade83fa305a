//! Web UI: the profile form, a JSON API, and a WebSocket progress stream.

pub mod model;
pub mod page;
pub mod routes;

pub use routes::{AppState, planner_routes};
