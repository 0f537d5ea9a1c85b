pub mod api;

pub use api::{ApiState, build_api_router};
