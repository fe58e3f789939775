//! HTTP front-end for the search pipeline.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod search;

pub use routes::*;
