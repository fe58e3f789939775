pub mod app;
pub mod books;
pub mod cli;
pub mod config;
pub mod logging;
pub mod search;
pub mod signals;
pub mod state;
pub mod utils;
pub mod web;
