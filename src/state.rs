//! Application state shared across request handlers.

use crate::search::SearchService;

#[derive(Clone)]
pub struct AppState {
    pub search: SearchService,
}

impl AppState {
    pub fn new(search: SearchService) -> Self {
        Self { search }
    }
}
