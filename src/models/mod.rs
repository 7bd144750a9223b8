pub mod portfolio;
pub mod projects;
pub mod users;

use serde::Deserialize;

/// `?page=` query for page-numbered listings (1-indexed).
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

impl PageQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}
