use crate::journal::Journal;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub journal: Arc<Journal>,
    pub upload_limit: usize,
}

impl AppState {
    pub fn new(journal: Arc<Journal>, upload_limit: usize) -> Self {
        Self {
            journal,
            upload_limit,
        }
    }
}
