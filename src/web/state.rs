use crate::{model::ModelManager, storage::SlipStorage};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    slips: SlipStorage,
}

impl AppState {
    pub fn new(mm: ModelManager, slips: SlipStorage) -> Self {
        Self { mm, slips }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn slips(&self) -> &SlipStorage {
        &self.slips
    }
}
