use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig,
    images::{FsImageStore, ImageStore},
};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Build state with the filesystem image store rooted at `config.web_root`.
    pub fn new(orm: DatabaseConnection, config: AppConfig) -> Self {
        let images = Arc::new(FsImageStore::new(config.web_root.clone()));
        Self {
            orm,
            config: Arc::new(config),
            images,
        }
    }
}
