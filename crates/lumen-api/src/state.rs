//! Application state shared by all handlers.

use std::sync::Arc;

use lumen_core::Config;
use lumen_storage::Storage;

use crate::services::EmailService;
use crate::upload::UploadGateway;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: UploadGateway,
    /// Downstream store for accepted images
    pub storage: Arc<dyn Storage>,
    pub email: EmailService,
}

impl AppState {
    pub fn new(
        config: Config,
        gateway: UploadGateway,
        storage: Arc<dyn Storage>,
        email: EmailService,
    ) -> Self {
        Self {
            config,
            gateway,
            storage,
            email,
        }
    }
}
