use std::sync::Arc;

use shelf_dal::Pool;

use crate::status::StatusReporter;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool) -> Self {
        let status = StatusReporter::new(
            env!("CARGO_PKG_VERSION"),
            app_config.region.as_deref(),
            app_config.zone.as_deref(),
        );
        AppState {
            state: Arc::new(AppStateInner {
                pool,
                app_config,
                status,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn status(&self) -> &StatusReporter {
        &self.state.status
    }
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
    status: StatusReporter,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub region: Option<String>,
    pub zone: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            max_page_size: 1000,
            region: None,
            zone: None,
        }
    }
}
