use std::{path::PathBuf, time::Duration};

use crate::error::Result;
pub use clap::Parser;
use shelf_app::state::AppConfig;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "SHELF_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "SHELF_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "SHELF_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of server, as visible to clients"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "SHELF_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/shelf.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "SHELF_DATA_DIR",
        help = "Data directory for the catalog database, default is system default like ~/.local/share/shelf",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "SHELF_DEFAULT_PAGE_SIZE",
        default_value = "100",
        help = "Number of books returned by listing when no limit is given",
        value_parser = clap::value_parser!(u32).range(0..=shelf_dal::MAX_LIMIT)
    )]
    pub default_page_size: u32,

    #[arg(
        long,
        env = "SHELF_MAX_PAGE_SIZE",
        default_value = "1000",
        help = "Largest accepted listing limit, at most 1000",
        value_parser = clap::value_parser!(u32).range(1..=shelf_dal::MAX_LIMIT)
    )]
    pub max_page_size: u32,

    #[arg(
        long,
        env = "SHELF_DB_ACQUIRE_TIMEOUT",
        default_value = "5s",
        help = "How long to wait for a database connection or lock, in human friendly format (e.g. 500ms, 5s)",
        value_parser = humantime::parse_duration
    )]
    pub db_acquire_timeout: Duration,

    #[arg(
        long,
        env = "SHELF_REGION",
        help = "Deployment region reported by health check, only last path segment is used"
    )]
    pub region: Option<String>,

    #[arg(
        long,
        env = "SHELF_ZONE",
        help = "Deployment zone reported by health check, only last path segment is used"
    )]
    pub zone: Option<String>,

    #[arg(long, env = "SHELF_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("shelf"))
        .unwrap_or_else(|| PathBuf::from("shelf"))
        .to_string_lossy()
        .to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse()?.checked()
    }

    /// Checks constraints between options, which clap cannot express
    pub fn checked(self) -> Result<Self> {
        if self.default_page_size > self.max_page_size {
            return Err(anyhow::anyhow!(
                "default page size {} is bigger than max page size {}",
                self.default_page_size,
                self.max_page_size
            ));
        }
        Ok(self)
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/shelf.db", self.data_dir))
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
            region: config.region.clone(),
            zone: config.zone.clone(),
        }
    }
}
