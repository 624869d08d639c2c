use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::api::{AppOptions, DEFAULT_SERVICE_NAME};

/// Command line and environment configuration for the server.
#[derive(Debug, Clone, Parser)]
#[command(name = "vsheet")]
#[command(about = "Persistence service for the v-sheet spreadsheet editor")]
pub struct Config {
    /// Listen address
    #[arg(short, long, env = "VSHEET_ADDR", default_value = "127.0.0.1:5000")]
    pub addr: SocketAddr,

    /// Directory holding `files/` and the recent pointer
    #[arg(short, long, env = "VSHEET_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Editor front-end root containing `index.html`, `css/` and `js/`
    #[arg(long, env = "VSHEET_STATIC_DIR", default_value = ".")]
    pub static_dir: PathBuf,

    /// Name reported by the health check
    #[arg(long, env = "VSHEET_SERVICE_NAME", default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,

    /// Disable cross-origin requests
    #[arg(long, env = "VSHEET_NO_CORS")]
    pub no_cors: bool,
}

impl Config {
    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            static_dir: Some(self.static_dir.clone()),
            cors: !self.no_cors,
        }
    }
}
