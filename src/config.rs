use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://www58.myfantasyleague.com/";
pub const DEFAULT_DATA_PATH: &str = "./2019_2020_top_players.csv";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,project_morey=debug";

/// Loads `.env.local` then `.env` if present. Missing files are ignored.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("MOREY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            user_agent: env_string("MOREY_USER_AGENT")
                .unwrap_or_else(|| format!("project_morey/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("project_morey/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let data_path = env_string("MOREY_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let bind = env_string("MOREY_BIND")
            .and_then(|raw| raw.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port = env_string("MOREY_PORT")
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        Self {
            data_path,
            bind,
            port,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn env_string(key: &str) -> Option<String> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
