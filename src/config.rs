use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub admin_api_token: String,
    pub reorder_lock_ttl_seconds: u64,
    pub seed_default_templates: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://issue_templates.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let admin_api_token =
            env::var("ADMIN_API_TOKEN").map_err(|_| ConfigError::MissingAdminToken)?;
        if admin_api_token.trim().is_empty() {
            return Err(ConfigError::MissingAdminToken);
        }

        let reorder_lock_ttl_seconds = env::var("REORDER_LOCK_TTL_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let seed_default_templates = env::var("SEED_DEFAULT_TEMPLATES")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Config {
            database_url,
            server_host,
            server_port,
            admin_api_token,
            reorder_lock_ttl_seconds,
            seed_default_templates,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ADMIN_API_TOKEN environment variable not set")]
    MissingAdminToken,

    #[error("Invalid port number")]
    InvalidPort,
}
