use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub upload_dir: String,
    pub ml_service_url: String,
    pub max_body_size: usize,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("STAFFHUB_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid STAFFHUB_HOST: {e}"))?;

        let port: u16 = env_or("STAFFHUB_PORT", "5000")
            .parse()
            .map_err(|e| format!("Invalid STAFFHUB_PORT: {e}"))?;

        let base_url = env_or("STAFFHUB_BASE_URL", &format!("http://{host}:{port}"));

        let upload_dir = env_or("STAFFHUB_UPLOAD_DIR", "uploads");

        let ml_service_url = env_or("STAFFHUB_ML_SERVICE_URL", "http://localhost:8000");

        let max_body_size: usize = env_or("STAFFHUB_MAX_BODY_SIZE", "10485760")
            .parse()
            .map_err(|e| format!("Invalid STAFFHUB_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("STAFFHUB_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("STAFFHUB_SMTP_HOST").ok(),
            std::env::var("STAFFHUB_SMTP_PORT").ok(),
            std::env::var("STAFFHUB_SMTP_USER").ok(),
            std::env::var("STAFFHUB_SMTP_PASS").ok(),
            std::env::var("STAFFHUB_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid STAFFHUB_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            upload_dir,
            ml_service_url,
            max_body_size,
            log_level,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
