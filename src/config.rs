use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub max_body_size: usize,
    pub upload_dir: PathBuf,
    pub worker_count: usize,
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

        let host: IpAddr = env_or("AULA_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid AULA_HOST: {e}"))?;

        let port: u16 = env_or("AULA_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid AULA_PORT: {e}"))?;

        let base_url = env_or("AULA_BASE_URL", &format!("http://{host}:{port}"));

        // Evidence files are capped at 10 MiB; the request cap leaves room
        // for the multipart framing and text fields around them.
        let max_body_size: usize = env_or("AULA_MAX_BODY_SIZE", "12582912")
            .parse()
            .map_err(|e| format!("Invalid AULA_MAX_BODY_SIZE: {e}"))?;

        let upload_dir = PathBuf::from(env_or("AULA_UPLOAD_DIR", "uploads"));

        let worker_count: usize = env_or("AULA_WORKER_COUNT", "2")
            .parse()
            .map_err(|e| format!("Invalid AULA_WORKER_COUNT: {e}"))?;

        let log_level = env_or("AULA_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("AULA_SMTP_HOST").ok(),
            std::env::var("AULA_SMTP_PORT").ok(),
            std::env::var("AULA_SMTP_USER").ok(),
            std::env::var("AULA_SMTP_PASS").ok(),
            std::env::var("AULA_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid AULA_SMTP_PORT: {e}"))?,
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
            max_body_size,
            upload_dir,
            worker_count,
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
