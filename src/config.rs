use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// UTC wall-clock time at which yesterday's report is generated.
    pub report_hour: u32,
    pub report_minute: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let report_hour = env::var("REPORT_HOUR")
            .ok()
            .and_then(|h| h.parse::<u32>().ok())
            .filter(|h| *h < 24)
            .unwrap_or(0);
        let report_minute = env::var("REPORT_MINUTE")
            .ok()
            .and_then(|m| m.parse::<u32>().ok())
            .filter(|m| *m < 60)
            .unwrap_or(30);
        Ok(Self {
            database_url,
            host,
            port,
            report_hour,
            report_minute,
        })
    }
}
