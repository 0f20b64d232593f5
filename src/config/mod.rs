use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub public_origin: String,
    pub maps_api_key: String,
    pub liff_id: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
            public_origin: env::var("PUBLIC_ORIGIN")?,
            maps_api_key: env::var("MAPS_API_KEY")?,
            liff_id: env::var("LIFF_ID")?,
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW")?.parse().unwrap_or(60),
            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")?.parse().unwrap_or(100),
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    // 分享连结固定形状：<origin>/join/<short_id> 与 <origin>/results/<short_id>
    pub fn join_url(&self, short_id: &str) -> String {
        format!("{}/join/{}", self.public_origin.trim_end_matches('/'), short_id)
    }

    pub fn results_url(&self, short_id: &str) -> String {
        format!(
            "{}/results/{}",
            self.public_origin.trim_end_matches('/'),
            short_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_origin(origin: &str) -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            redis_url: "redis://localhost".into(),
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            api_base_uri: "/api".into(),
            public_origin: origin.into(),
            maps_api_key: "key".into(),
            liff_id: "liff".into(),
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
        }
    }

    #[test]
    fn share_links_have_expected_shape() {
        let config = config_with_origin("https://gather.example.com");
        assert_eq!(
            config.join_url("a1b2c3"),
            "https://gather.example.com/join/a1b2c3"
        );
        assert_eq!(
            config.results_url("a1b2c3"),
            "https://gather.example.com/results/a1b2c3"
        );
    }

    #[test]
    fn trailing_slash_on_origin_is_ignored() {
        let config = config_with_origin("https://gather.example.com/");
        assert_eq!(
            config.join_url("xyz789"),
            "https://gather.example.com/join/xyz789"
        );
    }
}
