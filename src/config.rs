pub const DEFAULT_CONTENT_API_BASE: &str = "http://localhost:5000/api";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub content_api_base: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self { content_api_base: DEFAULT_CONTENT_API_BASE.to_string(), port: DEFAULT_PORT }
    }
}

impl Config {
    /// Reads `CONTENT_API_BASE` and `PORT`; call `dotenv` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::var("CONTENT_API_BASE").ok(), std::env::var("PORT").ok())
    }

    fn from_vars(api_base: Option<String>, port: Option<String>) -> Self {
        let content_api_base = api_base
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_API_BASE.to_string());
        let port = port.and_then(|v| v.trim().parse().ok()).unwrap_or(DEFAULT_PORT);
        Self { content_api_base, port }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_bad_values_fall_back_to_defaults() {
        assert_eq!(Config::from_vars(None, None), Config::default());
        assert_eq!(Config::from_vars(Some("  ".into()), Some("eighty".into())), Config::default());
    }

    #[test]
    fn values_are_normalised() {
        let config = Config::from_vars(Some("https://content.example.com/api/".into()), Some("9000".into()));
        assert_eq!(config.content_api_base, "https://content.example.com/api");
        assert_eq!(config.port, 9000);
    }
}
