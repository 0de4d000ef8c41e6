use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "todo-api", version, about = "In-memory Users/Todos REST API")]
pub struct Config {
    /// Server bind address
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind_addr: SocketAddr,

    /// Shared secret required on create/update/delete requests
    #[arg(long, env = "API_KEY", default_value = "dev-secret-key")]
    pub api_key: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Directory served for paths that match no API route
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Populate the store with demo users and todos on start-up
    #[arg(long, env = "SEED_DEMO_DATA", default_value_t = true, action = clap::ArgAction::Set)]
    pub seed: bool,

    /// Attach a permissive CORS layer
    #[arg(long, env = "ENABLE_CORS", default_value_t = true, action = clap::ArgAction::Set)]
    pub enable_cors: bool,
}

impl Config {
    /// Load configuration from command-line arguments and environment variables
    pub fn from_env() -> Self {
        Config::parse()
    }

    /// Same defaults as the command line, but with the given API key and no seed data.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            seed: false,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_key: "dev-secret-key".to_string(),
            log_level: "info".to_string(),
            static_dir: PathBuf::from("public"),
            seed: true,
            enable_cors: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_cli_defaults() {
        let parsed = Config::try_parse_from(["todo-api"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.bind_addr, default.bind_addr);
        assert_eq!(parsed.api_key, default.api_key);
        assert_eq!(parsed.log_level, default.log_level);
        assert_eq!(parsed.static_dir, default.static_dir);
        assert_eq!(parsed.seed, default.seed);
    }

    #[test]
    fn test_flags_override_defaults() {
        let parsed = Config::try_parse_from([
            "todo-api",
            "--api-key",
            "s3cret",
            "--seed",
            "false",
            "--bind-addr",
            "0.0.0.0:8080",
        ])
        .unwrap();
        assert_eq!(parsed.api_key, "s3cret");
        assert!(!parsed.seed);
        assert_eq!(parsed.bind_addr.port(), 8080);
    }

    #[test]
    fn test_with_api_key_disables_seed() {
        let config = Config::with_api_key("k");
        assert_eq!(config.api_key, "k");
        assert!(!config.seed);
    }
}
