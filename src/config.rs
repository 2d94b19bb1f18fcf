// Configuration loading
// Priority: CLI flags > environment (.env supported) > defaults

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Global options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Base URL of the ACADEMIYA-Hub REST API
    #[arg(
        long,
        env = "ACADEMIYA_API_URL",
        default_value = "http://localhost:8000/api"
    )]
    pub api_url: String,

    /// Path to the session database (defaults to the platform data dir)
    #[arg(long, env = "ACADEMIYA_SESSION_FILE")]
    pub session_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "10")]
    pub connect_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    pub log_level: String,
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,
}

impl Config {
    pub fn from_args(args: GlobalArgs) -> Result<Self> {
        let session_file = args
            .session_file
            .as_deref()
            .map(expand_tilde)
            .or_else(default_session_file)
            .context("Could not determine a session file location (set ACADEMIYA_SESSION_FILE)")?;

        Ok(Config {
            api_url: args.api_url.trim_end_matches('/').to_string(),
            session_file,
            log_level: args.log_level,
            http_connect_timeout: args.connect_timeout,
            http_request_timeout: args.request_timeout,
        })
    }

    /// Make sure the session database directory exists.
    /// Without durable storage the auth state is unknowable, so this is
    /// checked before anything else runs.
    pub fn validate(&self) -> Result<()> {
        if let Some(parent) = self.session_file.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!(
                    "Failed to create session directory: {}",
                    parent.display()
                )
            })?;
        }
        Ok(())
    }
}

fn default_session_file() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("academiya").join("session.sqlite3"))
}

/// Expand tilde (~) in file paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GlobalArgs {
        GlobalArgs {
            api_url: "http://localhost:8000/api/".to_string(),
            session_file: Some("/tmp/academiya-test/session.sqlite3".to_string()),
            log_level: "info".to_string(),
            connect_timeout: 10,
            request_timeout: 30,
        }
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/data/session.sqlite3");
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.to_string_lossy().ends_with("data/session.sqlite3"));

        assert_eq!(
            expand_tilde("/absolute/path"),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn test_api_url_trailing_slash_stripped() {
        let config = Config::from_args(args()).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000/api");
    }

    #[test]
    fn test_explicit_session_file_wins() {
        let config = Config::from_args(args()).unwrap();
        assert_eq!(
            config.session_file,
            PathBuf::from("/tmp/academiya-test/session.sqlite3")
        );
    }
}
