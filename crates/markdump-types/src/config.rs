//! Configuration loading for markdump.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/markdump/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::MarkdumpError;

/// Token value that opens the site to everybody.
pub const PUBLIC_TOKEN: &str = "public";

/// Set of accepted access tokens.
///
/// Parsed from a whitespace-separated list. Containing [`PUBLIC_TOKEN`]
/// disables the access check entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthTokens(BTreeSet<String>);

impl AuthTokens {
    pub fn parse(raw: &str) -> Self {
        Self(raw.split_whitespace().map(str::to_string).collect())
    }

    pub fn is_public(&self) -> bool {
        self.0.contains(PUBLIC_TOKEN)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding the Markdown documents
    #[serde(default = "default_repo_dir")]
    pub repo_dir: String,

    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Accepted access tokens, space separated ("public" opens the site)
    #[serde(default)]
    pub auth_tokens: String,

    /// Shared secret for the reload endpoint (generated when unset)
    #[serde(default)]
    pub reload_secret: Option<String>,

    /// URL prefix used for links in rendered pages
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_repo_dir() -> String {
    ".".to_string()
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8134
}

fn default_base_url() -> String {
    "/".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_dir: default_repo_dir(),
            http_host: default_http_host(),
            http_port: default_http_port(),
            auth_tokens: String::new(),
            reload_secret: None,
            base_url: default_base_url(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/markdump/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (MARKDUMP_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, MarkdumpError> {
        let config_dir = ProjectDirs::from("", "", "markdump")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("repo_dir", default_repo_dir())
            .map_err(|e| MarkdumpError::Config(e.to_string()))?
            .set_default("http_host", default_http_host())
            .map_err(|e| MarkdumpError::Config(e.to_string()))?
            .set_default("http_port", default_http_port() as i64)
            .map_err(|e| MarkdumpError::Config(e.to_string()))?
            .set_default("base_url", default_base_url())
            .map_err(|e| MarkdumpError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| MarkdumpError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // MARKDUMP_REPO_DIR, MARKDUMP_HTTP_PORT, MARKDUMP_AUTH_TOKENS, ...
        builder = builder.add_source(
            Environment::with_prefix("MARKDUMP")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| MarkdumpError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| MarkdumpError::Config(e.to_string()))
    }

    /// Socket address string for the HTTP server
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Parsed access tokens
    pub fn tokens(&self) -> AuthTokens {
        AuthTokens::parse(&self.auth_tokens)
    }

    /// Check that the settings can be served.
    pub fn validate(&self) -> Result<(), MarkdumpError> {
        if self.tokens().is_empty() {
            return Err(MarkdumpError::Config(format!(
                "auth_tokens missing (use \"{}\" to serve without a token)",
                PUBLIC_TOKEN
            )));
        }
        if !self.base_url.starts_with('/') {
            return Err(MarkdumpError::InvalidInput(format!(
                "base_url must start with '/', got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Expand ~ in repo_dir to the home directory
    pub fn expanded_repo_dir(&self) -> PathBuf {
        if let Some(rest) = self.repo_dir.strip_prefix("~/") {
            if let Some(dirs) = directories::BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.repo_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.http_port, 8134);
        assert_eq!(settings.http_host, "127.0.0.1");
        assert_eq!(settings.repo_dir, ".");
        assert!(settings.reload_secret.is_none());
    }

    #[test]
    fn test_http_addr() {
        let settings = Settings::default();
        assert_eq!(settings.http_addr(), "127.0.0.1:8134");
    }

    #[test]
    fn test_validate_requires_tokens() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_err());

        settings.auth_tokens = "secret1 secret2".to_string();
        assert!(settings.validate().is_ok());

        settings.base_url = "docs".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_auth_tokens_parse() {
        let tokens = AuthTokens::parse("  secret1\tsecret2 secret1 ");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("secret1"));
        assert!(tokens.contains("secret2"));
        assert!(!tokens.is_public());

        let open = AuthTokens::parse("public");
        assert!(open.is_public());
    }

    #[test]
    fn test_expanded_repo_dir_plain() {
        let settings = Settings {
            repo_dir: "/srv/notes".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.expanded_repo_dir(), PathBuf::from("/srv/notes"));
    }
}
