// src/config.rs
//! Process configuration: upstream endpoint, credentials, and the fixed
//! bounds the report composer runs under. Loaded once at startup from the
//! environment (after `dotenvy`), immutable thereafter.

pub const ENV_API_URL: &str = "EMAILBISON_API_URL";
pub const ENV_API_TOKEN: &str = "EMAILBISON_API_TOKEN";
pub const ENV_DEFAULT_WORKSPACE: &str = "EMAILBISON_WORKSPACE_ID";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_API_URL: &str = "https://spellcast.hirecharm.com";
/// The workspace reports default to when the caller does not pass one.
pub const DEFAULT_WORKSPACE_ID: u64 = 13;
pub const DEFAULT_PORT: u16 = 3000;

/// Transport-level TTL for cached upstream GETs, in seconds.
pub const UPSTREAM_CACHE_TTL_SECS: u64 = 300;

/// Hard cap on reply pagination (upstream serves 15 replies per page).
pub const MAX_REPLY_PAGES: u64 = 100;
/// At most this many campaigns get a per-campaign stats fetch.
pub const MAX_STATS_CAMPAIGNS: usize = 15;
/// At most this many campaigns get a sequence-body fetch.
pub const MAX_SEQUENCE_CAMPAIGNS: usize = 9;
/// Opener/CTA analysis needs at least this many campaigns with bodies.
pub const MIN_CAMPAIGNS_FOR_BODY_ANALYSIS: usize = 3;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub api_token: String,
    pub default_workspace_id: u64,
    pub port: u16,
}

impl AppConfig {
    /// Read configuration from the environment, falling back to defaults.
    /// A missing token is allowed (requests will simply be unauthorized);
    /// startup should not fail on configuration alone.
    pub fn from_env() -> Self {
        Self {
            api_url: trim_trailing_slash(
                std::env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            ),
            api_token: std::env::var(ENV_API_TOKEN).unwrap_or_default(),
            default_workspace_id: std::env::var(ENV_DEFAULT_WORKSPACE)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_WORKSPACE_ID),
            port: std::env::var(ENV_PORT)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn trailing_slashes_are_stripped() {
        assert_eq!(
            trim_trailing_slash("https://api.example.com//".into()),
            "https://api.example.com"
        );
        assert_eq!(
            trim_trailing_slash("https://api.example.com".into()),
            "https://api.example.com"
        );
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_and_defaults() {
        env::remove_var(ENV_API_URL);
        env::remove_var(ENV_API_TOKEN);
        env::remove_var(ENV_DEFAULT_WORKSPACE);
        env::remove_var(ENV_PORT);

        let cfg = AppConfig::from_env();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.api_token, "");
        assert_eq!(cfg.default_workspace_id, DEFAULT_WORKSPACE_ID);
        assert_eq!(cfg.port, DEFAULT_PORT);

        env::set_var(ENV_API_URL, "https://bison.example.com/");
        env::set_var(ENV_DEFAULT_WORKSPACE, "42");
        let cfg = AppConfig::from_env();
        assert_eq!(cfg.api_url, "https://bison.example.com");
        assert_eq!(cfg.default_workspace_id, 42);

        // Garbage values fall back instead of panicking.
        env::set_var(ENV_DEFAULT_WORKSPACE, "not-a-number");
        let cfg = AppConfig::from_env();
        assert_eq!(cfg.default_workspace_id, DEFAULT_WORKSPACE_ID);

        env::remove_var(ENV_API_URL);
        env::remove_var(ENV_DEFAULT_WORKSPACE);
    }
}
