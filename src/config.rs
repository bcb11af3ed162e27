use std::env;
use std::time::Duration;
use url::Url;

/// Route the relay handler is mounted on unless `PROXY_PATH` overrides it
pub const DEFAULT_PROXY_PATH: &str = "/api/proxy";

/// Routes served by the relay itself, unavailable as `PROXY_PATH`
const RESERVED_PATHS: &[&str] = &["/health", "/metrics"];

/// Upstream host whose hotlink protection the relay is built around
pub const DEFAULT_REFERER: &str = "https://megacloud.tv";

/// Desktop Chrome UA sent upstream so requests look like a normal page load
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub is_dev: bool,
    /// Path the relay handler is served under (always starts with `/`)
    pub proxy_path: String,
    /// Externally visible relay URL used in rewritten playlists.
    /// When `None`, it is derived per request from Host / X-Forwarded-* headers.
    pub public_base_url: Option<String>,
    /// Referer (and Origin) sent upstream when the caller supplies none
    pub default_referer: String,
    /// User-Agent sent upstream
    pub user_agent: String,
    /// Per-request upstream timeout; `None` leaves it to the hosting lifecycle
    pub upstream_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables
    /// In DEV mode, provides sensible defaults. In PROD mode, PORT is required.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let is_dev = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        // Port: required in prod, defaults to 3000 in dev
        let port = if is_dev {
            env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?
        } else {
            env::var("PORT")
                .map_err(|_| "PORT is required in production")?
                .parse()?
        };

        let proxy_path = normalize_path(
            &env::var("PROXY_PATH").unwrap_or_else(|_| DEFAULT_PROXY_PATH.to_string()),
        );

        if RESERVED_PATHS.contains(&proxy_path.as_str()) {
            return Err(format!("PROXY_PATH {proxy_path} collides with a built-in route").into());
        }

        let public_base_url = match env::var("PUBLIC_BASE_URL") {
            Ok(raw) if !raw.trim().is_empty() => {
                let parsed = Url::parse(raw.trim())
                    .map_err(|e| format!("PUBLIC_BASE_URL is not a valid URL: {e}"))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err("PUBLIC_BASE_URL must use http or https".into());
                }
                Some(raw.trim().to_string())
            }
            _ => None,
        };

        let default_referer =
            env::var("DEFAULT_REFERER").unwrap_or_else(|_| DEFAULT_REFERER.to_string());

        let user_agent =
            env::var("UPSTREAM_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        let upstream_timeout = match env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(secs) => Some(Duration::from_secs(secs.parse()?)),
            Err(_) => None,
        };

        Ok(Config {
            port,
            is_dev,
            proxy_path,
            public_base_url,
            default_referer,
            user_agent,
            upstream_timeout,
        })
    }
}

/// Ensure the route path is absolute and has no trailing slash
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_PROXY_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
