pub mod auth;
pub mod chart;
pub mod client;
pub mod domain;
pub mod session;
pub mod view;

pub mod config {
    use crate::client::{Deployment, Endpoints};
    use anyhow::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const SESSION_DIR_NAME: &str = ".cocoon";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: String,
        pub deployment: Deployment,
        pub http_timeout: Duration,
        pub session_dir: Option<PathBuf>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let api_base_url = std::env::var("COCOON_API_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

            let deployment = match std::env::var("COCOON_DEPLOYMENT") {
                Ok(s) => s
                    .parse::<Deployment>()
                    .context("COCOON_DEPLOYMENT must be `development` or `production`")?,
                Err(_) => Deployment::Development,
            };

            let timeout_secs = parse_timeout_secs(std::env::var("COCOON_HTTP_TIMEOUT_SECS").ok())?;

            let session_dir = std::env::var("COCOON_SESSION_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .or_else(|| dirs::home_dir().map(|home| home.join(SESSION_DIR_NAME)));

            Ok(Self {
                api_base_url,
                deployment,
                http_timeout: Duration::from_secs(timeout_secs),
                session_dir,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        /// Endpoint paths for the configured deployment, resolved once.
        pub fn endpoints(&self) -> Endpoints {
            Endpoints::for_deployment(self.deployment)
        }

        pub fn require_session_dir(&self) -> anyhow::Result<&std::path::Path> {
            self.session_dir
                .as_deref()
                .context("COCOON_SESSION_DIR is required when no home directory is available")
        }
    }

    fn parse_timeout_secs(raw: Option<String>) -> anyhow::Result<u64> {
        match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s
                .parse::<u64>()
                .with_context(|| format!("COCOON_HTTP_TIMEOUT_SECS must be a whole number of seconds (got {s:?})")),
            None => Ok(DEFAULT_TIMEOUT_SECS),
        }
    }

}
