use std::path::PathBuf;

use swing_core::uploads::DEFAULT_MAX_IMAGE_BYTES;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Defaults suit local development; override via the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL URL. In-memory storage is used when unset.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Expected audience of Google ID tokens.
    pub google_client_id: Option<String>,
    /// Emails granted the admin role at sign-in (lower-cased).
    pub admin_emails: Vec<String>,
    /// Where uploaded profile images are written; served at `/uploads`.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Reject free votes inside the 24 hour window server side.
    pub enforce_free_vote_cooldown: bool,
    /// How often expired competitions are closed, in seconds.
    pub competition_sweep_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `DATABASE_URL`               | unset (in-memory)       |
    /// | `GOOGLE_CLIENT_ID`           | unset                   |
    /// | `ADMIN_EMAILS`               | empty                   |
    /// | `UPLOAD_DIR`                 | `./uploads`             |
    /// | `MAX_UPLOAD_BYTES`           | `5242880`               |
    /// | `ENFORCE_FREE_VOTE_COOLDOWN` | `false`                 |
    /// | `COMPETITION_SWEEP_SECS`     | `60`                    |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = non_empty_var("DATABASE_URL");
        let google_client_id = non_empty_var("GOOGLE_CLIENT_ID");

        let admin_emails = split_list(&std::env::var("ADMIN_EMAILS").unwrap_or_default())
            .into_iter()
            .map(|e| e.to_lowercase())
            .collect();

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into()));

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_IMAGE_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let enforce_free_vote_cooldown: bool = std::env::var("ENFORCE_FREE_VOTE_COOLDOWN")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("ENFORCE_FREE_VOTE_COOLDOWN must be true or false");

        let competition_sweep_secs: u64 = std::env::var("COMPETITION_SWEEP_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("COMPETITION_SWEEP_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            jwt: JwtConfig::from_env(),
            google_client_id,
            admin_emails,
            upload_dir,
            max_upload_bytes,
            enforce_free_vote_cooldown,
            competition_sweep_secs,
        }
    }

    /// Whether `email` is listed in `ADMIN_EMAILS`.
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.admin_emails.iter().any(|e| *e == email)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
