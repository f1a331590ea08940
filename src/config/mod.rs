use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    storage: Storage,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
    #[serde(default = "default_public_url")]
    public_url: String,
    #[serde(default = "default_session_days")]
    session_days: i64,
    #[serde(default)]
    secure_cookies: bool,
    #[serde(default = "default_frontend_dir")]
    frontend_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    #[serde(default = "default_uploads_dir")]
    uploads_dir: String,
    #[serde(default = "default_max_slip_bytes")]
    max_slip_bytes: usize,
    blob_endpoint: Option<String>,
    blob_token: Option<String>,
}

fn default_public_url() -> String {
    String::from("http://localhost:3000")
}

fn default_session_days() -> i64 {
    30
}

fn default_frontend_dir() -> String {
    String::from("./public")
}

fn default_uploads_dir() -> String {
    String::from("./uploads")
}

fn default_max_slip_bytes() -> usize {
    5 * 1024 * 1024
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            max_slip_bytes: default_max_slip_bytes(),
            blob_endpoint: None,
            blob_token: None,
        }
    }
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    let config: Self = toml::from_slice(&bytes)?;
                    Ok(config)
                };

                let config = match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                };

                config
            })
            .await
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    #[inline]
    pub fn public_url(&self) -> &str {
        self.public_url.trim_end_matches('/')
    }

    #[inline]
    pub fn session_days(&self) -> i64 {
        self.session_days
    }

    #[inline]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    #[inline]
    pub fn frontend_dir(&self) -> &str {
        &self.frontend_dir
    }
}

impl Storage {
    #[inline]
    pub fn uploads_dir(&self) -> &str {
        &self.uploads_dir
    }

    #[inline]
    pub fn max_slip_bytes(&self) -> usize {
        self.max_slip_bytes
    }

    pub fn blob(&self) -> Option<(&str, &str)> {
        let endpoint = self.blob_endpoint.as_deref()?;
        let token = self.blob_token.as_deref()?;
        if token.is_empty() || token.contains("your-") {
            return None;
        }
        Some((endpoint.trim_end_matches('/'), token))
    }
}
