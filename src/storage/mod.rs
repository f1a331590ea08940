mod error;
pub use error::{StorageError, StorageResult};

use std::path::{Path, PathBuf};

use serde::Deserialize;
use uuid::Uuid;

use crate::config::Storage;

pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, Clone)]
pub enum SlipStorage {
    Local {
        dir: PathBuf,
    },
    Blob {
        client: reqwest::Client,
        endpoint: String,
        token: String,
    },
}

#[derive(Debug, Deserialize)]
struct BlobPutResponse {
    url: String,
}

impl SlipStorage {
    pub fn from_config(storage: &Storage) -> Self {
        match storage.blob() {
            Some((endpoint, token)) => {
                tracing::info!("payment slips go to blob store at {endpoint}");
                Self::Blob {
                    client: reqwest::Client::new(),
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    token: token.to_string(),
                }
            }
            None => Self::local(storage.uploads_dir()),
        }
    }

    pub fn local<P: AsRef<Path>>(dir: P) -> Self {
        Self::Local {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn slip_pathname(user_id: Uuid, now_millis: i64, file_name: Option<&str>) -> Option<String> {
        let ext = image_extension(file_name?)?;
        Some(format!("slips/{user_id}-{now_millis}.{ext}"))
    }

    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn put(
        &self,
        pathname: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> StorageResult<String> {
        match self {
            Self::Local { dir } => {
                let target = dir.join(pathname);
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&target, bytes).await?;
                tracing::debug!("slip written to {}", target.display());
                Ok(format!("{UPLOADS_ROUTE}/{pathname}"))
            }
            Self::Blob {
                client,
                endpoint,
                token,
            } => {
                let resp = client
                    .put(format!("{endpoint}/{pathname}"))
                    .bearer_auth(token)
                    .header("x-access", "public")
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        content_type.unwrap_or("application/octet-stream"),
                    )
                    .body(bytes)
                    .send()
                    .await?;

                if !resp.status().is_success() {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(StorageError::HttpStatus { status, body });
                }

                let uploaded: BlobPutResponse = resp.json().await?;
                Ok(uploaded.url)
            }
        }
    }
}

const SLIP_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

fn image_extension(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    SLIP_EXTENSIONS
        .into_iter()
        .find(|allowed| ext.eq_ignore_ascii_case(allowed))
}
