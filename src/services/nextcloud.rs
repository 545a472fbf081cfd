//! Nextcloud client.
//!
//! Files go through WebDAV (`/remote.php/dav/files/{user}/...`); public
//! links come from the OCS share API, which answers HTTP 200 even when it
//! refuses, so the outcome is read from the XML body.

use super::retry::{is_transient_http, RetryPolicy};
use crate::error::UploadError;
use crate::models::config::{NetworkConfig, NextcloudConfig};
use crate::Result;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;

const SHARE_API_PATH: &str = "/ocs/v1.php/apps/files_sharing/api/v1/shares";
/// OCS share type for public links.
const PUBLIC_LINK_SHARE: &str = "3";

#[derive(Debug, Deserialize)]
struct OcsResponse {
    meta: OcsMeta,
    #[serde(default)]
    data: Option<OcsData>,
}

#[derive(Debug, Deserialize)]
struct OcsMeta {
    status: String,
    statuscode: u16,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OcsData {
    #[serde(default)]
    token: Option<String>,
}

/// Parse an OCS share answer into a public link.
pub fn parse_share_response(
    body: &str,
    base_url: &str,
    remote_path: &str,
) -> std::result::Result<String, UploadError> {
    let response: OcsResponse = quick_xml::de::from_str(body).map_err(|e| {
        UploadError::Other(format!("unreadable share response for {}: {}", remote_path, e))
    })?;

    let meta = response.meta;
    let failed = |meta: OcsMeta| UploadError::ShareFailed {
        path: remote_path.to_string(),
        status: meta.status,
        statuscode: meta.statuscode,
        message: meta.message.unwrap_or_default(),
    };
    if !meta.status.eq_ignore_ascii_case("ok") {
        return Err(failed(meta));
    }
    match response.data.and_then(|d| d.token).filter(|t| !t.is_empty()) {
        Some(token) => Ok(format!("{}/s/{}", base_url.trim_end_matches('/'), token)),
        None => Err(failed(OcsMeta {
            message: Some("no share token in response".to_string()),
            ..meta
        })),
    }
}

/// Every ancestor of a remote folder, shortest first.
pub fn folder_ancestors(folder: &str) -> Vec<String> {
    let mut current = String::new();
    folder
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            current.clone()
        })
        .collect()
}

/// Join a remote folder and a file name.
pub fn remote_file_path(folder: &str, filename: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", folder, filename)
    }
}

/// Nextcloud client.
pub struct NextcloudClient {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
    timeout: Duration,
    upload_timeout: Duration,
    retry: RetryPolicy,
}

impl NextcloudClient {
    /// Create a client; URL, user and password are all required.
    pub fn new(config: &NextcloudConfig, network: &NetworkConfig) -> Result<Self> {
        let missing = |name: &str| {
            crate::Error::Config(format!(
                "Nextcloud {} not configured. Set NEXTCLOUD_{}",
                name.to_lowercase(),
                name
            ))
        };
        let base_url = config.url.clone().ok_or_else(|| missing("URL"))?;
        let username = config.username.clone().ok_or_else(|| missing("USERNAME"))?;
        let password = config.password.clone().ok_or_else(|| missing("PASSWORD"))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            client: reqwest::Client::builder()
                .connect_timeout(network.timeout())
                .build()?,
            timeout: network.timeout(),
            upload_timeout: network.upload_timeout(),
            retry: RetryPolicy::from_config(network),
        })
    }

    fn dav_url(&self, remote_path: &str) -> String {
        let encoded: Vec<String> = remote_path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        format!(
            "{}/remote.php/dav/files/{}/{}",
            self.base_url,
            urlencoding::encode(&self.username),
            encoded.join("/")
        )
    }

    /// Create `folder` and every missing ancestor.
    pub async fn ensure_folder(&self, folder: &str) -> std::result::Result<(), UploadError> {
        let mkcol = Method::from_bytes(b"MKCOL")
            .map_err(|e| UploadError::Other(format!("invalid method: {}", e)))?;

        for ancestor in folder_ancestors(folder) {
            let url = self.dav_url(&ancestor);
            let response = self
                .retry
                .run("Nextcloud MKCOL", is_transient_http, || {
                    self.client
                        .request(mkcol.clone(), &url)
                        .basic_auth(&self.username, Some(&self.password))
                        .timeout(self.timeout)
                        .send()
                })
                .await
                .map_err(|e| UploadError::EndpointUnreachable(e.to_string()))?;

            match response.status() {
                StatusCode::CREATED => tracing::debug!("Created remote folder {}", ancestor),
                StatusCode::METHOD_NOT_ALLOWED => {
                    tracing::debug!("Remote folder exists: {}", ancestor)
                }
                status => return Err(unexpected(url, status, response).await),
            }
        }
        Ok(())
    }

    /// Upload a local file to `remote_path`, streaming its content.
    pub async fn upload_file(
        &self,
        local_path: &Path,
        remote_path: &str,
    ) -> std::result::Result<(), UploadError> {
        if !local_path.is_file() {
            return Err(UploadError::FileNotFound(local_path.to_path_buf()));
        }
        let url = self.dav_url(remote_path);
        let target = url.as_str();

        let response = self
            .retry
            .run("Nextcloud upload", is_transient_http, || async move {
                let file = match tokio::fs::File::open(local_path).await {
                    Ok(file) => file,
                    Err(e) => return Ok(Err(e)),
                };
                let len = file.metadata().await.map(|m| m.len()).ok();
                let mut request = self
                    .client
                    .put(target)
                    .basic_auth(&self.username, Some(&self.password))
                    .timeout(self.upload_timeout);
                if let Some(len) = len {
                    request = request.header(reqwest::header::CONTENT_LENGTH, len);
                }
                request
                    .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
                    .send()
                    .await
                    .map(Ok)
            })
            .await
            .map_err(|e| UploadError::EndpointUnreachable(e.to_string()))?
            .map_err(|e| UploadError::Other(format!("cannot read {}: {}", local_path.display(), e)))?;

        match response.status() {
            StatusCode::CREATED => tracing::info!("Uploaded to Nextcloud: {}", remote_path),
            StatusCode::NO_CONTENT => tracing::info!("Overwrote on Nextcloud: {}", remote_path),
            StatusCode::UNAUTHORIZED => {
                return Err(UploadError::AuthRejected(format!("Nextcloud refused {}", self.username)))
            }
            status => return Err(unexpected(url, status, response).await),
        }
        Ok(())
    }

    /// Create a public link for an uploaded file.
    pub async fn create_public_share(&self, remote_path: &str) -> std::result::Result<String, UploadError> {
        let url = format!("{}{}", self.base_url, SHARE_API_PATH);
        let share_path = format!("/{}", remote_path.trim_start_matches('/'));

        let response = self
            .retry
            .run("Nextcloud share", is_transient_http, || {
                self.client
                    .post(&url)
                    .basic_auth(&self.username, Some(&self.password))
                    .header("OCS-APIRequest", "true")
                    .timeout(self.timeout)
                    .form(&[("path", share_path.as_str()), ("shareType", PUBLIC_LINK_SHARE)])
                    .send()
            })
            .await
            .map_err(|e| UploadError::EndpointUnreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(UploadError::AuthRejected(format!("Nextcloud refused {}", self.username)));
        }
        if !status.is_success() {
            return Err(unexpected(url, status, response).await);
        }
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Other(e.to_string()))?;
        let link = parse_share_response(&body, &self.base_url, &share_path)?;
        tracing::info!("Public link for {}: {}", share_path, link);
        Ok(link)
    }
}

async fn unexpected(url: String, status: StatusCode, response: reqwest::Response) -> UploadError {
    let body = response.text().await.unwrap_or_default();
    UploadError::UnexpectedStatus {
        url,
        status: status.as_u16(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHARE_OK: &str = r#"<?xml version="1.0"?>
<ocs>
 <meta>
  <status>ok</status>
  <statuscode>100</statuscode>
  <message>OK</message>
 </meta>
 <data>
  <id>42</id>
  <share_type>3</share_type>
  <token>AbC123xyz</token>
  <url>https://cloud.example.org/s/AbC123xyz</url>
 </data>
</ocs>"#;

    const SHARE_FAILED: &str = r#"<?xml version="1.0"?>
<ocs>
 <meta>
  <status>failure</status>
  <statuscode>404</statuscode>
  <message>Wrong path, file/folder doesn't exist</message>
 </meta>
 <data/>
</ocs>"#;

    #[test]
    fn test_parse_share_ok() {
        let link = parse_share_response(SHARE_OK, "https://cloud.example.org/", "/Videos/a.mp4").unwrap();
        assert_eq!(link, "https://cloud.example.org/s/AbC123xyz");
    }

    #[test]
    fn test_parse_share_logical_failure() {
        let err = parse_share_response(SHARE_FAILED, "https://cloud.example.org", "/Videos/a.mp4")
            .unwrap_err();
        match err {
            UploadError::ShareFailed {
                status,
                statuscode,
                message,
                ..
            } => {
                assert_eq!(status, "failure");
                assert_eq!(statuscode, 404);
                assert!(message.contains("Wrong path"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_share_garbage() {
        assert!(parse_share_response("not xml", "https://c", "/a").is_err());
    }

    #[test]
    fn test_folder_ancestors() {
        assert_eq!(
            folder_ancestors("/Videos/Football/2024/"),
            vec!["Videos", "Videos/Football", "Videos/Football/2024"]
        );
        assert!(folder_ancestors("").is_empty());
    }

    #[test]
    fn test_remote_file_path() {
        assert_eq!(remote_file_path("Videos/Football/", "a.mp4"), "Videos/Football/a.mp4");
        assert_eq!(remote_file_path("", "a.mp4"), "a.mp4");
    }

    #[test]
    fn test_missing_config() {
        let result = NextcloudClient::new(&NextcloudConfig::default(), &NetworkConfig::default());
        assert!(matches!(result, Err(crate::Error::Config(m)) if m.contains("NEXTCLOUD_URL")));
    }
}
