//! Blocking GitHub contents-API client.
//!
//! - metadata: `GET {api}/{file}?ref=…` → `sha` + `download_url`
//! - content:  `GET {download_url}` → raw bytes
//! - list:     `GET {api}?ref=…` → names of `type == "file"` entries

use std::io::Read;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use fetchini_core::{ContentIdentity, Credentials, RemoteDescriptor, RemoteError, RemoteSource};

const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("fetchini/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a downloaded file; INI files are a few KiB.
pub const MAX_CONTENT_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    sha: String,
    #[serde(rename = "type")]
    kind: String,
    download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    File(ContentEntry),
    Directory(Vec<ContentEntry>),
}

/// GitHub client backed by a shared `ureq` agent.
#[derive(Debug, Clone)]
pub struct GithubClient {
    agent: ureq::Agent,
}

impl GithubClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }

    fn get(&self, url: &str, auth: Option<&Credentials>) -> Result<ureq::Response, RemoteError> {
        let mut request = self.agent.get(url).set("Accept", ACCEPT);
        if let Some(creds) = auth {
            request = request.set("Authorization", &creds.header_value());
        }
        tracing::debug!("GET {url}");
        request.call().map_err(|e| classify(url, e))
    }

    fn contents(
        &self,
        url: &str,
        auth: Option<&Credentials>,
    ) -> Result<ContentsResponse, RemoteError> {
        self.get(url, auth)?
            .into_json::<ContentsResponse>()
            .map_err(|e| RemoteError::Decode {
                url: url.to_owned(),
                message: e.to_string(),
            })
    }
}

impl RemoteSource for GithubClient {
    fn metadata(
        &self,
        url: &str,
        auth: Option<&Credentials>,
    ) -> Result<RemoteDescriptor, RemoteError> {
        let entry = match self.contents(url, auth)? {
            ContentsResponse::File(entry) => entry,
            ContentsResponse::Directory(_) => {
                return Err(RemoteError::Decode {
                    url: url.to_owned(),
                    message: "expected a file, got a directory listing".to_owned(),
                })
            }
        };
        let Some(download_url) = entry.download_url else {
            return Err(RemoteError::Decode {
                url: url.to_owned(),
                message: format!("'{}' ({}) has no download_url", entry.name, entry.kind),
            });
        };
        Ok(RemoteDescriptor {
            identity: ContentIdentity::new(entry.sha),
            download_url,
        })
    }

    fn content(
        &self,
        download_url: &str,
        auth: Option<&Credentials>,
    ) -> Result<Vec<u8>, RemoteError> {
        let response = self.get(download_url, auth)?;
        let mut body = Vec::new();
        // One byte past the cap tells a full body apart from a cut one.
        response
            .into_reader()
            .take(MAX_CONTENT_BYTES + 1)
            .read_to_end(&mut body)
            .map_err(|e| RemoteError::Io {
                url: download_url.to_owned(),
                source: e,
            })?;
        if body.len() as u64 > MAX_CONTENT_BYTES {
            return Err(RemoteError::TooLarge {
                url: download_url.to_owned(),
                limit: MAX_CONTENT_BYTES,
            });
        }
        Ok(body)
    }

    fn list(&self, url: &str, auth: Option<&Credentials>) -> Result<Vec<String>, RemoteError> {
        match self.contents(url, auth)? {
            ContentsResponse::Directory(entries) => Ok(entries
                .into_iter()
                .filter(|e| e.kind == "file")
                .map(|e| e.name)
                .collect()),
            ContentsResponse::File(_) => Err(RemoteError::Decode {
                url: url.to_owned(),
                message: "expected a directory listing, got a file".to_owned(),
            }),
        }
    }
}

/// Map a `ureq` failure onto the remote error taxonomy.
fn classify(url: &str, err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(code, response) => {
            let exhausted = response.header("X-RateLimit-Remaining") == Some("0");
            match code {
                404 => RemoteError::NotFound {
                    url: url.to_owned(),
                },
                401 => RemoteError::Unauthorized {
                    url: url.to_owned(),
                },
                403 | 429 if exhausted => RemoteError::RateLimited {
                    reset: response
                        .header("X-RateLimit-Reset")
                        .and_then(parse_reset),
                },
                _ => RemoteError::Status {
                    code,
                    url: url.to_owned(),
                },
            }
        }
        ureq::Error::Transport(transport) => RemoteError::Transport {
            url: url.to_owned(),
            message: transport.to_string(),
        },
    }
}

fn parse_reset(raw: &str) -> Option<DateTime<Utc>> {
    let secs = raw.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}
