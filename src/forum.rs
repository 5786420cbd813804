//! Discussion forum client.
//!
//! The polling loop only needs two operations, so the forum sits behind the
//! small [`Forum`] trait:
//! - [`RedditClient`]: logs in once with the password grant and keeps the
//!   bearer token for the whole session
//! - [`DryRunForum`]: prints what would be posted
//!
//! # Wire Format
//!
//! Reddit answers `api_type=json` calls with
//! `{"json": {"errors": [[code, message, field], ...], "data": {...}}}`;
//! a non-empty `errors` list is a rejection even on HTTP 200.

use crate::config::Credentials;
use crate::error::ForumError;
use itertools::Itertools;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::cell::Cell;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Fullname of a submitted post (`t3_abc123`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostId(pub String);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Create and edit text posts.
#[allow(async_fn_in_trait)]
pub trait Forum {
    /// Submit a text post to `community` and return its id.
    async fn submit(&self, community: &str, title: &str, body: &str) -> Result<PostId, ForumError>;

    /// Replace the body of an existing post.
    async fn edit(&self, post: &PostId, body: &str) -> Result<(), ForumError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    json: ApiBody,
}

#[derive(Debug, Deserialize)]
struct ApiBody {
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    name: Option<String>,
    url: Option<String>,
}

fn parse_token(body: &str) -> Result<String, ForumError> {
    let token: TokenResponse = serde_json::from_str(body)?;
    match (token.access_token, token.error) {
        (Some(t), _) if !t.is_empty() => Ok(t),
        (_, Some(e)) => Err(ForumError::Auth(e)),
        _ => Err(ForumError::Auth("no access token in response".to_string())),
    }
}

fn parse_api(action: &'static str, body: &str) -> Result<ApiBody, ForumError> {
    let envelope: ApiEnvelope = serde_json::from_str(body)?;
    if !envelope.json.errors.is_empty() {
        let message = envelope
            .json
            .errors
            .iter()
            .map(|e| e.iter().filter_map(|v| v.as_str()).join(": "))
            .join("; ");
        return Err(ForumError::Api { action, message });
    }
    Ok(envelope.json)
}

fn check_status(action: &'static str, status: StatusCode) -> Result<(), ForumError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(ForumError::Auth(format!("{} answered {}", action, status)))
        }
        s if !s.is_success() => Err(ForumError::Api {
            action,
            message: format!("status {}", s),
        }),
        _ => Ok(()),
    }
}

/// Authenticated Reddit session.
pub struct RedditClient {
    http: Client,
    token: String,
}

impl fmt::Debug for RedditClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditClient").finish_non_exhaustive()
    }
}

impl RedditClient {
    /// Log in with the password grant.
    ///
    /// A rejected login is [`ForumError::Auth`]; the caller treats it as fatal.
    #[instrument(level = "info", skip_all, fields(username = %credentials.username))]
    pub async fn login(credentials: &Credentials) -> Result<Self, ForumError> {
        let http = Client::builder()
            .user_agent(credentials.user_agent.clone())
            .build()?;

        let resp = http
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;
        check_status("login", resp.status())?;
        let token = parse_token(&resp.text().await?)?;

        info!("Logged in to forum");
        Ok(Self { http, token })
    }

    async fn call(
        &self,
        action: &'static str,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<ApiBody, ForumError> {
        let t0 = Instant::now();
        let resp = self
            .http
            .post(format!("{}{}", API_BASE, path))
            .bearer_auth(&self.token)
            .form(form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(
            action,
            %status,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Forum call finished"
        );
        check_status(action, status)?;
        parse_api(action, &body)
    }
}

impl Forum for RedditClient {
    #[instrument(level = "info", skip(self, body), fields(bytes = body.len()))]
    async fn submit(&self, community: &str, title: &str, body: &str) -> Result<PostId, ForumError> {
        let reply = self
            .call(
                "submit",
                "/api/submit",
                &[
                    ("api_type", "json"),
                    ("kind", "self"),
                    ("sr", community),
                    ("title", title),
                    ("text", body),
                ],
            )
            .await?;

        let data = reply.data.ok_or_else(|| ForumError::Api {
            action: "submit",
            message: "response carried no post data".to_string(),
        })?;
        let name = data.name.ok_or_else(|| ForumError::Api {
            action: "submit",
            message: "response carried no post name".to_string(),
        })?;
        info!(post = %name, url = ?data.url, "Submitted match thread");
        Ok(PostId(name))
    }

    #[instrument(level = "info", skip(self, body), fields(bytes = body.len()))]
    async fn edit(&self, post: &PostId, body: &str) -> Result<(), ForumError> {
        match self
            .call(
                "edit",
                "/api/editusertext",
                &[("api_type", "json"), ("thing_id", post.0.as_str()), ("text", body)],
            )
            .await
        {
            Ok(_) => {
                info!("Edited match thread");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Edit failed");
                Err(e)
            }
        }
    }
}

/// Prints posts to stdout instead of publishing them.
#[derive(Debug, Default)]
pub struct DryRunForum {
    submitted: Cell<u32>,
}

impl Forum for DryRunForum {
    async fn submit(&self, community: &str, title: &str, body: &str) -> Result<PostId, ForumError> {
        let n = self.submitted.get() + 1;
        self.submitted.set(n);
        let id = PostId(format!("dry-run-{}", n));
        info!(%community, post = %id, "Dry run: not submitting");
        println!("r/{} :: {}\n\n{}", community, title, body);
        Ok(id)
    }

    async fn edit(&self, post: &PostId, body: &str) -> Result<(), ForumError> {
        info!(%post, "Dry run: not editing");
        println!("{}", body);
        Ok(())
    }
}
