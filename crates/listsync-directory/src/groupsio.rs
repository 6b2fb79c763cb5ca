//! Groups.io backend.
//!
//! The session is a cookie (kept by the client's cookie store) plus the
//! csrf token returned by `/login`. Both are established once in
//! [`GroupsIoClient::login`] and are read-only afterwards.
//!
//! Identifiers travel as query parameters. They are url-encoded, so the `+`
//! separating `parent+child` is sent as `%2B`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use listsync_settings::{Credentials, RemoteSettings};

use crate::api::DirectoryApi;
use crate::errors::DirectoryError;
use crate::types::{MemberEntry, Page, SubgroupEntry, decode_response};

const USER_AGENT: &str = concat!("listsync/", env!("CARGO_PKG_VERSION"));

/// Authenticated Groups.io client.
pub struct GroupsIoClient {
    http: reqwest::Client,
    base_url: String,
    page_size: u32,
    csrf: SecretString,
}

impl std::fmt::Debug for GroupsIoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupsIoClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    user: LoginUser,
}

#[derive(Deserialize)]
struct LoginUser {
    csrf_token: String,
}

impl GroupsIoClient {
    /// Establish a session with `credentials`.
    #[instrument(skip_all, fields(user = %credentials.username))]
    pub async fn login(
        remote: &RemoteSettings,
        credentials: &Credentials,
    ) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(remote.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        let base_url = remote.api_url.trim_end_matches('/').to_string();

        let resp = http
            .post(format!("{base_url}/login"))
            .form(&[
                ("email", credentials.username.as_str()),
                ("password", credentials.password.expose_secret()),
            ])
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        let login: LoginResponse = decode_response(status, &body).map_err(|e| match e {
            DirectoryError::Api { kind } => DirectoryError::Login(kind),
            DirectoryError::Status { status, .. } => DirectoryError::Login(format!("status {status}")),
            other => other,
        })?;

        debug!("session established");
        Ok(Self {
            http,
            base_url,
            page_size: remote.page_size,
            csrf: SecretString::from(login.user.csrf_token),
        })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DirectoryError> {
        let resp = self
            .http
            .post(format!("{}/{endpoint}", self.base_url))
            .query(query)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        decode_response(status, &body)
    }

    async fn page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        name: &str,
        cursor: Option<&str>,
    ) -> Result<Page<T>, DirectoryError> {
        let limit = self.page_size.to_string();
        let mut query = vec![("group_name", name), ("limit", limit.as_str())];
        if let Some(token) = cursor {
            query.push(("page_token", token));
        }
        self.post(endpoint, &query).await
    }
}

#[async_trait]
impl DirectoryApi for GroupsIoClient {
    #[instrument(skip_all, fields(group = %group, cursor = ?cursor))]
    async fn subgroups_page(
        &self,
        group: &str,
        cursor: Option<&str>,
    ) -> Result<Page<SubgroupEntry>, DirectoryError> {
        self.page("getsubgroups", group, cursor).await
    }

    #[instrument(skip_all, fields(list = %list, cursor = ?cursor))]
    async fn members_page(
        &self,
        list: &str,
        cursor: Option<&str>,
    ) -> Result<Page<MemberEntry>, DirectoryError> {
        self.page("getmembers", list, cursor).await
    }

    #[instrument(skip_all, fields(list = %list))]
    async fn direct_add(&self, group: &str, list: &str, entry: &str) -> Result<(), DirectoryError> {
        let _: serde_json::Value = self
            .post(
                "directadd",
                &[
                    ("group_name", group),
                    ("subgroupnames", list),
                    ("emails", entry),
                    ("csrf", self.csrf.expose_secret()),
                ],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(list = %list, count = emails.len()))]
    async fn bulk_remove(&self, list: &str, emails: &[String]) -> Result<(), DirectoryError> {
        let joined = emails.join("\n");
        let _: serde_json::Value = self
            .post(
                "bulkremovemembers",
                &[
                    ("group_name", list),
                    ("emails", joined.as_str()),
                    ("csrf", self.csrf.expose_secret()),
                ],
            )
            .await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
