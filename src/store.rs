//! Remote store abstraction and its PostgREST/Supabase implementation.
//!
//! The upload sequence only needs four operations, captured by
//! [`RemoteStore`]. [`SupabaseStore`] speaks the PostgREST dialect exposed by
//! Supabase at `{base}/rest/v1/{table}`; tests substitute an in-memory store.
//!
//! No call is retried. A failed request surfaces as
//! [`PaperError::RemoteRequest`] (transport) or [`PaperError::RemoteStatus`]
//! (non-2xx answer) and aborts whatever sequence issued it.

use crate::config::UploadConfig;
use crate::error::PaperError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const PREFER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";

/// A row as returned by the store.
pub type Record = serde_json::Map<String, Value>;

/// Primary key of a stored row: a number or a string (e.g. a UUID).
///
/// Kept as the raw JSON value so it is written back with the same type,
/// and displayed without quotes for filters and log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId(Value);

impl RecordId {
    /// Extract the `id` column of a record.
    pub fn from_record(record: &Record) -> Option<Self> {
        match record.get("id")? {
            v @ (Value::Number(_) | Value::String(_)) => Some(Self(v.clone())),
            _ => None,
        }
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(Value::from(id))
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(Value::from(id))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

/// The four operations the upload sequence needs from a backend.
pub trait RemoteStore {
    /// The row of `table` whose `slug` column equals `slug`, if any.
    fn find_by_slug(
        &self,
        table: &str,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Record>, PaperError>> + Send;

    /// Insert one or more rows (`payload` is an object or an array) and
    /// return the stored rows.
    fn insert(
        &self,
        table: &str,
        payload: Value,
    ) -> impl Future<Output = Result<Vec<Record>, PaperError>> + Send;

    /// Patch the row with primary key `id` and return it.
    fn update(
        &self,
        table: &str,
        id: &RecordId,
        payload: Value,
    ) -> impl Future<Output = Result<Record, PaperError>> + Send;

    /// Delete every row of `table` whose `column` equals `value`.
    fn delete_where(
        &self,
        table: &str,
        column: &str,
        value: &RecordId,
    ) -> impl Future<Output = Result<(), PaperError>> + Send;
}

/// [`RemoteStore`] over the Supabase REST (PostgREST) API.
pub struct SupabaseStore {
    client: reqwest::Client,
    rest_url: String,
}

impl fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("rest_url", &self.rest_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseStore {
    /// Build a client that authenticates every request with the service key.
    pub fn new(config: &UploadConfig) -> Result<Self, PaperError> {
        let client = reqwest::Client::builder()
            .default_headers(auth_headers(&config.service_key)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaperError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            rest_url: rest_url(&config.base_url),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
    }

    fn select_by_slug(&self, table: &str, slug: &str) -> RequestBuilder {
        let slug_filter = eq(slug);
        self.request(Method::GET, table).query(&[
            ("select", "id"),
            ("slug", slug_filter.as_str()),
            ("limit", "1"),
        ])
    }

    fn insert_rows(&self, table: &str, payload: &Value) -> RequestBuilder {
        self.request(Method::POST, table)
            .header(PREFER, RETURN_REPRESENTATION)
            .json(payload)
    }

    fn update_by_id(&self, table: &str, id: &RecordId, payload: &Value) -> RequestBuilder {
        self.request(Method::PATCH, table)
            .query(&[("id", eq(&id.to_string()))])
            .header(PREFER, RETURN_REPRESENTATION)
            .json(payload)
    }

    fn delete_matching(&self, table: &str, column: &str, value: &RecordId) -> RequestBuilder {
        self.request(Method::DELETE, table)
            .query(&[(column, eq(&value.to_string()))])
    }

    /// Send `req` and decode the JSON array PostgREST answers with.
    async fn send_rows(
        &self,
        operation: &'static str,
        table: &str,
        req: RequestBuilder,
    ) -> Result<Vec<Record>, PaperError> {
        let response = send(operation, table, req).await?;
        response
            .json::<Vec<Record>>()
            .await
            .map_err(|e| PaperError::UnexpectedResponse {
                operation,
                table: table.to_string(),
                detail: e.to_string(),
            })
    }
}

impl RemoteStore for SupabaseStore {
    async fn find_by_slug(&self, table: &str, slug: &str) -> Result<Option<Record>, PaperError> {
        let req = self.select_by_slug(table, slug);
        let rows = self.send_rows("select", table, req).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, table: &str, payload: Value) -> Result<Vec<Record>, PaperError> {
        let req = self.insert_rows(table, &payload);
        self.send_rows("insert", table, req).await
    }

    async fn update(
        &self,
        table: &str,
        id: &RecordId,
        payload: Value,
    ) -> Result<Record, PaperError> {
        let req = self.update_by_id(table, id, &payload);
        self.send_rows("update", table, req)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PaperError::UnexpectedResponse {
                operation: "update",
                table: table.to_string(),
                detail: format!("no row with id {id}"),
            })
    }

    async fn delete_where(
        &self,
        table: &str,
        column: &str,
        value: &RecordId,
    ) -> Result<(), PaperError> {
        let req = self.delete_matching(table, column, value);
        send("delete", table, req).await?;
        Ok(())
    }
}

/// Headers sent with every request: the key as `apikey` and as bearer token.
fn auth_headers(service_key: &str) -> Result<HeaderMap, PaperError> {
    let invalid =
        |_| PaperError::InvalidConfig("Service key contains invalid header characters".into());
    let mut headers = HeaderMap::new();
    headers.insert("apikey", HeaderValue::from_str(service_key).map_err(invalid)?);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {service_key}")).map_err(invalid)?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// `{base}/rest/v1`, tolerating a trailing slash on the base URL.
pub fn rest_url(base_url: &str) -> String {
    format!("{}/rest/v1", base_url.trim_end_matches('/'))
}

/// PostgREST equality filter value.
fn eq(value: &str) -> String {
    format!("eq.{value}")
}

async fn send(
    operation: &'static str,
    table: &str,
    req: RequestBuilder,
) -> Result<reqwest::Response, PaperError> {
    let response = req.send().await.map_err(|e| PaperError::RemoteRequest {
        operation,
        table: table.to_string(),
        source: e,
    })?;

    let status = response.status();
    debug!("{} {} → HTTP {}", operation, table, status.as_u16());
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PaperError::RemoteStatus {
            operation,
            table: table.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
