//! REST client for named backend resources.
//!
//! Paths follow the backend's collection conventions:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `list` | `GET /{resource}/` |
//! | `retrieve` | `GET /{resource}/{id}/` |
//! | `create` | `POST /{resource}/` |
//! | `update` (replace) | `PUT /{resource}` |
//! | `update` (patch) | `PATCH /{resource}/{id}/` |
//! | `remove` | `DELETE /{resource}/{id}/` |
//! | `fetch_schema` | `GET /json-schemas/{resource}` |
//! | `fetch_selectable_enum_values` | `GET /{resource}/enum-values/` |
//!
//! Every failure is returned as a [`ClientError`] built by [`normalize`].
//! No retries are performed here.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::normalize::{normalize, Failure};
use crate::types::{
    ClientConfig, EnumValue, ListValue, Record, SchemaDefinition, UpdateStrategy,
};

/// Kind reported for a base URL that cannot be used.
pub const INVALID_URL_KIND: &str = "invalid_url";
/// Kind reported when a success body does not have the expected shape.
pub const DECODE_ERROR_KIND: &str = "decode_error";
/// Kind reported when a request cannot be built or the client cannot start.
pub const REQUEST_ERROR_KIND: &str = "request_error";
/// Kind reported when a patch update is attempted on a record without `id`.
pub const MISSING_ID_KIND: &str = "missing_id";

const SCHEMA_COLLECTION: &str = "json-schemas";
const ENUM_VALUES_SEGMENT: &str = "enum-values";

/// Client for the resource endpoints of one backend.
///
/// Cheap to clone and safe to share across threads; independent operations
/// may be issued concurrently.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    base_url: Url,
    http: Client,
    update_strategy: UpdateStrategy,
}

impl ResourceClient {
    /// Build a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Fails with kind `invalid_url` if the base URL does not parse or cannot
    /// carry a path, and with kind `request_error` if the HTTP client cannot
    /// be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            fault(
                INVALID_URL_KIND,
                format!("invalid base URL '{}': {}", config.base_url, e),
            )
            .with_source(e)
        })?;
        if base_url.cannot_be_a_base() {
            return Err(fault(
                INVALID_URL_KIND,
                format!("base URL '{}' cannot carry a path", config.base_url),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| fault(REQUEST_ERROR_KIND, e.to_string()).with_source(e))?;

        Ok(Self {
            base_url,
            http,
            update_strategy: config.update_strategy,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn update_strategy(&self) -> UpdateStrategy {
        self.update_strategy
    }

    /// List the records of a resource, with optional query parameters.
    pub fn list(
        &self,
        resource: &str,
        query: &[(String, String)],
    ) -> Result<Vec<Record>, ClientError> {
        let url = self.endpoint(&[resource], true)?;
        self.fetch(self.http.get(url).query(query))
    }

    /// List a resource as summary rows, sorted by title.
    pub fn list_summaries(
        &self,
        resource: &str,
        query: &[(String, String)],
    ) -> Result<Vec<ListValue>, ClientError> {
        let url = self.endpoint(&[resource], true)?;
        let mut rows: Vec<ListValue> = self.fetch(self.http.get(url).query(query))?;
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    /// Fetch one record.
    ///
    /// An empty `id` resolves to `None` without touching the network.
    pub fn retrieve(&self, resource: &str, id: &str) -> Result<Option<Record>, ClientError> {
        if id.is_empty() {
            return Ok(None);
        }
        let url = self.endpoint(&[resource, id], true)?;
        self.fetch(self.http.get(url)).map(Some)
    }

    /// Create a record; any `id` in `data` is left out of the request body.
    ///
    /// Returns the stored record, including its server-assigned `id`.
    pub fn create(&self, resource: &str, data: &Record) -> Result<Record, ClientError> {
        let body: Record = data
            .iter()
            .filter(|(key, _)| key.as_str() != "id")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let url = self.endpoint(&[resource], true)?;
        self.fetch(self.http.post(url).json(&body))
    }

    /// Send an edited record back using the configured [`UpdateStrategy`].
    ///
    /// # Errors
    ///
    /// With [`UpdateStrategy::Patch`], a record without an `id` fails with kind
    /// `missing_id` before any request is sent.
    pub fn update(&self, resource: &str, data: &Record) -> Result<Record, ClientError> {
        match self.update_strategy {
            UpdateStrategy::Replace => {
                let url = self.endpoint(&[resource], false)?;
                self.fetch(self.http.put(url).json(data))
            }
            UpdateStrategy::Patch => {
                let id = record_id(data).ok_or_else(|| {
                    fault(MISSING_ID_KIND, "cannot patch a record without an id")
                })?;
                let url = self.endpoint(&[resource, &id], true)?;
                self.fetch(self.http.patch(url).json(data))
            }
        }
    }

    /// Delete a record. Any response body is ignored.
    pub fn remove(&self, resource: &str, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&[resource, id], true)?;
        self.execute(self.http.delete(url)).map(|_| ())
    }

    /// Fetch the data schema and UI hints of a resource.
    pub fn fetch_schema(&self, resource: &str) -> Result<SchemaDefinition, ClientError> {
        let url = self.endpoint(&[SCHEMA_COLLECTION, resource], false)?;
        self.fetch(self.http.get(url))
    }

    /// Fetch the `{const, title}` choices that reference a resource's records.
    pub fn fetch_selectable_enum_values(
        &self,
        resource: &str,
    ) -> Result<Vec<EnumValue>, ClientError> {
        let url = self.endpoint(&[resource, ENUM_VALUES_SEGMENT], true)?;
        self.fetch(self.http.get(url))
    }

    // --- Internal implementation ---

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str], trailing_slash: bool) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                fault(
                    INVALID_URL_KIND,
                    format!("base URL '{}' cannot carry a path", self.base_url),
                )
            })?;
            path.pop_if_empty().extend(segments);
            if trailing_slash {
                path.push("");
            }
        }
        Ok(url)
    }

    fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let body = self.execute(request)?;
        serde_json::from_str(&body).map_err(|e| {
            fault(DECODE_ERROR_KIND, format!("unexpected response body: {}", e)).with_source(e)
        })
    }

    /// Send a request and return the body of a successful response.
    fn execute(&self, request: RequestBuilder) -> Result<String, ClientError> {
        let request = request
            .build()
            .map_err(|e| fault(REQUEST_ERROR_KIND, e.to_string()).with_source(e))?;
        let method = request.method().clone();
        let url = request.url().clone();
        log::debug!("{} {}", method, url);

        let response = self
            .http
            .execute(request)
            .map_err(|e| no_response(&method, &url, e))?;
        let status = response.status();
        let body = response.text();

        if status.is_success() {
            return body.map_err(|e| no_response(&method, &url, e));
        }

        // A failed status is kept even when its body cannot be read
        let err = match body {
            Ok(body) => normalize(&Failure::Response {
                status: status.as_u16(),
                body,
            }),
            Err(e) => {
                log::debug!("{} {} error body unreadable: {}", method, url, e);
                normalize(&Failure::Response {
                    status: status.as_u16(),
                    body: String::new(),
                })
                .with_source(e)
            }
        };
        log::warn!(
            "{} {} failed with status {} ({})",
            method,
            url,
            err.status(),
            err.kind()
        );
        Err(err)
    }
}

fn fault(kind: &str, message: impl Into<String>) -> ClientError {
    normalize(&Failure::Fault {
        kind: Some(kind.to_string()),
        message: message.into(),
    })
}

fn no_response(method: &Method, url: &Url, source: reqwest::Error) -> ClientError {
    log::warn!("{} {} received no response", method, url);
    log::debug!("transport error: {}", source);
    normalize(&Failure::NoResponse).with_source(source)
}

/// The record's identity as a path segment: a non-empty string or a number.
fn record_id(data: &Record) -> Option<String> {
    match data.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base_url: &str) -> ResourceClient {
        ResourceClient::new(&ClientConfig::new(base_url, 1_000)).unwrap()
    }

    #[test]
    fn endpoints_append_to_base_path() {
        let c = client("http://localhost:8000/api");
        assert_eq!(
            c.endpoint(&["device"], true).unwrap().as_str(),
            "http://localhost:8000/api/device/"
        );
        assert_eq!(
            c.endpoint(&["json-schemas", "device"], false).unwrap().as_str(),
            "http://localhost:8000/api/json-schemas/device"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_not_doubled() {
        let c = client("http://localhost:8000/");
        assert_eq!(
            c.endpoint(&["device", "42"], true).unwrap().as_str(),
            "http://localhost:8000/device/42/"
        );
        assert_eq!(
            c.endpoint(&["device"], false).unwrap().as_str(),
            "http://localhost:8000/device"
        );
    }

    #[test]
    fn segments_are_percent_encoded() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.endpoint(&["device", "a b/c"], true).unwrap().as_str(),
            "http://localhost:8000/device/a%20b%2Fc/"
        );
    }

    #[test]
    fn invalid_base_url() {
        let err = ResourceClient::new(&ClientConfig::new("not a url", 1_000)).unwrap_err();
        assert_eq!(err.kind(), INVALID_URL_KIND);
        assert_eq!(err.status(), -1);

        let err = ResourceClient::new(&ClientConfig::new("mailto:ops@example.com", 1_000))
            .unwrap_err();
        assert_eq!(err.kind(), INVALID_URL_KIND);
    }

    #[test]
    fn record_id_accepts_strings_and_numbers() {
        let as_record = |v: Value| v.as_object().cloned().unwrap();
        assert_eq!(record_id(&as_record(json!({ "id": "abc" }))), Some("abc".into()));
        assert_eq!(record_id(&as_record(json!({ "id": 7 }))), Some("7".into()));
        assert_eq!(record_id(&as_record(json!({ "id": "" }))), None);
        assert_eq!(record_id(&as_record(json!({ "id": null }))), None);
        assert_eq!(record_id(&as_record(json!({}))), None);
    }

    #[test]
    fn patch_without_id_fails_locally() {
        let config = ClientConfig::new("http://127.0.0.1:9", 1_000)
            .update_strategy(UpdateStrategy::Patch);
        let c = ResourceClient::new(&config).unwrap();
        let err = c.update("device", &Record::new()).unwrap_err();
        assert_eq!(err.kind(), MISSING_ID_KIND);
        assert_eq!(err.status(), -1);
    }

    #[test]
    fn client_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ResourceClient>();
    }
}
