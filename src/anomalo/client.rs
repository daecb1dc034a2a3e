use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::credentials::Credentials;
use super::models::{ChecksResponse, PingResponse, TableInformation};

const API_PREFIX: &str = "api/public/v1/";
const TOKEN_HEADER: &str = "X-Anomalo-Token";

/// The slice of the Anomalo public API the bootstrap run needs
pub trait AnomaloApi: Send + Sync {
    fn ping(&self) -> Result<PingResponse>;

    fn get_table_information(&self, table_name: &str) -> Result<TableInformation>;

    fn get_checks_for_table(&self, table_id: i64) -> Result<ChecksResponse>;
}

/// Transport under the Anomalo client, swappable in tests
pub trait HttpClient: Send + Sync {
    /// GET `url` with the API token header and return the body of a 2xx response
    fn get(&self, url: &Url, token: &str) -> Result<String>;
}

/// Real HTTP client using reqwest
pub struct ReqwestClient {
    http: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        // Requests wait as long as the Anomalo instance takes to answer
        let http = Client::builder()
            .timeout(None)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &Url, token: &str) -> Result<String> {
        let response = self
            .http
            .get(url.clone())
            .header(TOKEN_HEADER, token)
            .send()
            .with_context(|| format!("Failed to fetch URL: {}", url))?;

        if !response.status().is_success() {
            bail!(
                "HTTP request failed with status {}: {}",
                response.status(),
                url
            );
        }

        response
            .text()
            .with_context(|| format!("Failed to read response body from: {}", url))
    }
}

/// Blocking client for the Anomalo public API
pub struct AnomaloClient<H: HttpClient> {
    base_url: Url,
    api_token: String,
    http_client: H,
}

impl AnomaloClient<ReqwestClient> {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        Self::with_client(credentials, ReqwestClient::new()?)
    }
}

impl<H: HttpClient> AnomaloClient<H> {
    pub fn with_client(credentials: &Credentials, http_client: H) -> Result<Self> {
        Ok(Self {
            base_url: api_base_url(&credentials.host)?,
            api_token: credentials.api_token.clone(),
            http_client,
        })
    }

    #[cfg(test)]
    pub fn http_client(&self) -> &H {
        &self.http_client
    }

    fn endpoint_url(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(endpoint)
            .with_context(|| format!("Invalid API endpoint: {}", endpoint))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint_url(endpoint, query)?;

        log::debug!("GET {}", url);

        let body = self.http_client.get(&url, &self.api_token)?;

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse response from {}: {}", url, body))
    }
}

impl<H: HttpClient> AnomaloApi for AnomaloClient<H> {
    fn ping(&self) -> Result<PingResponse> {
        self.get("ping", &[])
    }

    fn get_table_information(&self, table_name: &str) -> Result<TableInformation> {
        self.get(
            "get_table_information",
            &[("table_name", table_name.to_string())],
        )
    }

    fn get_checks_for_table(&self, table_id: i64) -> Result<ChecksResponse> {
        self.get("get_checks_for_table", &[("table_id", table_id.to_string())])
    }
}

/// `<host>/api/public/v1/`, with `https://` assumed when the host has no scheme
pub fn api_base_url(host: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };

    let base = Url::parse(&format!("{}/", with_scheme))
        .with_context(|| format!("Invalid anomalo host: {}", host))?;

    base.join(API_PREFIX)
        .with_context(|| format!("Invalid anomalo host: {}", host))
}

/// Canned HTTP responses keyed by full URL
#[cfg(test)]
pub struct MockHttpClient {
    responses: std::collections::HashMap<String, String>,
    errors: std::collections::HashMap<String, String>,
    requests: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: std::collections::HashMap::new(),
            errors: std::collections::HashMap::new(),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_error(mut self, url: &str, message: &str) -> Self {
        self.errors.insert(url.to_string(), message.to_string());
        self
    }

    /// `(url, token)` pairs in request order
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl HttpClient for MockHttpClient {
    fn get(&self, url: &Url, token: &str) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), token.to_string()));

        if let Some(message) = self.errors.get(url.as_str()) {
            bail!("{}", message);
        }
        match self.responses.get(url.as_str()) {
            Some(body) => Ok(body.clone()),
            None => bail!("HTTP request failed with status 404 Not Found: {}", url),
        }
    }
}

/// In-memory Anomalo API for tests
#[cfg(test)]
pub struct MockAnomaloClient {
    pub ping_response: PingResponse,
    tables: std::collections::HashMap<String, TableInformation>,
    checks: std::collections::HashMap<i64, ChecksResponse>,
    failing_tables: Vec<String>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockAnomaloClient {
    pub fn new() -> Self {
        Self {
            ping_response: PingResponse {
                ping: Some("pong".to_string()),
            },
            tables: std::collections::HashMap::new(),
            checks: std::collections::HashMap::new(),
            failing_tables: Vec::new(),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Register a table under `name` in warehouse `warehouse`
    pub fn with_table(mut self, name: &str, id: i64, warehouse: &str, full_name: &str) -> Self {
        self.tables.insert(
            name.to_string(),
            TableInformation {
                id: Some(id),
                warehouse: Some(super::models::Warehouse {
                    id: Some(1),
                    name: Some(warehouse.to_string()),
                }),
                full_name: Some(full_name.to_string()),
            },
        );
        self
    }

    /// `(check_id, check_static_id, check_type)` triples for `table_id`
    pub fn with_checks(mut self, table_id: i64, checks: &[(i64, i64, &str)]) -> Self {
        self.checks.insert(
            table_id,
            ChecksResponse {
                checks: Some(
                    checks
                        .iter()
                        .map(|(check_id, static_id, check_type)| {
                            serde_json::json!({
                                "check_id": check_id,
                                "check_static_id": static_id,
                                "check_type": check_type,
                            })
                        })
                        .collect(),
                ),
            },
        );
        self
    }

    /// Raw `checks` entries for `table_id`, malformed ones included
    pub fn with_raw_checks(mut self, table_id: i64, checks: Vec<serde_json::Value>) -> Self {
        self.checks.insert(
            table_id,
            ChecksResponse {
                checks: Some(checks),
            },
        );
        self
    }

    /// Make the lookup for `name` fail at the transport level
    pub fn with_failing_table(mut self, name: &str) -> Self {
        self.failing_tables.push(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockAnomaloClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl AnomaloApi for MockAnomaloClient {
    fn ping(&self) -> Result<PingResponse> {
        self.calls.lock().unwrap().push("ping".to_string());
        Ok(self.ping_response.clone())
    }

    fn get_table_information(&self, table_name: &str) -> Result<TableInformation> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_table_information {}", table_name));

        if self.failing_tables.iter().any(|t| t == table_name) {
            bail!("HTTP request failed with status 500 Internal Server Error");
        }

        // Unknown tables come back as an error payload without an id
        Ok(self.tables.get(table_name).cloned().unwrap_or_default())
    }

    fn get_checks_for_table(&self, table_id: i64) -> Result<ChecksResponse> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_checks_for_table {}", table_id));
        Ok(self.checks.get(&table_id).cloned().unwrap_or_default())
    }
}
