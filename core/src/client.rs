//! Stateless HTTP request builder and response parser for the operadoras API.
//!
//! # Design
//! `OperadorasClient` holds only the origin URL and carries no mutable state
//! between calls. Each read operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! the core deterministic and free of I/O dependencies.
//!
//! Every parse method shares one outcome policy: a non-2xx status becomes
//! `ApiError::Http` carrying the backend's `detail` text (or `Erro {status}`),
//! an empty 2xx body becomes `Ok(None)`, anything else is parsed as JSON.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Despesa, Estatisticas, ListOptions, Operadora, OperadorasPage};

/// Path prefix every endpoint lives under.
pub const API_BASE: &str = "/api";

/// Characters `encodeURIComponent` leaves untouched, besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `value` for use as a single path segment.
pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Synchronous, stateless client for the operadoras API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct OperadorasClient {
    origin: Url,
}

impl OperadorasClient {
    /// Create a client resolving endpoints against `origin`
    /// (e.g. `http://localhost:8000`). Any path, query or fragment on the
    /// origin is discarded when requests are built.
    pub fn new(origin: &str) -> Result<Self, ApiError> {
        let origin = Url::parse(origin).map_err(|e| ApiError::InvalidUrl(format!("{origin}: {e}")))?;
        if !matches!(origin.scheme(), "http" | "https") || origin.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{origin}: expected an absolute http(s) URL"
            )));
        }
        Ok(Self { origin })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn build_list_operadoras(&self, options: &ListOptions) -> HttpRequest {
        let page = options.page.map(|p| p.to_string());
        let limit = options.limit.map(|l| l.to_string());
        self.request(
            "/operadoras",
            &[
                ("page", page.as_deref()),
                ("limit", limit.as_deref()),
                ("q", options.q.as_deref()),
            ],
        )
    }

    pub fn build_get_operadora(&self, cnpj: &str) -> HttpRequest {
        self.request(&format!("/operadoras/{}", encode_segment(cnpj)), &[])
    }

    pub fn build_get_despesas(&self, cnpj: &str) -> HttpRequest {
        self.request(&format!("/operadoras/{}/despesas", encode_segment(cnpj)), &[])
    }

    pub fn build_get_estatisticas(&self) -> HttpRequest {
        self.request("/estatisticas", &[])
    }

    pub fn parse_list_operadoras(&self, response: HttpResponse) -> Result<Option<OperadorasPage>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_operadora(&self, response: HttpResponse) -> Result<Option<Operadora>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_despesas(&self, response: HttpResponse) -> Result<Option<Vec<Despesa>>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_estatisticas(&self, response: HttpResponse) -> Result<Option<Estatisticas>, ApiError> {
        parse_json(response)
    }

    /// Parse any response into untyped JSON, with the same status handling
    /// as the typed parse methods.
    pub fn parse_json_value(&self, response: HttpResponse) -> Result<Option<Value>, ApiError> {
        parse_json(response)
    }

    /// Resolve `API_BASE` + `suffix` against the origin and attach every
    /// query parameter that is present and non-blank, in order.
    fn request(&self, suffix: &str, params: &[(&str, Option<&str>)]) -> HttpRequest {
        let mut url = self.origin.clone();
        url.set_path(&format!("{API_BASE}{suffix}"));
        url.set_query(None);
        url.set_fragment(None);

        let present: Vec<(&str, &str)> = params
            .iter()
            .filter_map(|&(key, value)| value.filter(|v| !v.trim().is_empty()).map(|v| (key, v)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }

        HttpRequest {
            url: url.into(),
            headers: Vec::new(),
        }
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<Option<T>, ApiError> {
    check_status(&response)?;
    if response.body.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&response.body)?))
}

/// Map non-success status codes to `ApiError::Http`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        message: error_message(response),
    })
}

/// The backend's `detail` text when usable, `Erro {status}` otherwise.
fn error_message(response: &HttpResponse) -> String {
    let detail = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| body.get("detail").cloned());

    match detail {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(other @ (Value::Array(_) | Value::Object(_))) => other.to_string(),
        _ => format!("Erro {}", response.status),
    }
}
