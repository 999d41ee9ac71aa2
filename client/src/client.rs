//! Async executor over the sans-IO core.

use operadoras_core::{
    Despesa, Estatisticas, HttpRequest, HttpResponse, ListOptions, Operadora, OperadorasClient, OperadorasPage,
};

use crate::error::Result;

/// A client for the operadoras API.
///
/// Each method builds the request with [`OperadorasClient`], performs one GET
/// with `reqwest` and hands the response back to the core for parsing.
/// `Ok(None)` means the server answered 2xx with an empty body.
///
/// No timeout, retry or caching is applied: a call suspends until the
/// transport resolves, and concurrent calls complete in whatever order the
/// server answers them.
///
/// ```no_run
/// use operadoras_client::{Client, ListOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("http://localhost:8000")?;
/// let page = client.list_operadoras(&ListOptions::new().query("unimed")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    core: OperadorasClient,
    http: reqwest::Client,
}

impl Client {
    /// Create a client for the API served at `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if `origin` is not an absolute http(s) URL or the
    /// HTTP client cannot be created.
    pub fn new(origin: &str) -> Result<Self> {
        Ok(Self {
            core: OperadorasClient::new(origin)?,
            http: reqwest::Client::builder().build()?,
        })
    }

    /// Use a preconfigured `reqwest::Client`, e.g. one sharing a pool.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn core(&self) -> &OperadorasClient {
        &self.core
    }

    pub async fn list_operadoras(&self, options: &ListOptions) -> Result<Option<OperadorasPage>> {
        let response = self.execute(self.core.build_list_operadoras(options)).await?;
        Ok(self.core.parse_list_operadoras(response)?)
    }

    pub async fn get_operadora(&self, cnpj: &str) -> Result<Option<Operadora>> {
        let response = self.execute(self.core.build_get_operadora(cnpj)).await?;
        Ok(self.core.parse_get_operadora(response)?)
    }

    pub async fn get_despesas(&self, cnpj: &str) -> Result<Option<Vec<Despesa>>> {
        let response = self.execute(self.core.build_get_despesas(cnpj)).await?;
        Ok(self.core.parse_get_despesas(response)?)
    }

    pub async fn get_estatisticas(&self) -> Result<Option<Estatisticas>> {
        let response = self.execute(self.core.build_get_estatisticas()).await?;
        Ok(self.core.parse_get_estatisticas(response)?)
    }

    /// Perform the GET and read the whole body as text. Any status is
    /// returned as data; status interpretation belongs to the core.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.http.get(&request.url).send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(url = %request.url, status, bytes = body.len(), "GET");

        Ok(HttpResponse::new(status, body))
    }
}
