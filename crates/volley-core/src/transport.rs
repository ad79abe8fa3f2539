use async_trait::async_trait;

use crate::error::TransportError;

/// Everything the dispatcher hands to a transport for one exchange.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// An in-progress response. Status and headers are available up front;
/// the body arrives through repeated `chunk` calls. Dropping the stream
/// aborts the rest of the exchange.
#[async_trait]
pub trait ResponseStream: Send {
    fn code(&self) -> u16;
    fn headers(&self) -> Vec<(String, String)>;
    fn version(&self) -> String;
    /// The next body chunk, or `None` once the body is exhausted.
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// The network seam of the dispatcher. The HTTP implementation lives in
/// [`HttpTransport`]; tests substitute their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest)
    -> Result<Box<dyn ResponseStream>, TransportError>;
}

/// Streaming reqwest client with optional proxy and prior-knowledge h2.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(proxy: Option<&str>, http2: bool) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|error| TransportError::Build(error.to_string()))?;
            builder = builder.proxy(proxy);
        }
        if http2 {
            builder = builder.http2_prior_knowledge();
        }

        let client = builder
            .build()
            .map_err(|error| TransportError::Build(error.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<Box<dyn ResponseStream>, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|error| TransportError::Request(error.to_string()))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| TransportError::Request(error.to_string()))?;

        Ok(Box::new(HttpResponseStream {
            code: response.status().as_u16(),
            headers: response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        String::from_utf8_lossy(value.as_bytes()).to_string(),
                    )
                })
                .collect(),
            version: format!("{:?}", response.version()),
            response,
        }))
    }
}

struct HttpResponseStream {
    code: u16,
    headers: Vec<(String, String)>,
    version: String,
    response: reqwest::Response,
}

#[async_trait]
impl ResponseStream for HttpResponseStream {
    fn code(&self) -> u16 {
        self.code
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    async fn chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.response
            .chunk()
            .await
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .map_err(|error| TransportError::Request(error.to_string()))
    }
}
