/// HTTP transport for the PassBy[ME] client
/// The client builds [`HttpRequest`]s and classifies [`HttpResponse`]s; a
/// [`Transport`] only moves them over the wire. [`HttpsTransport`] is the
/// mutual-TLS implementation used in production.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Certificate, Identity, Method, StatusCode};

use crate::config::TransportOptions;
use crate::error::{Error, Result};

/// Trust anchor shipped with the library (Microsec e-Szigno roots)
pub const BUNDLED_TRUST_ANCHOR: &[u8] = include_bytes!("../certs/truststore.pem");

/// Request ready to be sent
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Raw response as received, kept for diagnostics in [`Error::Transport`]
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` when the response carried no body at all
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: Option<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }
}

/// Executes one HTTP round trip
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Pooled `reqwest` client presenting a client certificate and trusting
/// only the configured trust anchor
pub struct HttpsTransport {
    client: reqwest::Client,
}

impl HttpsTransport {
    pub fn new(
        certificate: &[u8],
        private_key: &[u8],
        trust_anchor: &[u8],
        options: &TransportOptions,
    ) -> Result<Self> {
        // rustls wants key and certificate chain in one PEM buffer
        let mut identity_pem = Vec::with_capacity(private_key.len() + certificate.len() + 1);
        identity_pem.extend_from_slice(private_key);
        identity_pem.push(b'\n');
        identity_pem.extend_from_slice(certificate);
        let identity = Identity::from_pem(&identity_pem)?;

        let roots = Certificate::from_pem_bundle(trust_anchor)?;
        if roots.is_empty() {
            return Err(Error::invalid_argument(
                "Trust anchor contains no certificates!",
            ));
        }

        let anchor_count = roots.len();
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .identity(identity)
            .tls_built_in_root_certs(false)
            .https_only(true);
        for root in roots {
            builder = builder.add_root_certificate(root);
        }

        let client = options.apply(builder).build()?;
        tracing::debug!("HTTPS transport ready ({} trust anchor(s))", anchor_count);

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpsTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body: (!body.is_empty()).then_some(body),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_CRT: &[u8] = include_bytes!("../tests/fixtures/client.crt");
    const CLIENT_KEY: &[u8] = include_bytes!("../tests/fixtures/client.key");

    #[test]
    fn test_https_transport_builds_with_bundled_anchor() {
        let transport = HttpsTransport::new(
            CLIENT_CRT,
            CLIENT_KEY,
            BUNDLED_TRUST_ANCHOR,
            &TransportOptions::default(),
        );
        assert!(transport.is_ok());
        assert_eq!(Certificate::from_pem_bundle(BUNDLED_TRUST_ANCHOR).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_trust_anchor_is_rejected() {
        let result = HttpsTransport::new(CLIENT_CRT, CLIENT_KEY, b"", &TransportOptions::default());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_garbage_identity_is_a_connection_error() {
        let result = HttpsTransport::new(
            b"not a certificate",
            b"not a key",
            BUNDLED_TRUST_ANCHOR,
            &TransportOptions::default(),
        );
        assert!(matches!(result, Err(Error::Connection(_))));
    }
}
