use std::{str::FromStr, sync::Arc, time::Duration};

use bytes::Bytes;
use futures::future::BoxFuture;
use http_body_util::Full;
use hyper::Uri;
use hyper_util::{client::legacy::connect::HttpConnector, rt::TokioExecutor};
use tokio_rustls::rustls::{crypto::aws_lc_rs, ClientConfig, RootCertStore};

use crate::ConfigError;

use super::{DeliveryRequest, StdError, Transport};

type ClientType = hyper_util::client::legacy::Client<
    hyper_rustls::HttpsConnector<HttpConnector>,
    Full<Bytes>,
>;

/// The webpki trust roots. This is what [`HttpTransport::new`] trusts.
pub fn default_trust() -> RootCertStore {
    RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    }
}

/// Posts to a SignalFx ingest host over http or https.
pub struct HttpTransport {
    client: ClientType,
    endpoint: String,
    timeout: Duration,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTransport {
    /// Connect to `endpoint`, like `https://ingest.us0.signalfx.com`, trusting the webpki roots.
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        Self::with_trust(endpoint, default_trust())
    }

    /// Connect to `endpoint` trusting only `trust`.
    pub fn with_trust(endpoint: &str, trust: RootCertStore) -> Result<Self, ConfigError> {
        let uri = Uri::from_str(endpoint).map_err(|source| ConfigError::Endpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let scheme_and_host = matches!(uri.scheme_str(), Some("http" | "https"))
            && uri.authority().is_some()
            && matches!(uri.path(), "" | "/")
            && uri.query().is_none();
        if !scheme_and_host {
            return Err(ConfigError::EndpointShape {
                endpoint: endpoint.to_string(),
            });
        }

        let tls = ClientConfig::builder_with_provider(Arc::new(aws_lc_rs::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_root_certificates(trust)
            .with_no_client_auth();

        Ok(Self {
            client: get_client(tls),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        })
    }

    /// How long one post may take, including connecting (default 30s)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(&self, request: DeliveryRequest) -> Result<(), StdError> {
        let uri = Uri::from_str(&format!("{}{}", self.endpoint, request.path))?;
        let mut builder = hyper::Request::post(uri);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        let http_request = builder.body(Full::new(request.body))?;

        let response = tokio::time::timeout(self.timeout, self.client.request(http_request)).await??;
        let status = response.status();
        log::debug!("ingest responded {status}");
        if !status.is_success() {
            return Err(format!("ingest responded {status}").into());
        }
        Ok(())
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: DeliveryRequest) -> BoxFuture<'_, Result<(), StdError>> {
        Box::pin(self.send(request))
    }
}

fn get_client(tls: ClientConfig) -> ClientType {
    let mut http_connector = HttpConnector::new();
    http_connector.enforce_http(false);
    let https_connector = tower::ServiceBuilder::new()
        .layer_fn(move |http_connector| {
            let tls = tls.clone();

            hyper_rustls::HttpsConnectorBuilder::new()
                .with_tls_config(tls)
                .https_or_http()
                .enable_http1()
                .wrap_connector(http_connector)
        })
        .service(http_connector);

    hyper_util::client::legacy::Client::builder(TokioExecutor::new()).build(https_connector)
}
