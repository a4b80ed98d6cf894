use crate::{downstream::StdError, metric::Category};

/// Why an export cycle did not deliver.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A metric was asked for a field its kind does not have.
    #[error("cannot read `{field}` from {category} metric `{metric}`")]
    Extraction {
        /// Registered name of the metric
        metric: String,
        /// The metric's kind
        category: Category,
        /// The field that was requested
        field: &'static str,
    },
    /// A metric read NaN or an infinity. JSON has no way to carry it.
    #[error("`{field}` of {category} metric `{metric}` is {value}, which cannot be exported")]
    NonFinite {
        /// Registered name of the metric
        metric: String,
        /// The metric's kind
        category: Category,
        /// The field that was read
        field: &'static str,
        /// What it read
        value: f64,
    },
    /// The batch could not be encoded.
    #[error("failed to serialize datapoints: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The transport did not accept the batch.
    #[error("failed to deliver datapoints: {0}")]
    Delivery(#[source] StdError),
}

/// Why a reporter component could not be constructed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The endpoint is not a usable uri
    #[error("invalid endpoint `{endpoint}`: {source}")]
    Endpoint {
        /// The configured endpoint
        endpoint: String,
        /// What was wrong with it
        #[source]
        source: <hyper::Uri as std::str::FromStr>::Err,
    },
    /// The endpoint parses, but is not just a scheme and a host
    #[error("endpoint `{endpoint}` must be http(s)://host[:port] with no path or query")]
    EndpointShape {
        /// The configured endpoint
        endpoint: String,
    },
    /// TLS could not be set up
    #[error("tls configuration: {0}")]
    Tls(#[from] tokio_rustls::rustls::Error),
}
