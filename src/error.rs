//! # Error Taxonomy
//!
//! Three failure classes with distinct propagation policies:
//!
//! - [`TransportError`]: network or HTTP-status failure during a fetch.
//!   Retried up to the bounded limit inside [`crate::fetch`]; exhausted
//!   retries propagate to the caller.
//! - [`ProviderError`]: malformed/unexpected JSON or an empty tide dataset.
//!   Never retried by the client; the cycle runner maps it to the
//!   full-screen error panel and re-runs the whole cycle after a fixed
//!   delay.
//! - [`AssetError`]: missing or undecodable icon/template file. Fatal for
//!   the process, since rendering itself cannot proceed and a missing asset
//!   is a packaging defect rather than a transient condition.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Network or HTTP-status failure during a GET.
#[derive(Error, Debug)]
#[error("transport: {0}")]
pub struct TransportError(#[from] pub reqwest::Error);

/// Upstream response that could be fetched but not understood.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The fetch itself failed after all retries
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response body did not match the expected shape
    #[error("malformed {provider} response: {detail}")]
    Malformed {
        provider: &'static str,
        detail: String,
    },

    /// Response parsed but contained no usable records
    #[error("empty {provider} dataset")]
    Empty { provider: &'static str },

    /// The provider answered with an explicit error message
    #[error("{provider} rejected request: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },
}

/// Missing or undecodable file asset (template, icon, preview target).
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("asset {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
