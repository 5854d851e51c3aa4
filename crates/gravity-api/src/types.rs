use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use gravity_core::error::GravityError;

/// Set on a response whose body was substituted after a store failure.
pub const STORE_DEGRADED_HEADER: &str = "x-store-degraded";

/// `?address=` for exact lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressQuery {
    pub address: String,
}

/// `?public_key=` for exact lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicKeyQuery {
    pub public_key: String,
}

/// Optional `?public_key=` filter for per-node lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeFilterQuery {
    pub public_key: Option<String>,
}

/// A JSON body, possibly standing in for a failed read.
#[derive(Debug)]
pub struct Reply<T> {
    pub body: T,
    pub degraded: bool,
}

impl<T: Default> Reply<T> {
    /// Unwrap a store result; on error log it and answer with `T::default()`.
    pub fn from_store(route: &str, result: Result<T, GravityError>) -> Self {
        match result {
            Ok(body) => Self { body, degraded: false },
            Err(e) => {
                error!(route, error = %e, "store read failed; serving empty body");
                Self { body: T::default(), degraded: true }
            }
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let mut resp = Json(self.body).into_response();
        if self.degraded {
            resp.headers_mut().insert(
                HeaderName::from_static(STORE_DEGRADED_HEADER),
                HeaderValue::from_static("true"),
            );
        }
        resp
    }
}
