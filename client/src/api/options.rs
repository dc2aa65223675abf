//! Per-request options.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::Serialize;

use crate::errors::ClientError;

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(crate) method: Method,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) headers: HeaderMap,
    pub(crate) skip_auth: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for endpoints that must not carry a token and must not
    /// trigger a refresh: login, register, refresh and public reads.
    pub fn public() -> Self {
        Self::new().skip_auth()
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn is_public(&self) -> bool {
        self.skip_auth
    }
}
