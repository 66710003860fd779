// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Promise-returning entry point (`fetch`).

use std::future::Future;
use std::pin::Pin;

use reqwest::{Client, Method, Response};

use super::Observed;
use crate::error::FetchError;
use crate::types::{ApiKind, RequestInfo, RequestInit, DEFAULT_METHOD};

/// A function that starts a request and returns its pending result.
///
/// `fetch` itself must not wait for the request: whatever it returns is what
/// the caller awaits.
pub trait Fetch {
    type Pending;

    fn fetch(&self, input: RequestInfo, init: Option<RequestInit>) -> Self::Pending;
}

impl<F: Fetch> Fetch for Observed<F> {
    type Pending = F::Pending;

    fn fetch(&self, input: RequestInfo, init: Option<RequestInit>) -> Self::Pending {
        let method = init
            .as_ref()
            .and_then(|init| init.method.as_deref())
            .unwrap_or(DEFAULT_METHOD);
        self.notify(ApiKind::Fetch, method, input.url());
        self.original().fetch(input, init)
    }
}

/// Pending response of [`ReqwestFetch`].
pub type ResponseFuture = Pin<Box<dyn Future<Output = Result<Response, FetchError>> + Send>>;

/// [`Fetch`] over a `reqwest::Client`.
///
/// Wrap it with [`wrap`](super::wrap) or install it through
/// [`NetworkApis`](super::NetworkApis) to observe a reqwest-based host.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetch {
    client: Client,
}

impl ReqwestFetch {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Fetch for ReqwestFetch {
    type Pending = ResponseFuture;

    fn fetch(&self, input: RequestInfo, init: Option<RequestInit>) -> ResponseFuture {
        let client = self.client.clone();

        Box::pin(async move {
            let url = input.url();
            let (mut method, mut headers, mut body) = match input {
                RequestInfo::Request(request) => (request.method, request.headers, request.body),
                _ => (None, Vec::new(), None),
            };

            if let Some(init) = init {
                if init.method.is_some() {
                    method = init.method;
                }
                headers.extend(init.headers);
                if init.body.is_some() {
                    body = init.body;
                }
            }

            let method = parse_method(method.as_deref().unwrap_or(DEFAULT_METHOD))?;
            let mut builder = client.request(method, &url);
            for (name, value) in headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = body {
                builder = builder.body(body);
            }

            Ok(builder.send().await?)
        })
    }
}

/// Parse a method name, upper-casing the standard ones the way `fetch` does.
fn parse_method(name: &str) -> Result<Method, FetchError> {
    const NORMALIZED: [&str; 6] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];

    let upper = name.to_ascii_uppercase();
    let name = if NORMALIZED.contains(&upper.as_str()) {
        upper.as_str()
    } else {
        name
    };

    Method::from_bytes(name.as_bytes()).map_err(|_| FetchError::InvalidMethod(name.to_string()))
}
