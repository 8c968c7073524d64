//! Request assembly: service roots, API prefixes, auth and app headers.

use std::fmt::Display;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use saturn_config::Endpoint;
use saturn_telemetry::RequestOutcome;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::context::ClientContext;
use crate::error::{AjaxError, AjaxResult};
use crate::session::Auth;
use crate::signal::Signal;
use crate::transport::{AjaxRequest, AjaxResponse};

/// Header identifying the calling application.
pub const APP_ID_HEADER: HeaderName = HeaderName::from_static("x-app-id");

const JSON: &str = "application/json";

/// Path prefix every route of `endpoint` lives under.
#[must_use]
pub const fn api_prefix(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Rawls | Endpoint::Rex => "api",
        Endpoint::Agora => "api/v1",
        _ => "",
    }
}

/// Whether every request to `endpoint` carries `X-App-ID`.
#[must_use]
pub const fn sends_app_id(endpoint: Endpoint) -> bool {
    matches!(
        endpoint,
        Endpoint::Sam | Endpoint::Rawls | Endpoint::Agora | Endpoint::Orchestration
    )
}

/// Join a root URL and path parts with single slashes, skipping empty parts.
#[must_use]
pub fn join_url(root: &str, parts: &[&str]) -> String {
    let mut url = root.trim_end_matches('/').to_string();
    for part in parts {
        let part = part.trim_start_matches('/');
        if !part.is_empty() {
            url.push('/');
            url.push_str(part);
        }
    }
    url
}

/// Percent-encode a single path segment, slashes included.
#[must_use]
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// One request under construction.
pub(crate) struct Call<'a> {
    ctx: &'a ClientContext,
    signal: &'a Signal,
    service: &'static str,
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    auth: Auth,
    app_id: bool,
    headers: Vec<(HeaderName, String)>,
    body: Option<Vec<u8>>,
}

impl<'a> Call<'a> {
    pub(crate) fn to_service(
        ctx: &'a ClientContext,
        signal: &'a Signal,
        endpoint: Endpoint,
        method: Method,
        path: &str,
    ) -> Self {
        let root = ctx.config().endpoints.get(endpoint);
        Self {
            ctx,
            signal,
            service: endpoint.as_str(),
            method,
            url: join_url(root, &[api_prefix(endpoint), path]),
            query: Vec::new(),
            auth: Auth::Session,
            app_id: sends_app_id(endpoint),
            headers: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn to_url(ctx: &'a ClientContext, signal: &'a Signal, method: Method, url: &str) -> Self {
        Self {
            ctx,
            signal,
            service: "external",
            method,
            url: url.to_string(),
            query: Vec::new(),
            auth: Auth::Session,
            app_id: false,
            headers: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub(crate) fn with_app_id(mut self) -> Self {
        self.app_id = true;
        self
    }

    pub(crate) fn query(mut self, key: &str, value: impl Display) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub(crate) fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, AjaxError> {
        let bytes = serde_json::to_vec(body).map_err(|source| AjaxError::Encode { source })?;
        Ok(self.body(JSON, bytes))
    }

    pub(crate) fn body(mut self, content_type: &str, bytes: Vec<u8>) -> Self {
        self.headers.push((CONTENT_TYPE, content_type.to_string()));
        self.body = Some(bytes);
        self
    }

    fn build(self) -> Result<AjaxRequest, AjaxError> {
        let mut url = Url::parse(&self.url).map_err(|source| AjaxError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = self.auth.resolve(self.ctx.session())? {
            headers.insert(AUTHORIZATION, header_value("authorization", &format!("Bearer {token}"))?);
        }
        if self.app_id {
            let app_id = &self.ctx.config().app.app_id;
            headers.insert(APP_ID_HEADER, header_value(APP_ID_HEADER.as_str(), app_id)?);
        }
        for (name, value) in &self.headers {
            headers.insert(name.clone(), header_value(name.as_str(), value)?);
        }

        Ok(AjaxRequest {
            service: self.service,
            method: self.method,
            url,
            headers,
            body: self.body,
        })
    }

    /// Dispatch without checking the status.
    pub(crate) async fn send(self) -> AjaxResult<AjaxResponse> {
        let (ctx, signal) = (self.ctx, self.signal);
        let request = self.build()?;
        ctx.dispatcher().dispatch(request, signal).await
    }

    /// Dispatch, rejecting non-2xx responses.
    pub(crate) async fn fetch_ok(self) -> AjaxResult<AjaxResponse> {
        let (ctx, signal) = (self.ctx, self.signal);
        let request = self.build()?;
        ctx.dispatcher().fetch_ok(request, signal).await
    }

    /// Dispatch and decode a JSON body.
    pub(crate) async fn fetch_json<T: DeserializeOwned>(self) -> AjaxResult<T> {
        let (ctx, service) = (self.ctx, self.service);
        let Some(response) = self.fetch_ok().await? else {
            return Ok(None);
        };
        decode(ctx, service, &response).map(Some)
    }

    /// Dispatch and return the body as text.
    pub(crate) async fn fetch_text(self) -> AjaxResult<String> {
        Ok(self.fetch_ok().await?.map(|response| response.text()))
    }
}

/// Decode `response` as JSON, counting failures against `service`.
pub(crate) fn decode<T: DeserializeOwned>(
    ctx: &ClientContext,
    service: &str,
    response: &AjaxResponse,
) -> Result<T, AjaxError> {
    response.json().inspect_err(|_| {
        ctx.metrics().inc_request(service, RequestOutcome::Decode);
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, AjaxError> {
    HeaderValue::from_str(value).map_err(|_| AjaxError::InvalidHeader {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_collapses_duplicate_slashes_and_skips_empty_parts() {
        assert_eq!(
            join_url("http://rawls.test/", &["api", "workspaces"]),
            "http://rawls.test/api/workspaces"
        );
        assert_eq!(
            join_url("http://orch.test", &["", "/api/duos/consent/orsp/7"]),
            "http://orch.test/api/duos/consent/orsp/7"
        );
        assert_eq!(join_url("http://martha.test/resolve", &["", ""]), "http://martha.test/resolve");
    }

    #[test]
    fn prefixes_and_app_header_follow_service() {
        assert_eq!(api_prefix(Endpoint::Agora), "api/v1");
        assert_eq!(api_prefix(Endpoint::Rex), "api");
        assert_eq!(api_prefix(Endpoint::Leo), "");
        assert!(sends_app_id(Endpoint::Orchestration));
        assert!(!sends_app_id(Endpoint::Leo));
        assert!(!sends_app_id(Endpoint::Zendesk));
    }

    #[test]
    fn segments_encode_slashes_and_spaces() {
        assert_eq!(encode_segment("notebooks/My Analysis.ipynb"), "notebooks%2FMy%20Analysis.ipynb");
    }
}
