//! Scripted transport and context harness shared by the integration suites.
#![allow(dead_code)]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use saturn_ajax::{
    Ajax, AjaxRequest, AjaxResponse, ClientContext, ManualClock, MockSwitch, Session, Signal,
    Transport, TransportError,
};
use saturn_test_support::config_for;
use serde_json::Value;

pub const BASE: &str = "http://saturn.test";
pub const USER_TOKEN: &str = "user-token";

/// What the scripted backend answers for one route.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Text(u16, String),
    Status(u16),
    Hang,
    Fail,
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn after(millis: u64, reply: Self) -> Self {
        Self::Delayed(Duration::from_millis(millis), Box::new(reply))
    }
}

/// Start and end of one exchange, labelled `METHOD /path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(String),
    End(String),
}

struct Route {
    method: Method,
    path: String,
    reply: Reply,
}

/// Transport answering from a route table and recording every exchange.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<AjaxRequest>>,
    events: Mutex<Vec<Event>>,
}

impl ScriptedTransport {
    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Route {
                method,
                path: path.to_string(),
                reply,
            });
        self
    }

    pub fn requests(&self) -> Vec<AjaxRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| &request.method == method && request.url.path() == path)
            .count()
    }

    pub fn only_request(&self) -> AjaxRequest {
        let mut requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.remove(0)
    }

    fn record(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: AjaxRequest) -> Result<AjaxResponse, TransportError> {
        let label = format!("{} {}", request.method, request.url.path());
        let reply = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|route| route.method == request.method && route.path == request.url.path())
            .map_or(Reply::Status(404), |route| route.reply.clone());
        let url = request.url.to_string();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        self.record(Event::Start(label.clone()));
        let result = respond(url, reply).await;
        self.record(Event::End(label));
        result
    }
}

async fn respond(url: String, mut reply: Reply) -> Result<AjaxResponse, TransportError> {
    loop {
        match reply {
            Reply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
            Reply::Hang => return std::future::pending().await,
            Reply::Fail => {
                return Err(TransportError::Unavailable {
                    reason: "scripted failure".to_string(),
                });
            }
            Reply::Json(value) => return Ok(AjaxResponse::synthetic(url, 200, value.to_string())),
            Reply::Text(status, body) => return Ok(AjaxResponse::synthetic(url, status, body)),
            Reply::Status(status) => return Ok(AjaxResponse::synthetic(url, status, "")),
        }
    }
}

/// A signed-in context wired to a scripted transport, private mock switch
/// and manual clock.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub mock: Arc<MockSwitch>,
    pub clock: Arc<ManualClock>,
    pub ctx: ClientContext,
}

impl Harness {
    pub fn new() -> anyhow::Result<Self> {
        let transport = Arc::new(ScriptedTransport::default());
        let mock = Arc::new(MockSwitch::new());
        let clock = Arc::new(ManualClock::new());
        let ctx = ClientContext::builder(config_for(BASE))
            .transport(transport.clone())
            .mock(mock.clone())
            .clock(clock.clone())
            .session(Session::signed_in(USER_TOKEN))
            .build()?;
        Ok(Self {
            transport,
            mock,
            clock,
            ctx,
        })
    }

    pub fn ajax(&self, signal: &Signal) -> Ajax {
        Ajax::new(&self.ctx, signal)
    }
}
