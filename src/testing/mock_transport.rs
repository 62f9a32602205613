//! Mock HTTP transport.

use crate::io::http::HttpTransport;
use crate::types::{InsarError, InsarResult};
use std::cell::RefCell;
use std::io::{Cursor, Read};

/// A request seen by the mock, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    /// First value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Body(Vec<u8>),
    Status(u16),
}

#[derive(Debug, Clone)]
struct Route {
    url: String,
    when: Vec<(String, String)>,
    reply: Reply,
}

impl Route {
    fn matches(&self, url: &str, query: &[(String, String)]) -> bool {
        self.url == url && self.when.iter().all(|pair| query.contains(pair))
    }
}

/// In-memory implementation of [`HttpTransport`].
///
/// Routes are matched on URL plus an optional set of required query
/// parameters; the most specific matching route wins. Unrouted requests get
/// a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: RefCell<Vec<Route>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for any request to `url`.
    pub fn respond(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.route(url, &[], Reply::Body(body.into()));
    }

    /// Serve a JSON document for any request to `url`.
    pub fn respond_json(&self, url: &str, json: &str) {
        self.respond(url, json.as_bytes().to_vec());
    }

    /// Serve `body` only when the request carries every `(key, value)` in `when`.
    pub fn respond_when(&self, url: &str, when: &[(&str, &str)], body: impl Into<Vec<u8>>) {
        self.route(url, when, Reply::Body(body.into()));
    }

    /// Answer requests to `url` with a non-success status.
    pub fn fail(&self, url: &str, status: u16) {
        self.route(url, &[], Reply::Status(status));
    }

    fn route(&self, url: &str, when: &[(&str, &str)], reply: Reply) {
        self.routes.borrow_mut().push(Route {
            url: url.to_string(),
            when: when
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            reply,
        });
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    /// Requests received for `url`.
    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.url == url)
            .cloned()
            .collect()
    }
}

impl HttpTransport for MockTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> InsarResult<Box<dyn Read>> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: url.to_string(),
            query: query.to_vec(),
        });

        let routes = self.routes.borrow();
        let best = routes
            .iter()
            .filter(|route| route.matches(url, query))
            .fold(None::<&Route>, |best, route| match best {
                Some(b) if b.when.len() >= route.when.len() => Some(b),
                _ => Some(route),
            });

        match best.map(|route| route.reply.clone()) {
            Some(Reply::Body(body)) => Ok(Box::new(Cursor::new(body))),
            Some(Reply::Status(status)) => Err(InsarError::Transport {
                url: url.to_string(),
                status,
            }),
            None => Err(InsarError::Transport {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
