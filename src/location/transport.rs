//! Blocking HTTP seam shared by the geocoder and the facility locator.
//!
//! Components build an [`HttpRequest`] and get the response body back as text.
//! Status handling lives here: anything that is not a 2xx becomes
//! [`LookupError::Rejected`], connection problems and timeouts become
//! [`LookupError::Unreachable`].

use super::types::LookupError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// One outbound request, fully described.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: &str, user_agent: &str, timeout: Duration) -> Self {
        Self {
            method: Method::Get,
            url: url.to_string(),
            query: Vec::new(),
            body: None,
            user_agent: user_agent.to_string(),
            timeout,
        }
    }

    pub fn post(url: &str, body: String, user_agent: &str, timeout: Duration) -> Self {
        Self {
            method: Method::Post,
            url: url.to_string(),
            query: Vec::new(),
            body: Some(body),
            user_agent: user_agent.to_string(),
            timeout,
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Executes a single request. No retries.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<String, LookupError>;
}

/// Production transport backed by a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<String, LookupError> {
        let mut req = self
            .agent
            .request(request.method.as_str(), &request.url)
            .set("User-Agent", &request.user_agent)
            .timeout(request.timeout);
        for (key, value) in &request.query {
            req = req.query(key, value);
        }

        let result = match &request.body {
            Some(body) => req
                .set("Content-Type", "text/plain; charset=utf-8")
                .send_string(body),
            None => req.call(),
        };

        match result {
            Ok(response) => response
                .into_string()
                .map_err(|e| LookupError::Malformed(e.to_string())),
            Err(ureq::Error::Status(status, _)) => Err(LookupError::Rejected { status }),
            Err(ureq::Error::Transport(t)) => Err(LookupError::Unreachable(t.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted transport that records every request it sees.
    ///
    /// Replies are consumed in order; the last one repeats forever.
    pub struct FakeTransport {
        replies: Mutex<VecDeque<Result<String, LookupError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        pub fn scripted(replies: Vec<Result<String, LookupError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(body: impl Into<String>) -> Self {
            Self::scripted(vec![Ok(body.into())])
        }

        pub fn failing(error: LookupError) -> Self {
            Self::scripted(vec![Err(error)])
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, request: &HttpRequest) -> Result<String, LookupError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                return replies.pop_front().unwrap();
            }
            replies
                .front()
                .cloned()
                .unwrap_or_else(|| Err(LookupError::Unreachable("no reply scripted".into())))
        }
    }
}
