//! In-memory transport shared by the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Mutex;

use simplepay::{
    Result,
    transport::{Transport, TransportResponse},
};

/// One captured outbound request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

/// Records every request and answers with a canned reply.
#[derive(Debug)]
pub struct RecordingTransport {
    status: u16,
    reply: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn replying(status: u16, reply: impl Into<String>) -> Self {
        Self { status, reply: reply.into(), requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }

    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().expect("one request")
    }
}

impl Transport for RecordingTransport {
    async fn post<'a>(
        &'a self,
        url: &'a str,
        body: &'a [u8],
        headers: &'a [(&'a str, &'a str)],
    ) -> Result<TransportResponse> {
        self.requests.lock().expect("lock poisoned").push(RecordedRequest {
            url: url.to_owned(),
            body: String::from_utf8(body.to_vec()).expect("body should be UTF-8"),
            headers: headers.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
        });

        Ok(TransportResponse {
            status: self.status,
            body: self.reply.as_bytes().to_vec(),
            headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
        })
    }

    fn protocol_name(&self) -> &'static str {
        "recording"
    }
}
