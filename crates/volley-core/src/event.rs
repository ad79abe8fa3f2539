use std::time::Duration;

/// The request context carried by submit and error events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub id: i64,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// First 32 characters of the body, or a `[Binary:...]` marker.
    pub body_summary: String,
}

/// The terminal outcome of one completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultInfo {
    pub id: i64,
    pub url: String,
    pub code: u16,
    pub headers: Vec<(String, String)>,
    /// Wall time from submission to the last captured byte.
    pub phases: Duration,
    /// Captured response sample, at most `max_size` bytes.
    pub body: Vec<u8>,
}

/// Lifecycle signals emitted by the dispatcher, in submission order.
///
/// Exactly one of `Result` or `Error` follows every `Submit`. Events that
/// change the in-flight list carry its size and a rendered preview so
/// consumers never reach into dispatcher state.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// All scopes loaded and the dependency order computed.
    Ready,
    /// The tick loop is about to begin.
    Start,
    Tick {
        alive: usize,
        preview: String,
    },
    Submit {
        info: RequestInfo,
        alive: usize,
        preview: String,
    },
    Result(ResultInfo),
    Error {
        message: String,
        /// Absent when rendering failed before a request id was assigned.
        info: Option<RequestInfo>,
    },
}
