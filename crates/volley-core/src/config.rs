use std::path::PathBuf;

/// How the `referer` header is derived for each submitted request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RefererPolicy {
    /// The origin root of the rendered URL, e.g. `http://host/`.
    #[default]
    Root,
    /// The rendered URL itself.
    Same,
    /// No referer header at all.
    None,
    /// A literal value sent as-is.
    Value(String),
}

impl From<&str> for RefererPolicy {
    fn from(value: &str) -> Self {
        match value {
            "root" => RefererPolicy::Root,
            "same" => RefererPolicy::Same,
            "none" => RefererPolicy::None,
            other => RefererPolicy::Value(other.to_string()),
        }
    }
}

/// Validated dispatch settings. The CLI layer owns parsing; the core only
/// consumes the finished struct.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound on in-flight requests.
    pub concurrent: usize,
    /// Seconds slept between ticks, drawn uniformly from this range.
    pub delay: (f64, f64),
    /// Requests submitted per tick, drawn uniformly from this range.
    pub unit: (i64, i64),
    /// Extra header lines, each a `name: value` template.
    pub header: Vec<String>,
    /// Netscape cookie file fed to the `cookie` scope.
    pub cookies: Option<PathBuf>,
    /// Text body template file fed to the `body` scope.
    pub body: Option<PathBuf>,
    /// Binary body file, re-read for every submission. Overrides `body`.
    pub body_binary: Option<PathBuf>,
    /// JSON form description turned into a multipart body at startup.
    pub form: Option<PathBuf>,
    pub method: String,
    pub referer: RefererPolicy,
    /// Proxy URL handed to the transport, e.g. `http://127.0.0.1:8080`.
    pub proxy: Option<String>,
    pub silent: bool,
    pub http2: bool,
    /// Tag bracket style for every template, e.g. `{...}`.
    pub tag: String,
    /// Response capture cap in bytes.
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrent: 16,
            delay: (1.0, 5.0),
            unit: (1, 1),
            header: Vec::new(),
            cookies: None,
            body: None,
            body_binary: None,
            form: None,
            method: "GET".to_string(),
            referer: RefererPolicy::Root,
            proxy: None,
            silent: false,
            http2: false,
            tag: "{...}".to_string(),
            max_size: 65536,
        }
    }
}
