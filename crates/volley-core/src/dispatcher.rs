use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use url::Url;
use volley_sbl::{Interpreter, Rand, RandText, Seq};

use crate::alive::{AliveList, Handle};
use crate::config::{Config, RefererPolicy};
use crate::cookies::{load_from_string, to_header_string};
use crate::error::{CoreError, TransportError};
use crate::event::{Event, RequestInfo, ResultInfo};
use crate::form::json2form;
use crate::headers::{
    DEFAULT_HEADERS, headers_string_to_object, mime_by_extension, random_user_agent, set_header,
};
use crate::stats::{RunSummary, Traffic};
use crate::transport::{Transport, TransportRequest};

/// Octet range drawn per request for the forwarded-IP headers.
const IP_OCTET: &str = "1-254";
const BOUNDARY_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// What an exchange future resolves to. Completion handling back on the
/// scheduler merges these into the alive list, the traffic totals and the
/// event stream.
enum Outcome {
    Result {
        handle: Handle,
        info: ResultInfo,
        rx: u64,
    },
    Error {
        handle: Handle,
        message: String,
        info: RequestInfo,
        rx: u64,
    },
}

struct FormBody {
    bytes: Vec<u8>,
    content_type: String,
    summary: String,
}

/// The bounded-concurrency request loop.
///
/// One instance owns the interpreter, the in-flight list and the rate
/// generators; everything is mutated from the single scheduler task, so
/// no locking is involved. Exchanges run concurrently as futures that
/// report back through [`Outcome`].
pub struct Dispatcher<T: Transport + 'static> {
    config: Config,
    target: String,
    transport: Arc<T>,
    events: UnboundedSender<Event>,
    interpreter: Interpreter,
    alive: AliveList<i64>,
    next_delay: Rand,
    next_unit: Rand,
    next_id: Seq,
    traffic: Traffic,
    form_body: Option<FormBody>,
}

impl<T: Transport + 'static> Dispatcher<T> {
    pub fn new(
        config: Config,
        target: impl Into<String>,
        transport: T,
        events: UnboundedSender<Event>,
    ) -> Result<Self, CoreError> {
        let interpreter = Interpreter::with_style(&config.tag)?;
        let next_delay = Rand::new(
            (config.delay.0 * 1000.0) as i64,
            (config.delay.1 * 1000.0) as i64,
            0,
        );
        let next_unit = Rand::new(config.unit.0, config.unit.1, 0);

        Ok(Self {
            config,
            target: target.into(),
            transport: Arc::new(transport),
            events,
            interpreter,
            alive: AliveList::new(),
            next_delay,
            next_unit,
            next_id: Seq::new(1, i64::MAX, 1),
            traffic: Traffic::default(),
            form_body: None,
        })
    }

    /// Loads every scope, computes the evaluation order and emits
    /// [`Event::Ready`]. Any failure here is fatal to the run.
    pub fn init(&mut self) -> Result<(), CoreError> {
        let (begin, end) = self.config.tag.split_once("...").unwrap_or(("{", "}"));
        let octet = format!("{begin}{IP_OCTET}{end}");
        let ip = [octet.as_str(); 4].join(".");

        self.interpreter.load(&self.target, "url")?;
        self.interpreter.load(&ip, "ip")?;
        self.interpreter.load(&self.config.header.join("\n"), "header")?;
        let cookie = read_optional(self.config.cookies.as_deref())?;
        self.interpreter.load(&cookie, "cookie")?;
        let body = read_optional(self.config.body.as_deref())?;
        self.interpreter.load(&body, "body")?;
        self.interpreter.ready()?;

        if let Some(form) = &self.config.form {
            let mut token = RandText::new(BOUNDARY_CHARS, 16, 16);
            let boundary = format!("----WebKitFormBoundary{}", token.tick().value);
            self.form_body = Some(FormBody {
                bytes: json2form(form, &boundary)?,
                content_type: format!("multipart/form-data; boundary={boundary}"),
                summary: format!("[Form:{}]", form.display()),
            });
        }

        self.emit(Event::Ready);
        Ok(())
    }

    /// Drives tick cycles until `shutdown` resolves, then reports the
    /// traffic totals. Outstanding exchanges are aborted by the drop.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> RunSummary {
        let started = Instant::now();
        let mut inflight: FuturesUnordered<BoxFuture<'static, Outcome>> = FuturesUnordered::new();
        self.emit(Event::Start);
        tokio::pin!(shutdown);

        loop {
            self.tick(&mut inflight);

            let delay_ms = self.next_delay.tick().value.as_int().unwrap_or(0).max(0) as u64;
            let sleep = tokio::time::sleep(Duration::from_millis(delay_ms));
            tokio::pin!(sleep);

            loop {
                tokio::select! {
                    _ = &mut shutdown => {
                        return RunSummary {
                            traffic: self.traffic.clone(),
                            duration: started.elapsed(),
                        };
                    }
                    _ = &mut sleep => break,
                    Some(outcome) = inflight.next() => self.complete(outcome),
                }
            }
        }
    }

    /// One scheduling cycle: admit up to `unit` submissions while the
    /// in-flight count stays below the concurrency limit, then signal.
    fn tick(&mut self, inflight: &mut FuturesUnordered<BoxFuture<'static, Outcome>>) {
        let unit = self.next_unit.tick().value.as_int().unwrap_or(0);
        for _ in 0..unit {
            if self.alive.len() >= self.config.concurrent {
                break;
            }
            match self.submit() {
                Ok(exchange) => inflight.push(exchange),
                Err(error) => self.emit(Event::Error {
                    message: error.to_string(),
                    info: None,
                }),
            }
        }

        self.emit(Event::Tick {
            alive: self.alive.len(),
            preview: self.alive.to_string(),
        });
    }

    /// Renders one request, registers it as in-flight, emits
    /// [`Event::Submit`] and returns the exchange future. Nothing touches
    /// the network until the caller polls it.
    fn submit(&mut self) -> Result<BoxFuture<'static, Outcome>, CoreError> {
        let mut rendered = self.interpreter.execute()?;
        let url = rendered.remove("url").unwrap_or_default();
        let header = rendered.remove("header").unwrap_or_default();
        let cookie = rendered.remove("cookie").unwrap_or_default();
        let ip = rendered.remove("ip").unwrap_or_default();
        let body = rendered.remove("body").unwrap_or_default();

        let mut headers: Vec<(String, String)> = DEFAULT_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        set_header(&mut headers, "user-agent", random_user_agent());
        for (name, value) in headers_string_to_object(&header) {
            set_header(&mut headers, &name, value);
        }

        match &self.config.referer {
            RefererPolicy::Root => {
                let root = Url::parse(&url)
                    .and_then(|url| url.join("/"))
                    .map_err(|error| CoreError::InvalidUrl {
                        url: url.clone(),
                        message: error.to_string(),
                    })?;
                set_header(&mut headers, "referer", root.to_string());
            }
            RefererPolicy::Same => set_header(&mut headers, "referer", url.clone()),
            RefererPolicy::None => {}
            RefererPolicy::Value(value) => set_header(&mut headers, "referer", value.clone()),
        }

        if !ip.is_empty() {
            set_header(&mut headers, "X-Forwarded-For", ip.clone());
            set_header(&mut headers, "X-Real-IP", ip);
        }

        if !cookie.is_empty() {
            let jar = load_from_string(&cookie);
            set_header(&mut headers, "cookie", to_header_string(&jar, None, 0));
        }

        let mut body_bytes: Option<Vec<u8>> = None;
        let mut body_summary = String::new();
        if !body.is_empty() {
            let content_type = self
                .config
                .body
                .as_deref()
                .and_then(mime_by_extension)
                .unwrap_or("text/plain");
            set_header(&mut headers, "content-type", content_type);
            set_header(&mut headers, "content-length", body.len().to_string());
            body_summary = body.chars().take(32).collect();
            body_bytes = Some(body.into_bytes());
        }
        if let Some(form) = &self.form_body {
            set_header(&mut headers, "content-type", form.content_type.clone());
            set_header(&mut headers, "content-length", form.bytes.len().to_string());
            body_summary = form.summary.clone();
            body_bytes = Some(form.bytes.clone());
        }
        if let Some(binary) = &self.config.body_binary {
            // Re-read on every submission so the file can change mid-run.
            let bytes = fs::read(binary).map_err(|error| CoreError::FileRead {
                path: binary.display().to_string(),
                message: error.to_string(),
            })?;
            let content_type = mime_by_extension(binary).unwrap_or("application/octet-stream");
            set_header(&mut headers, "content-type", content_type);
            set_header(&mut headers, "content-length", bytes.len().to_string());
            body_summary = format!("[Binary:{}]", binary.display());
            body_bytes = Some(bytes);
        }

        let id = self.next_id.tick().value.as_int().unwrap_or(0);
        let info = RequestInfo {
            id,
            url,
            headers,
            body_summary,
        };
        let handle = self.alive.append(id);
        self.traffic.req += 1;
        self.traffic.tx += estimate_tx(&self.config.method, &info, body_bytes.as_deref());
        self.emit(Event::Submit {
            info: info.clone(),
            alive: self.alive.len(),
            preview: self.alive.to_string(),
        });

        let transport = Arc::clone(&self.transport);
        let method = self.config.method.clone();
        let max_size = self.config.max_size;

        Ok(async move {
            let started = Instant::now();
            let request = TransportRequest {
                method,
                url: info.url.clone(),
                headers: info.headers.clone(),
                body: body_bytes,
            };

            let mut rx = 0;
            match exchange(transport.as_ref(), request, max_size, &mut rx).await {
                Ok((code, headers, body)) => Outcome::Result {
                    handle,
                    info: ResultInfo {
                        id: info.id,
                        url: info.url,
                        code,
                        headers,
                        phases: started.elapsed(),
                        body,
                    },
                    rx,
                },
                Err(error) => Outcome::Error {
                    handle,
                    message: error.to_string(),
                    info,
                    rx,
                },
            }
        }
        .boxed())
    }

    fn complete(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Result { handle, info, rx } => {
                self.traffic.rx += rx;
                self.traffic.res += 1;
                if let Err(error) = self.alive.remove(handle) {
                    tracing::warn!("request {} already left the in-flight list: {error}", info.id);
                }
                self.emit(Event::Result(info));
            }
            Outcome::Error {
                handle,
                message,
                info,
                rx,
            } => {
                self.traffic.rx += rx;
                if let Err(error) = self.alive.remove(handle) {
                    tracing::warn!("request {} already left the in-flight list: {error}", info.id);
                }
                self.emit(Event::Error {
                    message,
                    info: Some(info),
                });
            }
        }
    }

    fn emit(&self, event: Event) {
        let _ = self.events.send(event);
    }
}

/// Streams the response into a capped buffer. Reaching the cap abandons
/// the stream, which aborts the exchange without reporting an error;
/// `rx` counts every byte seen, capped or not.
async fn exchange<T: Transport + ?Sized>(
    transport: &T,
    request: TransportRequest,
    max_size: usize,
    rx: &mut u64,
) -> Result<(u16, Vec<(String, String)>, Vec<u8>), TransportError> {
    let mut stream = transport.send(request).await?;
    let code = stream.code();
    let headers = stream.headers();

    let mut buffer: Vec<u8> = Vec::with_capacity(max_size);
    while let Some(chunk) = stream.chunk().await? {
        *rx += chunk.len() as u64;
        let remaining = max_size - buffer.len();
        if chunk.len() <= remaining {
            buffer.extend_from_slice(&chunk);
        } else {
            buffer.extend_from_slice(&chunk[..remaining]);
        }
        if buffer.len() >= max_size {
            break;
        }
    }

    Ok((code, headers, buffer))
}

/// Rendered header bytes plus body, in lieu of socket-level counters.
fn estimate_tx(method: &str, info: &RequestInfo, body: Option<&[u8]>) -> u64 {
    let request_line = method.len() + info.url.len() + 12;
    let headers: usize = info
        .headers
        .iter()
        .map(|(name, value)| name.len() + value.len() + 4)
        .sum();

    (request_line + headers + 2 + body.map_or(0, <[u8]>::len)) as u64
}

fn read_optional(path: Option<&Path>) -> Result<String, CoreError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|error| CoreError::FileRead {
            path: path.display().to_string(),
            message: error.to_string(),
        }),
        None => Ok(String::new()),
    }
}
