//! `volley-core` is the request engine behind
//! [volley](https://github.com/harehare/volley): it renders SBL
//! templates into concrete requests, schedules them against a
//! concurrency limit and streams progress back as [`Event`]s. The
//! network edge sits behind the [`Transport`] trait, so the whole loop
//! runs against a fake in tests.
//!
//! ## Examples
//!
//! ```rs
//! use tokio::sync::mpsc;
//! use volley_core::{Config, Dispatcher, Event, HttpTransport};
//!
//! let config = Config::default();
//! let transport = HttpTransport::new(config.proxy.as_deref(), config.http2)?;
//! let (events, mut receiver) = mpsc::unbounded_channel();
//!
//! let mut dispatcher =
//!     Dispatcher::new(config, "https://example.com/items/{1:}", transport, events)?;
//! dispatcher.init()?;
//!
//! tokio::spawn(async move {
//!     while let Some(event) = receiver.recv().await {
//!         if let Event::Result(info) = event {
//!             println!("{} -> {}", info.id, info.code);
//!         }
//!     }
//! });
//!
//! // Runs until the shutdown future resolves, e.g. on Ctrl-C.
//! let summary = dispatcher.run(shutdown).await;
//! summary.write_stats_to_stderr();
//! ```
mod alive;
mod config;
mod cookies;
mod dispatcher;
mod error;
mod event;
mod form;
mod headers;
mod stats;
mod transport;

pub use alive::{AliveList, Handle};
pub use config::{Config, RefererPolicy};
pub use cookies::{Cookie, load_from_string, to_header_string};
pub use dispatcher::Dispatcher;
pub use error::{AliveError, CoreError, TransportError};
pub use event::{Event, RequestInfo, ResultInfo};
pub use form::json2form;
pub use headers::{
    DEFAULT_HEADERS, headers_string_to_object, mime_by_extension, random_user_agent, set_header,
};
pub use stats::{Counter, RotatingArray, RunSummary, Traffic, readable_bytes};
pub use transport::{HttpTransport, ResponseStream, Transport, TransportRequest};
