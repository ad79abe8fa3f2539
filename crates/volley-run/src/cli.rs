use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use miette::miette;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use volley_core::{Config, Dispatcher, Event, HttpTransport, RefererPolicy};

use crate::decoy;
use crate::mkform;
use crate::report::Reporter;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug, Default)]
#[command(name = "volley")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "# Examples:\n\n\
    ## To sweep an id range with a random token per request:\n\
    volley 'http://localhost:3000/?id={1:1000}&user={t5-32}'\n\n\
    ## To post a templated body four times per tick:\n\
    volley -m POST -b body.txt -u 4 'http://localhost:3000/entry'\n\n\
    ## To turn a form description into a multipart body template:\n\
    volley mkform parts.json\n\n\
    ## To answer unwanted callers with a slow 504 page:\n\
    volley decoy --port 8504")]
#[command(
    about = "volley mass-generates HTTP requests from tagged URL, header and body templates.",
    long_about = None
)]
pub struct Cli {
    #[clap(subcommand)]
    commands: Option<Commands>,

    /// Template URL to send requests to
    #[arg(value_name = "TARGET")]
    target: Option<String>,

    /// Maximum number of requests in flight at once
    #[arg(short, long, default_value_t = 16)]
    concurrent: usize,

    /// Seconds between ticks, a number or a "min-max" range
    #[arg(short, long, default_value = "1-5", value_name = "RANGE")]
    delay: String,

    /// Requests submitted per tick, a number or a "min-max" range
    #[arg(short, long, default_value = "1", value_name = "RANGE")]
    unit: String,

    /// Add a header template line, e.g. 'X-Trace: {t8-8}'
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    header: Vec<String>,

    /// Netscape cookies.txt file to send as a templated cookie header
    #[arg(short = 'C', long, value_name = "FILE")]
    cookies: Option<PathBuf>,

    /// File to use as the request body template
    #[arg(short, long, value_name = "FILE")]
    body: Option<PathBuf>,

    /// File to send verbatim as the body, re-read for every request
    #[arg(long, value_name = "FILE")]
    body_binary: Option<PathBuf>,

    /// Form description JSON sent as a multipart/form-data body
    #[arg(short, long, value_name = "FILE")]
    form: Option<PathBuf>,

    /// HTTP method
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Referer to send: "root", "same", "none" or a literal value
    #[arg(long, default_value = "root")]
    referer: String,

    /// Proxy URL, http or socks5
    #[arg(short, long, value_name = "URL")]
    proxy: Option<String>,

    /// Log errors only
    #[arg(short, long, default_value_t = false)]
    silent: bool,

    /// Speak HTTP/2 from the first byte
    #[arg(long, default_value_t = false)]
    http2: bool,

    /// Tag bracket style, begin and end around "..."
    #[arg(long, default_value = "{...}", value_name = "STYLE")]
    tag: String,

    /// Largest number of response body bytes to capture per request
    #[arg(long, default_value_t = 65536, value_name = "BYTES")]
    max_size: usize,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Answer every connection with a slow 504 page
    Decoy {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8504)]
        port: u16,
    },
    /// Convert a form description JSON into a multipart body template
    Mkform {
        /// Form description JSON file
        file: PathBuf,
        /// Boundary written into the generated body
        #[arg(short, long)]
        boundary: Option<String>,
    },
}

impl Cli {
    pub async fn run(&self) -> miette::Result<()> {
        self.init_tracing();

        match &self.commands {
            Some(Commands::Decoy { port }) => decoy::serve(*port).await,
            Some(Commands::Mkform { file, boundary }) => mkform::mkform(file, boundary.as_deref()),
            None => self.dispatch().await,
        }
    }

    async fn dispatch(&self) -> miette::Result<()> {
        let Some(target) = self.target.clone() else {
            return Err(miette!(
                "No target URL. Try: volley 'http://localhost:3000/?id={{1:1000}}'"
            ));
        };
        let config = self.to_config()?;

        let transport =
            HttpTransport::new(config.proxy.as_deref(), config.http2).into_diagnostic()?;
        let (events, receiver) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(config, target, transport, events)?;
        dispatcher.init()?;

        let consumer = tokio::spawn(consume_events(receiver));
        let summary = dispatcher.run(shutdown_signal()).await;
        // Dropping the dispatcher closed the event channel; the consumer
        // drains what is left and exits on its own.
        let _ = consumer.await;
        summary.write_stats_to_stderr();

        Ok(())
    }

    fn to_config(&self) -> miette::Result<Config> {
        let delay = parse_range_expr(&self.delay)?;
        let unit = parse_range_expr(&self.unit)?;

        Ok(Config {
            concurrent: self.concurrent,
            delay,
            unit: (unit.0 as i64, unit.1 as i64),
            header: self.header.clone(),
            cookies: self.cookies.clone(),
            body: self.body.clone(),
            body_binary: self.body_binary.clone(),
            form: self.form.clone(),
            method: self.method.to_uppercase(),
            referer: RefererPolicy::from(self.referer.as_str()),
            proxy: self.proxy.clone(),
            silent: self.silent,
            http2: self.http2,
            tag: self.tag.clone(),
            max_size: self.max_size,
        })
    }

    fn init_tracing(&self) {
        let default_level = if self.silent { "error" } else { "info" };
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }
}

/// Parses `"1-5"` into `(1.0, 5.0)`; a single number repeats on both ends.
/// The pair comes back sorted, so `"5-1"` also means `(1.0, 5.0)`.
fn parse_range_expr(expr: &str) -> miette::Result<(f64, f64)> {
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|_| miette!("Invalid range expression \"{expr}\", expected e.g. \"3\" or \"1-5\""))
    };

    match expr.split_once('-') {
        Some((low, high)) => {
            let low = parse(low)?;
            let high = parse(high)?;
            Ok((low.min(high), low.max(high)))
        }
        None => {
            let value = parse(expr)?;
            Ok((value, value))
        }
    }
}

/// Turns dispatcher events into log lines and drives the periodic report.
/// Runs until the dispatcher drops its event sender.
async fn consume_events(mut receiver: mpsc::UnboundedReceiver<Event>) {
    let mut reporter = Reporter::new();
    let start = tokio::time::Instant::now() + REPORT_INTERVAL;
    let mut report = tokio::time::interval_at(start, REPORT_INTERVAL);

    loop {
        tokio::select! {
            event = receiver.recv() => {
                let Some(event) = event else { break };
                log_event(&event);
                reporter.observe(&event);
            }
            _ = report.tick() => info!("{}", reporter.render()),
        }
    }
}

fn log_event(event: &Event) {
    match event {
        Event::Ready => info!("ready"),
        Event::Start | Event::Tick { .. } => {}
        Event::Submit {
            info,
            alive,
            preview,
        } => {
            info!("submit({})  {}", info.id, info.url);
            info!("alive({alive})  {preview}");
        }
        Event::Result(info) => {
            info!("result({})  {} - {}ms", info.id, info.code, info.phases.as_millis());
        }
        Event::Error { message, info } => match info {
            Some(info) => error!("{message} ({}) {}", info.id, info.url),
            None => error!("{message}"),
        },
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
