use std::io::{self, Write};
use std::time::Duration;

use rustc_hash::FxHashMap;

/// A string-keyed tally, used for the 2xx/4xx/5xx/err buckets.
#[derive(Debug, Default)]
pub struct Counter {
    data: FxHashMap<String, u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the key's count and returns the new total.
    pub fn add(&mut self, key: &str, value: u64) -> u64 {
        let count = self.data.entry(key.to_string()).or_insert(0);
        *count += value;
        *count
    }

    pub fn inc(&mut self, key: &str) -> u64 {
        self.add(key, 1)
    }

    /// The key's count, zero when the key was never touched.
    pub fn get(&self, key: &str) -> u64 {
        self.data.get(key).copied().unwrap_or(0)
    }

    pub fn set(&mut self, key: &str, value: u64) {
        self.data.insert(key.to_string(), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// A fixed-capacity ring that keeps the most recent pushes. Iteration runs
/// from the oldest retained entry to the newest.
#[derive(Debug)]
pub struct RotatingArray<T> {
    data: Vec<Option<T>>,
    cur: usize,
}

impl<T> RotatingArray<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: (0..capacity).map(|_| None).collect(),
            cur: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Overwrites the oldest slot with `value`.
    pub fn push(&mut self, value: T) {
        if self.data.is_empty() {
            return;
        }

        self.data[self.cur] = Some(value);
        self.cur = (self.cur + 1) % self.data.len();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let capacity = self.data.len();
        (0..capacity).filter_map(move |i| self.data[(self.cur + i) % capacity].as_ref())
    }
}

/// Byte and request totals accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traffic {
    /// Bytes handed to the transport: request line, headers and body.
    pub tx: u64,
    /// Response body bytes seen on the wire, including bytes past the
    /// capture cap.
    pub rx: u64,
    pub req: u64,
    pub res: u64,
}

/// What a finished dispatch loop hands back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub traffic: Traffic,
    pub duration: Duration,
}

impl RunSummary {
    pub fn write_stats_to_stderr(&self) {
        let stderr = io::stderr();
        let mut handle = stderr.lock();

        let _ = writeln!(handle, "\n=== Traffic Statistics ===");
        let _ = writeln!(handle, "Requests sent: {}", self.traffic.req);
        let _ = writeln!(handle, "Responses received: {}", self.traffic.res);
        let _ = writeln!(handle, "Bytes sent: {}B", readable_bytes(self.traffic.tx));
        let _ = writeln!(handle, "Bytes received: {}B", readable_bytes(self.traffic.rx));
        let _ = writeln!(handle, "Total duration: {:.2}s", self.duration.as_secs_f64());
        let _ = writeln!(handle, "==========================\n");
    }
}

/// Renders a byte count with 1000-based unit prefixes, e.g. `2.50M`.
pub fn readable_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["", "K", "M", "G", "T", "P"];

    if bytes < 1000 {
        return bytes.to_string();
    }

    let mut value = bytes as f64;
    let mut i = 0;
    while i < UNITS.len() - 1 && value >= 1000.0 {
        value /= 1000.0;
        i += 1;
    }

    format!("{}{}", adaptive_to_fixed(value), UNITS[i])
}

/// More decimals for smaller magnitudes, so the output stays ~3 digits.
fn adaptive_to_fixed(n: f64) -> String {
    if n > 100.0 {
        format!("{n:.0}")
    } else if n > 10.0 {
        format!("{n:.1}")
    } else {
        format!("{n:.2}")
    }
}
