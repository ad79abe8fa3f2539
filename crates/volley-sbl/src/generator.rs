use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use itertools::Itertools;
use rand::Rng;

use crate::error::SblError;
use crate::value::Value;

/// One draw from a ticker: the produced value and whether the ticker
/// wrapped around on this draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub value: Value,
    pub overflow: bool,
}

impl Step {
    fn new(value: impl Into<Value>, overflow: bool) -> Self {
        Self {
            value: value.into(),
            overflow,
        }
    }
}

/// A stateful value generator. Every tag in a template owns one.
#[derive(Debug)]
pub enum Ticker {
    Seq(Seq),
    Rand(Rand),
    Choose(Choose),
    RandText(RandText),
    Time(Time),
    Product(Product),
    Power(Power),
    /// Mirrors another tag's current value; advanced by the runtime, not
    /// by `tick`.
    Ref { direction: String },
    /// A literal chunk of text between tags.
    Echo { text: String },
}

impl Ticker {
    pub fn tick(&mut self) -> Step {
        match self {
            Ticker::Seq(ticker) => ticker.tick(),
            Ticker::Rand(ticker) => ticker.tick(),
            Ticker::Choose(ticker) => ticker.tick(),
            Ticker::RandText(ticker) => ticker.tick(),
            Ticker::Time(ticker) => ticker.tick(),
            Ticker::Product(ticker) => ticker.tick(),
            Ticker::Power(ticker) => ticker.tick(),
            Ticker::Ref { .. } => Step::new(Value::default(), true),
            Ticker::Echo { text } => Step::new(text.clone(), true),
        }
    }

    /// The id this ticker mirrors, for reference tickers only.
    pub fn direction(&self) -> Option<&str> {
        match self {
            Ticker::Ref { direction } => Some(direction),
            _ => None,
        }
    }
}

/// Counts from `start` to `end` inclusive by `step`, wrapping back to
/// `start` on overflow. The overflow flag rides on the first value of the
/// new cycle.
#[derive(Debug)]
pub struct Seq {
    start: i64,
    end: i64,
    step: i64,
    current: i64,
    next_overflow: bool,
}

impl Seq {
    pub fn new(start: i64, end: i64, step: i64) -> Self {
        Self {
            start,
            end,
            step,
            current: start,
            next_overflow: false,
        }
    }

    fn advance(&mut self) -> (i64, bool) {
        let value = self.current;
        let overflow = self.next_overflow;

        let mut next = self.current.saturating_add(self.step);
        self.next_overflow = false;
        if next > self.end {
            next = self.start;
            self.next_overflow = true;
        }
        self.current = next;

        (value, overflow)
    }

    pub fn tick(&mut self) -> Step {
        let (value, overflow) = self.advance();
        Step::new(value, overflow)
    }
}

/// Uniform draws in `min..=max`. With a countdown the overflow flag fires
/// once the counter reaches it, then the counter restarts; without one
/// every draw overflows.
#[derive(Debug)]
pub struct Rand {
    min: i64,
    max: i64,
    countdown: i64,
    count: i64,
}

impl Rand {
    pub fn new(min: i64, max: i64, countdown: i64) -> Self {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        Self {
            min,
            max,
            countdown,
            count: 0,
        }
    }

    fn advance(&mut self) -> (i64, bool) {
        let value = rand::rng().random_range(self.min..=self.max);
        let mut overflow = true;

        if self.countdown != 0 {
            overflow = self.count == self.countdown;
            self.count = if overflow { 1 } else { self.count + 1 };
        }

        (value, overflow)
    }

    pub fn tick(&mut self) -> Step {
        let (value, overflow) = self.advance();
        Step::new(value, overflow)
    }
}

#[derive(Debug)]
enum IndexTicker {
    Seq(Seq),
    Rand(Rand),
}

impl IndexTicker {
    fn advance(&mut self) -> (i64, bool) {
        match self {
            IndexTicker::Seq(ticker) => ticker.advance(),
            IndexTicker::Rand(ticker) => ticker.advance(),
        }
    }
}

/// Picks entries from a fixed pool, either in order (overflowing on the
/// wrap back to the first entry) or at random (overflowing once per
/// pool-sized countdown).
#[derive(Debug)]
pub struct Choose {
    pool: Vec<String>,
    index: Option<IndexTicker>,
}

impl Choose {
    pub fn new(values: Vec<String>, orderly: bool) -> Self {
        let pool = trim_empty(values.iter().map(|value| value.trim().to_string()).collect());
        let index = if pool.is_empty() {
            None
        } else {
            let last = pool.len() as i64 - 1;
            Some(if orderly {
                IndexTicker::Seq(Seq::new(0, last, 1))
            } else {
                IndexTicker::Rand(Rand::new(0, last, pool.len() as i64))
            })
        };
        Self { pool, index }
    }

    /// Builds a pool from the lines of a file.
    pub fn from_file(path: impl AsRef<Path>, orderly: bool) -> Result<Self, SblError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|error| SblError::FileRead {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
        let lines = content
            .trim()
            .split('\n')
            .map(|line| line.to_string())
            .collect();
        Ok(Self::new(lines, orderly))
    }

    pub fn tick(&mut self) -> Step {
        match &mut self.index {
            Some(index) => {
                let (i, overflow) = index.advance();
                Step::new(self.pool[i as usize].clone(), overflow)
            }
            None => Step::new("", true),
        }
    }
}

/// Random strings of a random length, drawn character by character from a
/// fixed alphabet.
#[derive(Debug)]
pub struct RandText {
    chars: Vec<char>,
    length: Rand,
    index: Rand,
}

impl RandText {
    pub fn new(chars: &str, min_length: i64, max_length: i64) -> Self {
        let chars: Vec<char> = chars.chars().collect();
        let last = chars.len() as i64 - 1;
        Self {
            chars,
            length: Rand::new(min_length, max_length, 0),
            index: Rand::new(0, last.max(0), 0),
        }
    }

    pub fn tick(&mut self) -> Step {
        if self.chars.is_empty() {
            return Step::new("", true);
        }
        let (n, _) = self.length.advance();
        let text: String = (0..n.max(0))
            .map(|_| {
                let (i, _) = self.index.advance();
                self.chars[i as usize]
            })
            .collect();
        Step::new(text, true)
    }
}

/// The current unix timestamp, in seconds or milliseconds.
#[derive(Debug)]
pub struct Time {
    seconds_unit: bool,
}

impl Time {
    pub fn new(seconds_unit: bool) -> Self {
        Self { seconds_unit }
    }

    pub fn tick(&mut self) -> Step {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let value = if self.seconds_unit {
            elapsed.as_secs() as i64
        } else {
            elapsed.as_millis() as i64
        };
        Step::new(value, true)
    }
}

/// Cartesian product over a list of pools, joined by a separator. The
/// rightmost pool spins fastest; the overflow flag rides on the first
/// combination of the new cycle.
#[derive(Debug)]
pub struct Product {
    pools: Vec<Vec<String>>,
    separator: String,
    indices: Vec<usize>,
    next_overflow: bool,
    empty: bool,
}

impl Product {
    pub fn new(pools: Vec<Vec<String>>, separator: impl Into<String>) -> Self {
        let empty = pools.iter().any(|pool| pool.is_empty());
        let indices = vec![0; pools.len()];
        Self {
            pools,
            separator: separator.into(),
            indices,
            next_overflow: false,
            empty,
        }
    }

    pub fn tick(&mut self) -> Step {
        if self.empty {
            return Step::new("", true);
        }

        let value = self
            .pools
            .iter()
            .zip(&self.indices)
            .map(|(pool, &i)| pool[i].as_str())
            .join(&self.separator);
        let overflow = self.next_overflow;
        self.next_overflow = false;

        // ripple the carry from the fastest dimension leftwards
        let mut carry = 1;
        for i in (0..self.indices.len()).rev() {
            if carry == 0 {
                break;
            }
            self.indices[i] += carry;
            carry = 0;
            if self.indices[i] >= self.pools[i].len() {
                self.indices[i] = 0;
                carry = 1;
            }
        }
        if carry == 1 {
            self.next_overflow = true;
        }

        Step::new(value, overflow)
    }
}

/// All combinations of a pool with itself, from `start` to `end`
/// repetitions. Wrapping past the last combination of the highest
/// exponent restarts at the lowest and flags overflow.
#[derive(Debug)]
pub struct Power {
    pool: Vec<String>,
    separator: String,
    start: i64,
    end: i64,
    exponent: i64,
    inner: Product,
}

impl Power {
    pub fn new(pool: Vec<String>, start: i64, end: i64, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        let inner = Self::product_for(&pool, start, &separator);
        Self {
            pool,
            separator,
            start,
            end,
            exponent: start,
            inner,
        }
    }

    fn product_for(pool: &[String], exponent: i64, separator: &str) -> Product {
        let pools = vec![pool.to_vec(); exponent.max(0) as usize];
        Product::new(pools, separator)
    }

    pub fn tick(&mut self) -> Step {
        if self.pool.is_empty() {
            return Step::new("", true);
        }

        let mut overflow = false;
        let mut step = self.inner.tick();
        if step.overflow {
            self.exponent += 1;
            if self.exponent > self.end {
                self.exponent = self.start;
                overflow = true;
            }
            self.inner = Self::product_for(&self.pool, self.exponent, &self.separator);
            step = self.inner.tick();
        }

        Step {
            value: step.value,
            overflow,
        }
    }
}

/// Drops empty entries from both ends of the pool, keeping interior ones.
fn trim_empty(values: Vec<String>) -> Vec<String> {
    let start = values.iter().position(|value| !value.is_empty());
    let end = values.iter().rposition(|value| !value.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => values[start..=end].to_vec(),
        _ => Vec::new(),
    }
}
