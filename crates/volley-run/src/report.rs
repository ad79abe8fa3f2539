use volley_core::{Counter, Event, RotatingArray};

/// Number of recent results kept for the report's history rows.
const HISTORY_SIZE: usize = 10;

struct HistoryRow {
    id: i64,
    code: u16,
    millis: u128,
}

/// Folds dispatcher events into the periodic status block: the in-flight
/// preview, 2xx/4xx/5xx/err tallies and the most recent results.
pub struct Reporter {
    stats: Counter,
    history: RotatingArray<HistoryRow>,
    alive: usize,
    preview: String,
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            stats: Counter::new(),
            history: RotatingArray::new(HISTORY_SIZE),
            alive: 0,
            preview: "[]".to_string(),
        }
    }

    pub fn observe(&mut self, event: &Event) {
        match event {
            Event::Tick { alive, preview } | Event::Submit { alive, preview, .. } => {
                self.alive = *alive;
                self.preview = preview.clone();
            }
            Event::Result(info) => {
                match info.code {
                    200..=299 => {
                        self.stats.inc("2xx");
                    }
                    400..=499 => {
                        self.stats.inc("4xx");
                    }
                    500..=599 => {
                        self.stats.inc("5xx");
                    }
                    _ => {}
                }
                self.history.push(HistoryRow {
                    id: info.id,
                    code: info.code,
                    millis: info.phases.as_millis(),
                });
            }
            Event::Error { .. } => {
                self.stats.inc("err");
            }
            _ => {}
        }
    }

    pub fn render(&self) -> String {
        let mut block = format!(
            "report ----------------\n alive: {}  2xx: {}  4xx: {}  5xx: {}  err: {}\n list: {}\n",
            self.alive,
            self.stats.get("2xx"),
            self.stats.get("4xx"),
            self.stats.get("5xx"),
            self.stats.get("err"),
            self.preview
        );
        for row in self.history.iter() {
            block.push_str(&format!(" {}: {} {}ms\n", row.id, row.code, row.millis));
        }

        block
    }
}
