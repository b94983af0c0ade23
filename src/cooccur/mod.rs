// src/cooccur/mod.rs
//! Conditional co-occurrence probabilities `p(neighbour | term)`, computed
//! either with the pairs strategy (secondary sort on composite keys) or the
//! stripes strategy (associative neighbour maps).

pub mod key;
pub mod pairs;
pub mod scored;
pub mod stripes;

pub use self::key::{GroupKey, OrderedKey, SENTINEL};
pub use self::scored::ScoredPair;
pub use self::stripes::Stripe;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::{debug, info};

use crate::config::Config;
use crate::mapreduce::Emit;

/// Per-job knobs shared by mappers and reducers of both strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub neighbour_distance: usize,
    pub precision: u32,
    pub min_pair_count: u64,
    pub keyword: Option<String>,
}

impl Settings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            neighbour_distance: config.cooccurrence.neighbour_distance.max(1),
            precision: config.precision,
            min_pair_count: config.cooccurrence.min_pair_count,
            keyword: config.cooccurrence.keyword.as_ref().map(|k| k.to_lowercase()),
        }
    }

    fn is_keyword(&self, term: &str) -> bool {
        self.keyword.as_deref() == Some(term)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Staging area for one term's scored pairs, drained in output order.
#[derive(Debug, Default)]
pub struct PairQueue {
    heap: BinaryHeap<Reverse<ScoredPair>>,
}

impl PairQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pair: ScoredPair) {
        self.heap.push(Reverse(pair));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Emits every staged pair with its probability, best first. Pairs whose
    /// probability is undefined are dropped.
    pub fn drain_into(&mut self, settings: &Settings, out: &mut dyn Emit<ScoredPair, f64>) {
        while let Some(Reverse(pair)) = self.heap.pop() {
            let Some(probability) = pair.conditional_probability() else {
                debug!(pair = %pair, "Dropping pair without a total");
                continue;
            };
            if settings.is_keyword(&pair.primary) {
                info!("Emitting: {pair} => {probability}");
            } else {
                debug!("Emitting: {pair} => {probability}");
            }
            out.emit(pair, probability);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use super::*;

    type Events = Arc<Mutex<Vec<(Level, String)>>>;

    /// Records the level and message of every event.
    struct Capture(Events);

    struct Message(String);

    impl Visit for Message {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut message = Message(String::new());
            event.record(&mut message);
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), message.0));
        }
    }

    #[test]
    fn test_queue_drains_best_first() {
        let mut queue = PairQueue::new();
        queue.push(ScoredPair::new("t", "a", 4, 1, 5));
        queue.push(ScoredPair::new("t", "b", 4, 3, 5));
        queue.push(ScoredPair::new("t", "c", 0, 3, 5));

        let mut out: Vec<(ScoredPair, f64)> = Vec::new();
        queue.drain_into(&Settings::default(), &mut out);

        assert!(queue.is_empty());
        let got: Vec<_> = out.iter().map(|(p, v)| (p.neighbour.as_str(), *v)).collect();
        assert_eq!(got, vec![("b", 0.75), ("a", 0.25)]);
    }

    #[test]
    fn test_keyword_pairs_logged_at_info() {
        let settings = Settings {
            keyword: Some("the".to_string()),
            ..Settings::default()
        };
        let mut queue = PairQueue::new();
        queue.push(ScoredPair::new("the", "cat", 2, 1, 5));
        queue.push(ScoredPair::new("dog", "bone", 1, 1, 5));

        let events: Events = Arc::default();
        let subscriber = tracing_subscriber::registry().with(Capture(Arc::clone(&events)));
        let mut out: Vec<(ScoredPair, f64)> = Vec::new();
        tracing::subscriber::with_default(subscriber, || queue.drain_into(&settings, &mut out));

        let events = events.lock().unwrap();
        let emitted: Vec<_> = events
            .iter()
            .filter(|(_, message)| message.starts_with("Emitting"))
            .collect();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[0].0, Level::DEBUG);
        assert!(emitted[0].1.contains("dog bone (1/1)"));
        assert_eq!(emitted[1].0, Level::INFO);
        assert_eq!(emitted[1].1, "Emitting: the cat (1/2) => 0.5");
        assert_eq!(out.len(), 2);
    }
}
