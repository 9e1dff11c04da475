//! Log event fan-out
//!
//! The audio layer publishes its log output here instead of writing to a
//! shared console; interested parties subscribe a callback. Delivery is
//! synchronous, in registration order, with no buffering: a late subscriber
//! only sees later events.

use crate::gain::{GainExtractor, GainSeries};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// One published log record
#[derive(Clone, Debug, PartialEq)]
pub enum LogEvent {
    Line(String),
    Batch(Vec<String>),
}

impl LogEvent {
    pub fn lines(&self) -> Vec<&str> {
        match self {
            LogEvent::Line(line) => vec![line.as_str()],
            LogEvent::Batch(lines) => lines.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&LogEvent)>;

/// Registry of log observers
#[derive(Default)]
pub struct LogBus {
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl LogBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&LogEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer; false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn publish(&mut self, event: &LogEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(event);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

/// Feeds gains parsed from log events into a shared series
pub struct GainMonitor {
    series: Rc<RefCell<GainSeries>>,
    subscription: SubscriptionId,
}

impl GainMonitor {
    /// Subscribe to `bus`. A batch replaces the series, a single line appends.
    pub fn attach(bus: &mut LogBus, extractor: GainExtractor, capacity: usize) -> Self {
        let series = Rc::new(RefCell::new(GainSeries::new(capacity)));
        let sink = Rc::clone(&series);

        let subscription = bus.subscribe(move |event| match event {
            LogEvent::Line(line) => {
                let gain = extractor.extract(Some(line.as_str()));
                sink.borrow_mut().push(gain);
            }
            LogEvent::Batch(lines) => {
                let gains = extractor.extract_all(lines.as_slice());
                debug!(count = gains.len(), "gain batch");
                sink.borrow_mut().replace(&gains);
            }
        });

        Self {
            series,
            subscription,
        }
    }

    pub fn series(&self) -> Rc<RefCell<GainSeries>> {
        Rc::clone(&self.series)
    }

    pub fn values(&self) -> Vec<f64> {
        self.series.borrow().values()
    }

    pub fn latest(&self) -> Option<f64> {
        self.series.borrow().latest()
    }

    /// Unsubscribe from `bus`, keeping the collected values
    pub fn detach(&self, bus: &mut LogBus) -> bool {
        bus.unsubscribe(self.subscription)
    }
}
