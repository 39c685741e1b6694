//! Span latency profiling for the search hot paths.
//!
//! Compiled only with `--features instrumentation`. Functions marked with
//! `#[instrument]` open a span on every call; [`SpanTimingLayer`] measures
//! each span from enter to exit and accumulates the numbers per thread, so
//! MCTS workers never contend on a shared map while they search.

use std::sync::Mutex;
use std::time::Instant;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use thread_local::ThreadLocal;
use tracing::span;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Accumulated latency of one span name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpanTiming {
    pub calls: u64,
    pub total_nanos: u64,
    pub max_nanos: u64,
}

impl SpanTiming {
    fn record(&mut self, nanos: u64) {
        self.calls += 1;
        self.total_nanos += nanos;
        self.max_nanos = self.max_nanos.max(nanos);
    }

    fn merge(&mut self, other: &SpanTiming) {
        self.calls += other.calls;
        self.total_nanos += other.total_nanos;
        self.max_nanos = self.max_nanos.max(other.max_nanos);
    }

    pub fn mean_micros(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.total_nanos as f64 / self.calls as f64 / 1_000.0
        }
    }
}

type TimingTable = FxHashMap<&'static str, SpanTiming>;

// One table per thread; the mutex is only ever contended by the final report.
static SPAN_TIMINGS: Lazy<ThreadLocal<Mutex<TimingTable>>> = Lazy::new(ThreadLocal::new);

/// Stores the enter instant in the span's extensions and folds the elapsed
/// time into the calling thread's table on exit.
pub struct SpanTimingLayer;

impl<S> Layer<S> for SpanTimingLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(Instant::now());
        }
    }

    fn on_exit(&self, id: &span::Id, ctx: Context<'_, S>) {
        let span = match ctx.span(id) {
            Some(span) => span,
            None => return,
        };
        let entered = match span.extensions_mut().remove::<Instant>() {
            Some(entered) => entered,
            None => return,
        };

        let nanos = entered.elapsed().as_nanos() as u64;
        let table = SPAN_TIMINGS.get_or(|| Mutex::new(TimingTable::default()));
        if let Ok(mut table) = table.lock() {
            table.entry(span.name()).or_default().record(nanos);
        }
    }
}

/// Installs the timing layer as the global subscriber.
///
/// With `RUST_LOG` unset (or `off`) every span is timed silently. Any other
/// value also prints span events, filtered by `RUST_LOG`.
pub fn init_tracing() -> Result<(), SetGlobalDefaultError> {
    let directives = std::env::var("RUST_LOG").unwrap_or_default();

    if directives.is_empty() || directives == "off" {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("trace"))
            .with(SpanTimingLayer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let events = tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(directives))
            .with(SpanTimingLayer)
            .with(events);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Merges every thread's table, sorted by total time, largest first.
pub fn span_timings() -> Vec<(&'static str, SpanTiming)> {
    let mut merged = TimingTable::default();
    for table in SPAN_TIMINGS.iter() {
        if let Ok(table) = table.lock() {
            for (&name, timing) in table.iter() {
                merged.entry(name).or_default().merge(timing);
            }
        }
    }

    let mut timings: Vec<_> = merged.into_iter().collect();
    timings.sort_by_key(|(_, timing)| std::cmp::Reverse(timing.total_nanos));
    timings
}

pub fn print_span_timings() {
    let timings = span_timings();
    if timings.is_empty() {
        eprintln!("\nno spans were recorded");
        return;
    }

    eprintln!("\n{:=<84}", "");
    eprintln!(
        "{:<32} {:>12} {:>12} {:>12} {:>12}",
        "span", "calls", "total (ms)", "mean (µs)", "max (µs)"
    );
    eprintln!("{:-<84}", "");
    for (name, timing) in &timings {
        eprintln!(
            "{:<32} {:>12} {:>12.2} {:>12.2} {:>12.2}",
            name,
            timing.calls,
            timing.total_nanos as f64 / 1_000_000.0,
            timing.mean_micros(),
            timing.max_nanos as f64 / 1_000.0
        );
    }
    eprintln!("{:=<84}", "");
}
