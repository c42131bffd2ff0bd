//! Metrics sink boundary.
//!
//! Encode/decode logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::{error::ErrorKind, obs::metrics};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    EncodeFinish { nodes: u64 },
    EncodeRejected { kind: ErrorKind },
    DecodeFinish { nodes: u64, parameters: u64 },
    DecodeRejected { kind: ErrorKind },
    ConstantCollapsed,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into global metrics state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::EncodeFinish { nodes } => {
                m.ops.encode_calls = m.ops.encode_calls.saturating_add(1);
                m.ops.encode_nodes = m.ops.encode_nodes.saturating_add(nodes);
            }
            MetricsEvent::EncodeRejected { kind } => {
                m.ops.encode_calls = m.ops.encode_calls.saturating_add(1);
                m.ops.encode_rejected = m.ops.encode_rejected.saturating_add(1);
                metrics::count_rejection(m, kind.as_str());
            }
            MetricsEvent::DecodeFinish { nodes, parameters } => {
                m.ops.decode_calls = m.ops.decode_calls.saturating_add(1);
                m.ops.decode_nodes = m.ops.decode_nodes.saturating_add(nodes);
                m.ops.decode_parameters = m.ops.decode_parameters.saturating_add(parameters);
            }
            MetricsEvent::DecodeRejected { kind } => {
                m.ops.decode_calls = m.ops.decode_calls.saturating_add(1);
                m.ops.decode_rejected = m.ops.decode_rejected.saturating_add(1);
                metrics::count_rejection(m, kind.as_str());
            }
            MetricsEvent::ConstantCollapsed => {
                m.ops.constants_collapsed = m.ops.constants_collapsed.saturating_add(1);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY: the slot only holds a pointer while the borrowing
        // `with_metrics_sink` frame is live, and it is used here by shared
        // reference without being retained.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current thread's metrics counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY: lifetime erasure only; `Guard` puts the previous slot back
    // before `sink` can go out of scope, panics included.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink<'a> {
        calls: &'a AtomicUsize,
    }

    impl MetricsSink for CountingSink<'_> {
        fn record(&self, _: MetricsEvent) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let outer_calls = AtomicUsize::new(0);
        let inner_calls = AtomicUsize::new(0);
        let outer = CountingSink {
            calls: &outer_calls,
        };
        let inner = CountingSink {
            calls: &inner_calls,
        };

        record(MetricsEvent::ConstantCollapsed);
        assert_eq!(outer_calls.load(Ordering::SeqCst), 0);

        with_metrics_sink(&outer, || {
            record(MetricsEvent::EncodeFinish { nodes: 3 });
            with_metrics_sink(&inner, || {
                record(MetricsEvent::ConstantCollapsed);
            });
            record(MetricsEvent::DecodeFinish {
                nodes: 3,
                parameters: 1,
            });
        });

        assert_eq!(outer_calls.load(Ordering::SeqCst), 2);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 1);
        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let calls = AtomicUsize::new(0);
        let sink = CountingSink { calls: &calls };

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(&sink, || {
                record(MetricsEvent::ConstantCollapsed);
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();
        assert!(panicked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn global_sink_accumulates_counters() {
        metrics_reset_all();

        record(MetricsEvent::EncodeFinish { nodes: 5 });
        record(MetricsEvent::ConstantCollapsed);
        record(MetricsEvent::DecodeFinish {
            nodes: 5,
            parameters: 1,
        });
        record(MetricsEvent::DecodeRejected {
            kind: ErrorKind::UnknownNodeKind,
        });

        let report = metrics_report();
        assert_eq!(report.ops.encode_calls, 1);
        assert_eq!(report.ops.encode_nodes, 5);
        assert_eq!(report.ops.constants_collapsed, 1);
        assert_eq!(report.ops.decode_calls, 2);
        assert_eq!(report.ops.decode_rejected, 1);
        assert_eq!(report.rejections.get("unknown_node_kind"), Some(&1));

        metrics_reset_all();
        assert_eq!(metrics_report(), metrics::EventState::default());
    }
}
