use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for encode/decode calls.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    /// Rejections keyed by stable error-kind label.
    pub rejections: BTreeMap<String, u64>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Encoder
    pub encode_calls: u64,
    pub encode_rejected: u64,
    pub encode_nodes: u64,
    pub constants_collapsed: u64,

    // Decoder
    pub decode_calls: u64,
    pub decode_rejected: u64,
    pub decode_nodes: u64,
    pub decode_parameters: u64,
}

///
/// EventReport
/// Point-in-time copy of the counters.
///

pub type EventReport = EventState;

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn report() -> EventReport {
    with_state(Clone::clone)
}

pub(crate) fn count_rejection(m: &mut EventState, kind: &str) {
    let entry = m.rejections.entry(kind.to_string()).or_default();
    *entry = entry.saturating_add(1);
}
