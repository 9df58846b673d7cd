//! Backpressure policy.
//!
//! Readiness interest is a pure function of the current queue state. It is
//! recomputed from scratch before every wait, so no enable/disable toggles
//! can go stale.

/// Which endpoints the event loop should wait on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interest {
    pub read: bool,
    pub write: bool,
}

/// Inputs of the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowState {
    /// The input reached end of stream or failed.
    pub end_of_input: bool,
    /// A shutdown was requested: no new input is accepted.
    pub stopping: bool,
    /// Unwritten bytes currently queued.
    pub buffered: usize,
    /// Maximum bytes that may be queued.
    pub ceiling: usize,
    /// Number of queued chunks.
    pub queued_chunks: usize,
}

/// Input is wanted while the stream is open, no stop is pending and there
/// is headroom below the ceiling. Output is wanted while anything is queued.
pub fn interest(state: &FlowState) -> Interest {
    Interest {
        read: !state.end_of_input && !state.stopping && state.buffered < state.ceiling,
        write: state.queued_chunks > 0,
    }
}
