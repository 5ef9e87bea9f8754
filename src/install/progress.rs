//! Per-component progress events

use std::fmt;
use tokio::sync::mpsc;
use tracing::trace;

/// Install state of one component.
///
/// `Pending -> Resolving -> (CacheHit | Fetching) -> Writing -> (Installed | Failed)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentPhase {
    Pending,
    Resolving,
    CacheHit,
    Fetching,
    Writing,
    Installed,
    Failed,
}

impl ComponentPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Installed | Self::Failed)
    }
}

impl fmt::Display for ComponentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Resolving => "resolving",
            Self::CacheHit => "cached",
            Self::Fetching => "fetching",
            Self::Writing => "writing",
            Self::Installed => "installed",
            Self::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// A component entering a phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// 1-based position of the component in the install plan
    pub current: usize,
    pub total: usize,
    pub component: String,
    pub phase: ComponentPhase,
}

/// Non-blocking event sender; events are dropped when the channel is full
#[derive(Debug, Clone, Default)]
pub(crate) struct ProgressSink {
    tx: Option<mpsc::Sender<ProgressEvent>>,
    total: usize,
}

impl ProgressSink {
    pub(crate) fn new(tx: Option<mpsc::Sender<ProgressEvent>>, total: usize) -> Self {
        Self { tx, total }
    }

    pub(crate) fn emit(&self, index: usize, component: &str, phase: ComponentPhase) {
        let Some(tx) = &self.tx else {
            return;
        };
        let event = ProgressEvent {
            current: index + 1,
            total: self.total,
            component: component.to_string(),
            phase,
        };
        if tx.try_send(event).is_err() {
            trace!("Dropped progress event for {} ({})", component, phase);
        }
    }
}
