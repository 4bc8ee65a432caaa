use crate::TabId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A page agent broadcast its detection summary for a tab.
    DetectionReported {
        tab_id: TabId,
        is_job: bool,
        /// Milliseconds since the Unix epoch, supplied by the host clock.
        observed_at: u64,
    },
    /// A tab began loading a new document (not: finished loading).
    NavigationStarted { tab_id: TabId },
    /// A tab was closed.
    TabClosed { tab_id: TabId },
    /// Fallback for placeholder wiring.
    NoOp,
}
