use crate::view_model::Badge;
use crate::TabId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Update the per-tab indicator in the browser chrome.
    SetBadge { tab_id: TabId, badge: Badge },
    /// Remove the per-tab indicator while a new document loads.
    ClearBadge { tab_id: TabId },
}
