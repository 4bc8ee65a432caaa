use std::collections::BTreeMap;

use crate::view_model::{RegistryViewModel, TabRowView};

pub type TabId = u64;

/// Last detection verdict observed for one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabState {
    pub is_job: bool,
    /// Milliseconds since the Unix epoch.
    pub observed_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabVerdict {
    /// No detection signal since the tab was opened or last navigated.
    #[default]
    Unknown,
    Observed(TabState),
}

/// Keyed per-tab store. Entries are created on the first detection
/// broadcast, reset to `Unknown` when the tab starts loading a new
/// document, and removed when the tab closes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistryState {
    tabs: BTreeMap<TabId, TabVerdict>,
}

impl RegistryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> RegistryViewModel {
        let tabs: Vec<TabRowView> = self
            .tabs
            .iter()
            .map(|(&tab_id, &verdict)| TabRowView { tab_id, verdict })
            .collect();
        let job_tab_count = tabs
            .iter()
            .filter(|row| matches!(row.verdict, TabVerdict::Observed(state) if state.is_job))
            .count();
        RegistryViewModel {
            tabs,
            job_tab_count,
        }
    }

    pub fn verdict(&self, tab_id: TabId) -> TabVerdict {
        self.tabs.get(&tab_id).copied().unwrap_or_default()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub(crate) fn record_detection(&mut self, tab_id: TabId, is_job: bool, observed_at: u64) {
        self.tabs.insert(
            tab_id,
            TabVerdict::Observed(TabState {
                is_job,
                observed_at,
            }),
        );
    }

    /// Resets an existing entry to `Unknown`. Navigation on a tab the
    /// registry never saw a broadcast for does not create an entry.
    pub(crate) fn begin_navigation(&mut self, tab_id: TabId) {
        if let Some(verdict) = self.tabs.get_mut(&tab_id) {
            *verdict = TabVerdict::Unknown;
        }
    }

    pub(crate) fn remove_tab(&mut self, tab_id: TabId) {
        self.tabs.remove(&tab_id);
    }
}
