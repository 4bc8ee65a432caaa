use std::sync::mpsc::Receiver;

use agent_logging::agent_info;
use jobscout_core::{update, Badge, Effect, Msg, RegistryState, TabId};

/// Where badge effects land. The real browser chrome is not available here,
/// so the default sink logs transitions; tests record them.
pub trait BadgeSink: Send {
    fn set_badge(&mut self, tab_id: TabId, badge: Badge);
    fn clear_badge(&mut self, tab_id: TabId);
}

#[derive(Debug, Default)]
pub struct LogBadgeSink;

impl BadgeSink for LogBadgeSink {
    fn set_badge(&mut self, tab_id: TabId, badge: Badge) {
        agent_info!(
            "tab {tab_id}: badge '{}' color {}",
            badge.text,
            badge.color
        );
    }

    fn clear_badge(&mut self, tab_id: TabId) {
        agent_info!("tab {tab_id}: badge cleared");
    }
}

/// Drives the pure registry state machine and applies its effects.
pub struct RegistryRunner {
    state: RegistryState,
    sink: Box<dyn BadgeSink>,
}

impl RegistryRunner {
    pub fn new(sink: Box<dyn BadgeSink>) -> Self {
        Self {
            state: RegistryState::new(),
            sink,
        }
    }

    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    pub fn apply(&mut self, msg: Msg) {
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        for effect in effects {
            match effect {
                Effect::SetBadge { tab_id, badge } => self.sink.set_badge(tab_id, badge),
                Effect::ClearBadge { tab_id } => self.sink.clear_badge(tab_id),
            }
        }
    }

    /// Applies everything currently queued without blocking.
    pub fn drain(&mut self, rx: &Receiver<Msg>) {
        while let Ok(msg) = rx.try_recv() {
            self.apply(msg);
        }
    }
}
