use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use agent_logging::{agent_info, agent_warn};
use jobscout_agent::{
    AgentConfig, AgentEvent, AgentHandle, AgentRequest, AgentResponse, CommandError,
};
use jobscout_core::{Msg, TabId};

/// Milliseconds since the Unix epoch, injected so tests stay deterministic.
pub type EpochClock = Arc<dyn Fn() -> u64 + Send + Sync>;

const DEFAULT_REINJECT_DELAY: Duration = Duration::from_millis(300);

/// One open tab: its loaded document, plus the page agent injected into it
/// (absent for tabs that predate the capability being installed).
struct TabSession {
    page_url: String,
    document_html: String,
    agent: Option<AgentHandle>,
}

/// Owns every open tab and routes commands to their page agents.
///
/// Detection broadcasts are pumped into the registry channel tagged with the
/// originating tab id.
pub struct TabHost {
    config: AgentConfig,
    registry_tx: Sender<Msg>,
    clock: EpochClock,
    reinject_delay: Duration,
    tabs: HashMap<TabId, TabSession>,
}

impl TabHost {
    pub fn new(config: AgentConfig, registry_tx: Sender<Msg>, clock: EpochClock) -> Self {
        Self {
            config,
            registry_tx,
            clock,
            reinject_delay: DEFAULT_REINJECT_DELAY,
            tabs: HashMap::new(),
        }
    }

    pub fn with_reinject_delay(mut self, delay: Duration) -> Self {
        self.reinject_delay = delay;
        self
    }

    /// Opens a tab on a loaded document and injects the page agent, as
    /// happens on any normal page load.
    pub fn open_tab(&mut self, tab_id: TabId, page_url: String, document_html: String) {
        self.open_tab_uninjected(tab_id, page_url, document_html);
        let _ = self.inject(tab_id);
    }

    /// Opens a tab without an agent: the tab was already open before the
    /// capability was installed. Commands to it hit the re-inject path.
    pub fn open_tab_uninjected(&mut self, tab_id: TabId, page_url: String, document_html: String) {
        self.tabs.insert(
            tab_id,
            TabSession {
                page_url,
                document_html,
                agent: None,
            },
        );
    }

    /// The tab begins loading a new document. The old agent is torn down
    /// (dropping its handle ends its loop), the registry clears the badge,
    /// and a fresh agent is injected into the new document.
    pub fn navigate(&mut self, tab_id: TabId, page_url: String, document_html: String) {
        let _ = self.registry_tx.send(Msg::NavigationStarted { tab_id });
        self.open_tab(tab_id, page_url, document_html);
    }

    pub fn close_tab(&mut self, tab_id: TabId) {
        self.tabs.remove(&tab_id);
        let _ = self.registry_tx.send(Msg::TabClosed { tab_id });
    }

    /// The tab's document re-rendered; the agent re-detects after its quiet
    /// period.
    pub fn notify_mutation(&mut self, tab_id: TabId, document_html: String) {
        if let Some(session) = self.tabs.get_mut(&tab_id) {
            session.document_html = document_html.clone();
            if let Some(agent) = session.agent.as_ref() {
                agent.notify_mutation(document_html);
            }
        }
    }

    pub fn page_url(&self, tab_id: TabId) -> Option<&str> {
        self.tabs.get(&tab_id).map(|session| session.page_url.as_str())
    }

    /// Sends one command and awaits exactly one reply. On a typed
    /// no-receiver failure the agent is injected on demand and the command
    /// retried exactly once; any second failure is surfaced verbatim.
    pub fn send_command(
        &mut self,
        tab_id: TabId,
        request: AgentRequest,
    ) -> Result<AgentResponse, CommandError> {
        match self.try_send(tab_id, request.clone()) {
            Err(CommandError::NoReceiver) => {
                agent_info!("tab {tab_id}: no receiver, injecting agent and retrying once");
                self.inject(tab_id)?;
                thread::sleep(self.reinject_delay);
                self.try_send(tab_id, request).inspect_err(|err| {
                    agent_warn!("tab {tab_id}: retry after injection failed: {err}");
                })
            }
            other => other,
        }
    }

    fn try_send(
        &self,
        tab_id: TabId,
        request: AgentRequest,
    ) -> Result<AgentResponse, CommandError> {
        let session = self.tabs.get(&tab_id).ok_or(CommandError::NoReceiver)?;
        let agent = session.agent.as_ref().ok_or(CommandError::NoReceiver)?;
        agent.request(request)
    }

    fn inject(&mut self, tab_id: TabId) -> Result<(), CommandError> {
        let registry_tx = self.registry_tx.clone();
        let clock = self.clock.clone();
        let session = self.tabs.get_mut(&tab_id).ok_or(CommandError::NoReceiver)?;

        let (event_tx, event_rx) = mpsc::channel();
        let handle = AgentHandle::spawn(
            self.config.clone(),
            session.page_url.clone(),
            session.document_html.clone(),
            event_tx,
        );
        session.agent = Some(handle);

        // Pump this agent's broadcasts into the registry, tagged with the
        // tab id. The thread ends when the agent loop drops its sender.
        thread::spawn(move || {
            agent_logging::set_active_tab(tab_id);
            while let Ok(event) = event_rx.recv() {
                let AgentEvent::Detection { is_job } = event;
                let _ = registry_tx.send(Msg::DetectionReported {
                    tab_id,
                    is_job,
                    observed_at: clock(),
                });
            }
        });
        Ok(())
    }
}
