use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::agent::{AgentConfig, PageAgent};
use crate::types::{AgentEvent, AutofillResult, CandidateProfileView, CommandError, PageState};

/// Commands a control surface can send to one page agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentRequest {
    GetPageInfo,
    /// Re-runs detection synchronously before replying.
    ForceDetect,
    Autofill { profile: CandidateProfileView },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentResponse {
    PageInfo(PageState),
    AutofillDone(AutofillResult),
}

enum AgentCommand {
    Request {
        request: AgentRequest,
        reply_tx: Sender<AgentResponse>,
    },
    DocumentMutated {
        html: String,
    },
}

/// Handle to one page's agent loop. Dropping every handle ends the loop,
/// which is how navigation tears an agent down.
#[derive(Clone)]
pub struct AgentHandle {
    cmd_tx: Sender<AgentCommand>,
}

impl AgentHandle {
    /// Injects an agent for one document: spawns the page's single
    /// cooperative execution context and runs the initial detection, which
    /// broadcasts one summary event on `event_tx`.
    pub fn spawn(
        config: AgentConfig,
        page_url: String,
        document_html: String,
        event_tx: Sender<AgentEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        thread::spawn(move || {
            let agent = PageAgent::new(config, page_url, document_html);
            run_agent_loop(agent, cmd_rx, event_tx);
        });
        Self { cmd_tx }
    }

    /// Sends one command and waits for exactly one reply.
    pub fn request(&self, request: AgentRequest) -> Result<AgentResponse, CommandError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.cmd_tx
            .send(AgentCommand::Request { request, reply_tx })
            .map_err(|_| CommandError::NoReceiver)?;
        reply_rx.recv().map_err(|_| CommandError::Disconnected)
    }

    /// Fire-and-forget mutation signal; detection re-runs once the page
    /// goes quiet.
    pub fn notify_mutation(&self, html: String) {
        let _ = self.cmd_tx.send(AgentCommand::DocumentMutated { html });
    }
}

/// Backstop wakeup when no timer is pending.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

fn run_agent_loop(
    mut agent: PageAgent,
    cmd_rx: Receiver<AgentCommand>,
    event_tx: Sender<AgentEvent>,
) {
    broadcast_detection(&mut agent, &event_tx);

    // One pending deadline each; scheduling again replaces the old one
    // (last-scheduled-wins), nothing is ever cancelled.
    let mut pending_redetect: Option<Instant> = None;
    let mut pending_followup: Option<(Instant, CandidateProfileView)> = None;

    loop {
        let now = Instant::now();
        if pending_redetect.is_some_and(|due| due <= now) {
            pending_redetect = None;
            broadcast_detection(&mut agent, &event_tx);
        }
        if pending_followup.as_ref().is_some_and(|(due, _)| *due <= now) {
            if let Some((_, profile)) = pending_followup.take() {
                // Best-effort second pass for conditionally mounted fields;
                // no second result is surfaced.
                let _ = agent.autofill(&profile);
            }
        }

        let timeout = next_timeout(
            pending_redetect,
            pending_followup.as_ref().map(|(due, _)| *due),
        );
        match cmd_rx.recv_timeout(timeout) {
            Ok(AgentCommand::Request { request, reply_tx }) => match request {
                AgentRequest::GetPageInfo => {
                    let _ = reply_tx.send(AgentResponse::PageInfo(agent.snapshot()));
                }
                AgentRequest::ForceDetect => {
                    broadcast_detection(&mut agent, &event_tx);
                    let _ = reply_tx.send(AgentResponse::PageInfo(agent.snapshot()));
                }
                AgentRequest::Autofill { profile } => {
                    let result = agent.autofill(&profile);
                    let due = Instant::now() + agent.config().second_pass_delay;
                    pending_followup = Some((due, profile));
                    let _ = reply_tx.send(AgentResponse::AutofillDone(result));
                }
            },
            Ok(AgentCommand::DocumentMutated { html }) => {
                agent.replace_document(html);
                pending_redetect = Some(Instant::now() + agent.config().debounce_quiet_period);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn next_timeout(redetect: Option<Instant>, followup: Option<Instant>) -> Duration {
    let now = Instant::now();
    [redetect, followup]
        .into_iter()
        .flatten()
        .min()
        .map(|deadline| deadline.saturating_duration_since(now))
        .unwrap_or(IDLE_TIMEOUT)
        .min(IDLE_TIMEOUT)
}

fn broadcast_detection(agent: &mut PageAgent, event_tx: &Sender<AgentEvent>) {
    let is_job = agent.detect();
    let _ = event_tx.send(AgentEvent::Detection { is_job });
}
