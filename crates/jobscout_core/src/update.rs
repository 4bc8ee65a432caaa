use crate::{Badge, Effect, Msg, RegistryState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: RegistryState, msg: Msg) -> (RegistryState, Vec<Effect>) {
    let effects = match msg {
        Msg::DetectionReported {
            tab_id,
            is_job,
            observed_at,
        } => {
            state.record_detection(tab_id, is_job, observed_at);
            let badge = if is_job { Badge::job() } else { Badge::empty() };
            vec![Effect::SetBadge { tab_id, badge }]
        }
        Msg::NavigationStarted { tab_id } => {
            // Clear optimistically on load start so a stale positive badge
            // never shows over a page that is still loading.
            state.begin_navigation(tab_id);
            vec![Effect::ClearBadge { tab_id }]
        }
        Msg::TabClosed { tab_id } => {
            state.remove_tab(tab_id);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
