use std::sync::Once;

use jobscout_core::{update, Badge, Effect, Msg, RegistryState, TabState, TabVerdict};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(agent_logging::initialize_for_tests);
}

fn report(state: RegistryState, tab_id: u64, is_job: bool, at: u64) -> (RegistryState, Vec<Effect>) {
    update(
        state,
        Msg::DetectionReported {
            tab_id,
            is_job,
            observed_at: at,
        },
    )
}

#[test]
fn detection_creates_entry_and_sets_job_badge() {
    init_logging();
    let state = RegistryState::new();

    let (state, effects) = report(state, 7, true, 1_000);

    assert_eq!(
        state.verdict(7),
        TabVerdict::Observed(TabState {
            is_job: true,
            observed_at: 1_000,
        })
    );
    assert_eq!(
        effects,
        vec![Effect::SetBadge {
            tab_id: 7,
            badge: Badge::job(),
        }]
    );
    assert_eq!(state.view().job_tab_count, 1);
}

#[test]
fn negative_detection_sets_empty_badge() {
    init_logging();
    let state = RegistryState::new();

    let (state, effects) = report(state, 3, false, 2_000);

    assert_eq!(
        state.verdict(3),
        TabVerdict::Observed(TabState {
            is_job: false,
            observed_at: 2_000,
        })
    );
    assert_eq!(
        effects,
        vec![Effect::SetBadge {
            tab_id: 3,
            badge: Badge::empty(),
        }]
    );
    assert_eq!(state.view().job_tab_count, 0);
}

#[test]
fn repeated_detection_replaces_previous_state() {
    init_logging();
    let state = RegistryState::new();
    let (state, _) = report(state, 7, true, 1_000);

    // A re-render flipped the verdict; the newer broadcast wins.
    let (state, effects) = report(state, 7, false, 5_000);

    assert_eq!(
        state.verdict(7),
        TabVerdict::Observed(TabState {
            is_job: false,
            observed_at: 5_000,
        })
    );
    assert_eq!(state.tab_count(), 1);
    assert_eq!(
        effects,
        vec![Effect::SetBadge {
            tab_id: 7,
            badge: Badge::empty(),
        }]
    );
}

#[test]
fn navigation_resets_verdict_and_clears_badge() {
    init_logging();
    let state = RegistryState::new();
    let (state, _) = report(state, 7, true, 1_000);

    let (state, effects) = update(state, Msg::NavigationStarted { tab_id: 7 });

    assert_eq!(state.verdict(7), TabVerdict::Unknown);
    assert_eq!(state.tab_count(), 1);
    assert_eq!(effects, vec![Effect::ClearBadge { tab_id: 7 }]);
    assert_eq!(state.view().job_tab_count, 0);
}

#[test]
fn navigation_on_untracked_tab_clears_badge_without_creating_entry() {
    init_logging();
    let state = RegistryState::new();

    let (state, effects) = update(state, Msg::NavigationStarted { tab_id: 42 });

    assert_eq!(state.tab_count(), 0);
    assert_eq!(effects, vec![Effect::ClearBadge { tab_id: 42 }]);
}

#[test]
fn tab_close_removes_entry() {
    init_logging();
    let state = RegistryState::new();
    let (state, _) = report(state, 7, true, 1_000);
    let (state, _) = report(state, 8, false, 1_100);

    let (state, effects) = update(state, Msg::TabClosed { tab_id: 7 });

    assert_eq!(state.tab_count(), 1);
    assert_eq!(state.verdict(7), TabVerdict::Unknown);
    assert!(effects.is_empty());
}

#[test]
fn detection_after_close_recreates_entry() {
    init_logging();
    let state = RegistryState::new();
    let (state, _) = report(state, 7, true, 1_000);
    let (state, _) = update(state, Msg::TabClosed { tab_id: 7 });

    let (state, _) = report(state, 7, true, 9_000);

    assert_eq!(
        state.verdict(7),
        TabVerdict::Observed(TabState {
            is_job: true,
            observed_at: 9_000,
        })
    );
}

#[test]
fn view_lists_tabs_in_id_order() {
    init_logging();
    let state = RegistryState::new();
    let (state, _) = report(state, 9, true, 1_000);
    let (state, _) = report(state, 2, false, 1_001);
    let (state, _) = report(state, 5, true, 1_002);

    let view = state.view();
    let ids: Vec<u64> = view.tabs.iter().map(|row| row.tab_id).collect();
    assert_eq!(ids, vec![2, 5, 9]);
    assert_eq!(view.job_tab_count, 2);
}
