use std::sync::Once;
use std::time::Duration;

use kbdesk_core::{
    update, AppState, BannerLevel, EmbedProgressReport, EmbedScope, Effect, KbStatus, Msg,
    PollKind, PollSettings, EMBED_PROGRESS_FALLBACK_TEXT, OUT_OF_BAND_POLL_DELAY,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(kbdesk_logging::initialize_for_tests);
}

fn kb_status(state: AppState, raw: &str) -> AppState {
    let (state, effects) = update(state, Msg::KbStatusPolled(Ok(raw.to_string())));
    assert!(effects.is_empty());
    state
}

fn progress(state: AppState, status: &str, percent: Option<i64>, message: Option<&str>) -> AppState {
    let (state, effects) = update(
        state,
        Msg::EmbedProgressPolled(Ok(EmbedProgressReport {
            status: status.to_string(),
            progress: percent,
            message: message.map(str::to_string),
        })),
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn mount_starts_both_loops_and_loads_files() {
    init_logging();
    let settings = PollSettings {
        kb_status_every: Duration::from_secs(3),
        embed_progress_every: Duration::from_millis(1500),
    };
    let state = AppState::new("web-user-test").with_poll_settings(settings);

    let (state, effects) = update(state, Msg::Mounted);
    assert_eq!(
        effects,
        vec![
            Effect::StartPolling {
                poll: PollKind::KbStatus,
                every: Duration::from_secs(3),
            },
            Effect::StartPolling {
                poll: PollKind::EmbedProgress,
                every: Duration::from_millis(1500),
            },
            Effect::RefreshFiles,
        ]
    );
    assert!(state.view().dashboard.mounted);

    // Mounting twice must not spawn duplicate loops.
    let (state, effects) = update(state, Msg::Mounted);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::Unmounted);
    assert_eq!(effects, vec![Effect::StopPolling]);
    let (_state, effects) = update(state, Msg::Unmounted);
    assert!(effects.is_empty());
}

#[test]
fn trigger_is_enabled_only_when_embedding_is_required() {
    init_logging();
    let cases = [
        ("no_files", false, BannerLevel::Info),
        ("requires_embedding", true, BannerLevel::Warning),
        ("active", false, BannerLevel::Success),
    ];
    for (raw, enabled, level) in cases {
        let state = kb_status(AppState::new("web-user-test"), raw);
        let view = state.view().dashboard;
        assert_eq!(view.embed_enabled, enabled, "status {raw}");
        assert_eq!(view.kb_banner.unwrap().level, level, "status {raw}");
    }
}

#[test]
fn no_files_disables_trigger_with_info_message() {
    init_logging();
    let state = kb_status(AppState::new("web-user-test"), "requires_embedding");
    let mut state = kb_status(state, "no_files");

    let view = state.view().dashboard;
    assert_eq!(view.kb_status, Some(KbStatus::NoFiles));
    assert!(!view.embed_enabled);
    let banner = view.kb_banner.unwrap();
    assert_eq!(banner.level, BannerLevel::Info);
    assert_eq!(banner.text, "No files uploaded yet. Upload files first.");
    assert!(state.consume_dirty());
}

#[test]
fn unknown_status_is_ignored() {
    init_logging();
    let mut state = kb_status(AppState::new("web-user-test"), "requires_embedding");
    assert!(state.consume_dirty());

    let mut state = kb_status(state, "reindexing");
    assert_eq!(state.view().dashboard.kb_status, Some(KbStatus::RequiresEmbedding));
    assert!(state.view().dashboard.embed_enabled);
    assert!(!state.consume_dirty());
}

#[test]
fn poll_failures_leave_state_untouched() {
    init_logging();
    let state = kb_status(AppState::new("web-user-test"), "active");
    let state = progress(state, "running", Some(30), None);
    let mut before = state.clone();
    before.consume_dirty();
    let mut state = state;
    state.consume_dirty();

    let (state, effects) = update(state, Msg::KbStatusPolled(Err("connection refused".into())));
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::EmbedProgressPolled(Err("timeout".into())));
    assert!(effects.is_empty());
    let (mut state, effects) = update(state, Msg::FilesLoaded(Err("http status 500".into())));
    assert!(effects.is_empty());

    assert_eq!(state.view(), before.view());
    assert!(state.view().toasts.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn running_progress_shows_clamped_indicator_and_disables_trigger() {
    init_logging();
    let state = kb_status(AppState::new("web-user-test"), "requires_embedding");
    assert!(state.view().dashboard.embed_enabled);

    let state = progress(state, "running", Some(64), Some("Embedding chunk 64 of 100"));
    let view = state.view().dashboard;
    assert!(view.embed_progress.visible);
    assert_eq!(view.embed_progress.width, 64);
    assert_eq!(view.embed_progress.text, "Embedding chunk 64 of 100");
    assert!(!view.embed_enabled);

    let state = progress(state, "starting", Some(140), None);
    let view = state.view().dashboard;
    assert_eq!(view.embed_progress.width, 100);
    assert_eq!(view.embed_progress.text, EMBED_PROGRESS_FALLBACK_TEXT);

    let state = progress(state, "idle", Some(100), None);
    let view = state.view().dashboard;
    assert!(!view.embed_progress.visible);
    assert_eq!(view.embed_progress.width, 0);
    assert!(view.embed_progress.text.is_empty());
    assert!(view.embed_enabled);
}

#[test]
fn embed_click_submits_and_schedules_one_progress_poll() {
    init_logging();
    let state = kb_status(AppState::new("web-user-test"), "requires_embedding");

    let (state, effects) = update(state, Msg::EmbedClicked { scope: EmbedScope::Changed });
    assert_eq!(
        effects,
        vec![
            Effect::StartEmbedding { scope: EmbedScope::Changed },
            Effect::PollOnce {
                poll: PollKind::EmbedProgress,
                after: OUT_OF_BAND_POLL_DELAY,
            },
        ]
    );
    assert!(!state.view().dashboard.embed_enabled);

    // A second click while the request is pending is ignored.
    let (state, effects) = update(state, Msg::EmbedClicked { scope: EmbedScope::Changed });
    assert!(effects.is_empty());

    let (state, _effects) = update(state, Msg::EmbedFinished { result: Ok(()) });
    assert!(state.view().dashboard.embed_enabled);
    assert_eq!(state.view().toasts.len(), 1);
}

#[test]
fn embed_click_is_ignored_when_disabled() {
    init_logging();
    let state = kb_status(AppState::new("web-user-test"), "active");
    let (state, effects) = update(state, Msg::EmbedClicked { scope: EmbedScope::Changed });
    assert!(effects.is_empty());

    // Forcing a full re-embed is still possible once files exist.
    let (_state, effects) = update(state, Msg::EmbedClicked { scope: EmbedScope::All });
    assert_eq!(effects[0], Effect::StartEmbedding { scope: EmbedScope::All });

    let state = kb_status(AppState::new("web-user-test"), "no_files");
    let (_state, effects) = update(state, Msg::EmbedClicked { scope: EmbedScope::All });
    assert!(effects.is_empty());
}
