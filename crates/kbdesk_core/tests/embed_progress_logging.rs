use std::sync::atomic::{AtomicUsize, Ordering};

use kbdesk_core::{update, AppState, EmbedProgressReport, Msg};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct WarnCounter {
    warnings: AtomicUsize,
}

impl Log for WarnCounter {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Warn {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn flush(&self) {}
}

static COUNTER: WarnCounter = WarnCounter {
    warnings: AtomicUsize::new(0),
};

fn poll(state: AppState, status: &str, progress: Option<i64>) -> AppState {
    let (state, effects) = update(
        state,
        Msg::EmbedProgressPolled(Ok(EmbedProgressReport {
            status: status.to_string(),
            progress,
            message: None,
        })),
    );
    assert!(effects.is_empty());
    state
}

// Single test in this binary: it owns the global logger.
#[test]
fn finished_run_is_polled_quietly() {
    log::set_logger(&COUNTER).expect("logger");
    log::set_max_level(LevelFilter::Warn);

    let mut state = poll(AppState::new("web-user-test"), "running", Some(60));
    assert!(state.view().dashboard.embed_progress.visible);
    for _ in 0..5 {
        state = poll(state, "done", Some(100));
    }

    assert!(!state.view().dashboard.embed_progress.visible);
    assert_eq!(COUNTER.warnings.load(Ordering::SeqCst), 0);

    poll(state, "paused", None);
    assert_eq!(COUNTER.warnings.load(Ordering::SeqCst), 1);
}
