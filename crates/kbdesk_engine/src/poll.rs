//! Repeating status polls tied to a cancellation token.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kbdesk_logging::kbdesk_debug;
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{DashboardApi, EngineEvent, EventSink, PollTarget};

/// `tokio::time::interval` panics on a zero period.
const MIN_POLL_PERIOD: Duration = Duration::from_millis(1);

/// Issues one poll for `target` and wraps the reply as an event.
pub async fn poll_target<A>(api: &A, target: PollTarget) -> EngineEvent
where
    A: DashboardApi + ?Sized,
{
    match target {
        PollTarget::KbStatus => EngineEvent::KbStatus(api.kb_status().await),
        PollTarget::EmbedProgress => EngineEvent::EmbedProgress(api.embed_progress().await),
    }
}

/// Polls immediately, then once per `every`, until `token` is cancelled.
///
/// Each request is awaited before the next tick, so one loop never has two
/// requests in flight and its replies arrive in order. Ticks missed while a
/// slow request was pending are delayed rather than fired in a burst.
pub async fn run_poll_loop<A>(
    api: Arc<A>,
    target: PollTarget,
    every: Duration,
    token: CancellationToken,
    sink: Arc<dyn EventSink>,
) where
    A: DashboardApi + ?Sized,
{
    let mut ticker = tokio::time::interval(every.max(MIN_POLL_PERIOD));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let event = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            event = poll_target(api.as_ref(), target) => event,
        };
        sink.emit(event);
    }
    kbdesk_debug!("{:?} poll loop stopped", target);
}

/// The running poll loops of one mounted dashboard.
#[derive(Default)]
pub struct PollLoops {
    running: HashMap<PollTarget, CancellationToken>,
}

impl PollLoops {
    /// Starts a loop for `target`, replacing any loop already running for it.
    pub fn start<A>(
        &mut self,
        runtime: &Handle,
        api: Arc<A>,
        sink: Arc<dyn EventSink>,
        target: PollTarget,
        every: Duration,
    ) where
        A: DashboardApi + ?Sized + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.running.insert(target, token.clone()) {
            previous.cancel();
        }
        kbdesk_debug!("Starting {:?} poll loop every {:?}", target, every);
        runtime.spawn(run_poll_loop(api, target, every, token, sink));
    }

    pub fn stop_all(&mut self) {
        for (_target, token) in self.running.drain() {
            token.cancel();
        }
    }

    pub fn is_running(&self, target: PollTarget) -> bool {
        self.running.contains_key(&target)
    }
}

impl Drop for PollLoops {
    fn drop(&mut self) {
        self.stop_all();
    }
}
