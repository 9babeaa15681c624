//! Stacked, auto-dismissing notifications.

use std::time::Duration;

use crate::Effect;

pub type ToastId = u64;

/// Delay before a new toast slides in.
pub const TOAST_REVEAL_DELAY: Duration = Duration::from_millis(100);
/// Time from creation until a toast starts leaving.
pub const TOAST_VISIBLE_FOR: Duration = Duration::from_millis(3500);
/// Length of the exit transition before the toast is removed.
pub const TOAST_EXIT_TRANSITION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Visible,
    Leaving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastTimer {
    Reveal,
    Expire,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    pub phase: ToastPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Notifications {
    next_id: ToastId,
    toasts: Vec<Toast>,
}

impl Notifications {
    /// Appends a toast and returns the timers that drive its lifecycle.
    pub(crate) fn push(&mut self, message: impl Into<String>, kind: ToastKind) -> Vec<Effect> {
        self.next_id += 1;
        let toast_id = self.next_id;
        self.toasts.push(Toast {
            id: toast_id,
            message: message.into(),
            kind,
            phase: ToastPhase::Entering,
        });
        vec![
            Effect::ScheduleToastTimer {
                toast_id,
                timer: ToastTimer::Reveal,
                after: TOAST_REVEAL_DELAY,
            },
            Effect::ScheduleToastTimer {
                toast_id,
                timer: ToastTimer::Expire,
                after: TOAST_VISIBLE_FOR,
            },
        ]
    }

    /// Advances a toast; timers for toasts that are already gone do nothing.
    /// Returns `None` when nothing changed.
    pub(crate) fn on_timer(&mut self, toast_id: ToastId, timer: ToastTimer) -> Option<Vec<Effect>> {
        let index = self.toasts.iter().position(|toast| toast.id == toast_id)?;
        let toast = &mut self.toasts[index];
        match (timer, toast.phase) {
            (ToastTimer::Reveal, ToastPhase::Entering) => {
                toast.phase = ToastPhase::Visible;
                Some(Vec::new())
            }
            (ToastTimer::Expire, ToastPhase::Entering | ToastPhase::Visible) => {
                toast.phase = ToastPhase::Leaving;
                Some(vec![Effect::ScheduleToastTimer {
                    toast_id,
                    timer: ToastTimer::Remove,
                    after: TOAST_EXIT_TRANSITION,
                }])
            }
            (ToastTimer::Remove, _) => {
                self.toasts.remove(index);
                Some(Vec::new())
            }
            _ => None,
        }
    }

    pub(crate) fn close(&mut self, toast_id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != toast_id);
        self.toasts.len() != before
    }

    pub(crate) fn toasts(&self) -> &[Toast] {
        &self.toasts
    }
}
