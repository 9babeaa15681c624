use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModalId {
    DeleteConfirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    Button,
    Backdrop,
}

/// Tracks open overlays. Background scrolling is locked exactly while at
/// least one modal is open, so every close path releases the lock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ModalController {
    open: BTreeSet<ModalId>,
}

impl ModalController {
    pub(crate) fn open(&mut self, modal: ModalId) -> bool {
        self.open.insert(modal)
    }

    pub(crate) fn close(&mut self, modal: ModalId) -> bool {
        self.open.remove(&modal)
    }

    pub(crate) fn is_open(&self, modal: ModalId) -> bool {
        self.open.contains(&modal)
    }

    pub(crate) fn scroll_locked(&self) -> bool {
        !self.open.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ModalController, ModalId};

    #[test]
    fn scroll_lock_follows_open_modals() {
        let mut modals = ModalController::default();
        assert!(!modals.scroll_locked());

        assert!(modals.open(ModalId::DeleteConfirm));
        assert!(!modals.open(ModalId::DeleteConfirm));
        assert!(modals.scroll_locked());

        assert!(modals.close(ModalId::DeleteConfirm));
        assert!(!modals.scroll_locked());
        assert!(!modals.close(ModalId::DeleteConfirm));
    }
}
