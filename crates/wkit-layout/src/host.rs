#![forbid(unsafe_code)]

//! Host seam for session-scoped global listeners.

use std::cell::RefCell;
use std::rc::Rc;

use wkit_core::{ListenerCommand, PointerKind};

/// Applies listener commands to the rendering surface.
///
/// In a browser this adds or removes document-level move/up listeners.
pub trait ListenerHost {
    fn apply(&mut self, command: ListenerCommand);
}

impl<H: ListenerHost + ?Sized> ListenerHost for Box<H> {
    fn apply(&mut self, command: ListenerCommand) {
        (**self).apply(command);
    }
}

/// Host that ignores every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListenerHost;

impl ListenerHost for NoopListenerHost {
    fn apply(&mut self, _command: ListenerCommand) {}
}

/// Host that records every command it receives.
///
/// Clones share one log, so a test can keep a handle while the controller
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingListenerHost {
    log: Rc<RefCell<Vec<ListenerCommand>>>,
}

impl RecordingListenerHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> Vec<ListenerCommand> {
        self.log.borrow().clone()
    }

    /// Listener sets currently attached for `kind` (attaches minus detaches).
    #[must_use]
    pub fn attached(&self, kind: PointerKind) -> i64 {
        self.log.borrow().iter().fold(0, |acc, cmd| match *cmd {
            ListenerCommand::Attach { kind: k } if k == kind => acc + 1,
            ListenerCommand::Detach { kind: k } if k == kind => acc - 1,
            _ => acc,
        })
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl ListenerHost for RecordingListenerHost {
    fn apply(&mut self, command: ListenerCommand) {
        self.log.borrow_mut().push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_log() {
        let recorder = RecordingListenerHost::new();
        let mut host = recorder.clone();
        host.apply(ListenerCommand::Attach {
            kind: PointerKind::Touch,
        });
        assert_eq!(recorder.attached(PointerKind::Touch), 1);
        assert_eq!(recorder.attached(PointerKind::Mouse), 0);
        host.apply(ListenerCommand::Detach {
            kind: PointerKind::Touch,
        });
        assert_eq!(recorder.attached(PointerKind::Touch), 0);
        assert_eq!(recorder.commands().len(), 2);
    }

    #[test]
    fn boxed_host_forwards() {
        let recorder = RecordingListenerHost::new();
        let mut boxed: Box<dyn ListenerHost> = Box::new(recorder.clone());
        boxed.apply(ListenerCommand::Attach {
            kind: PointerKind::Mouse,
        });
        assert_eq!(recorder.attached(PointerKind::Mouse), 1);
    }
}
