#![forbid(unsafe_code)]

//! Install guard for the page-wide widget handle.
//!
//! A page gets at most one live widget. A second install while one is live
//! is a logged no-op; after `take` the slot can be installed again.

use tracing::warn;

use crate::error::InitError;

#[derive(Debug)]
enum SlotState<W> {
    Empty,
    Installed(W),
    Destroyed,
}

#[derive(Debug)]
pub struct WidgetSlot<W> {
    state: SlotState<W>,
}

impl<W> Default for WidgetSlot<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> WidgetSlot<W> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SlotState::Empty,
        }
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        matches!(self.state, SlotState::Installed(_))
    }

    /// Install the widget built by `make`, unless one is already live.
    ///
    /// `make` is not called when the slot is occupied.
    pub fn install(&mut self, make: impl FnOnce() -> W) -> Result<&mut W, InitError> {
        if self.is_installed() {
            warn!("WalletKit widget is already initialized");
            return Err(InitError::AlreadyInitialized);
        }
        self.state = SlotState::Installed(make());
        self.get_mut()
    }

    pub fn get(&self) -> Result<&W, InitError> {
        match &self.state {
            SlotState::Installed(w) => Ok(w),
            SlotState::Empty => Err(InitError::NotInitialized),
            SlotState::Destroyed => Err(InitError::Destroyed),
        }
    }

    pub fn get_mut(&mut self) -> Result<&mut W, InitError> {
        match &mut self.state {
            SlotState::Installed(w) => Ok(w),
            SlotState::Empty => Err(InitError::NotInitialized),
            SlotState::Destroyed => Err(InitError::Destroyed),
        }
    }

    /// Remove the live widget for teardown.
    pub fn take(&mut self) -> Result<W, InitError> {
        match std::mem::replace(&mut self.state, SlotState::Destroyed) {
            SlotState::Installed(w) => Ok(w),
            previous => {
                let err = match previous {
                    SlotState::Empty => InitError::NotInitialized,
                    _ => InitError::Destroyed,
                };
                self.state = previous;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        let mut slot = WidgetSlot::new();
        assert_eq!(slot.install(|| 1).copied(), Ok(1));
        let mut called = false;
        assert_eq!(
            slot.install(|| {
                called = true;
                2
            })
            .copied(),
            Err(InitError::AlreadyInitialized)
        );
        assert!(!called);
        assert_eq!(slot.get().copied(), Ok(1));
    }

    #[test]
    fn take_then_reinstall() {
        let mut slot = WidgetSlot::new();
        assert_eq!(slot.get().copied(), Err(InitError::NotInitialized));
        assert_eq!(slot.take(), Err(InitError::NotInitialized));
        slot.install(|| "a").unwrap();
        assert_eq!(slot.take(), Ok("a"));
        assert_eq!(slot.get().copied(), Err(InitError::Destroyed));
        assert_eq!(slot.take(), Err(InitError::Destroyed));
        assert_eq!(slot.install(|| "b").copied(), Ok("b"));
    }
}
