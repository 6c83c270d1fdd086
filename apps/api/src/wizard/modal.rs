//! Confirmation modals gating irreversible actions.
//!
//! A gate is a visibility flag plus an optional sub-flow `S`. Opening never
//! writes anything; writes only happen from an in-modal confirmation handled
//! by the owning page. Closing always resets the sub-flow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalKind {
    StartInterview,
    FinishInterview,
    Publish,
    /// Progress overlay while a save is in flight.
    Saving,
    TrainAi,
    LeaveEditor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// An explicit in-modal control.
    #[default]
    Control,
    Escape,
    Backdrop,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    #[error("{0:?} modal is not open")]
    NotOpen(ModalKind),

    #[error("{0:?} modal cannot be dismissed with escape")]
    EscapeDisabled(ModalKind),

    #[error("{action} is not available in the {kind:?} modal while it is {state}")]
    InvalidState {
        kind: ModalKind,
        state: &'static str,
        action: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct ModalGate<S = ()> {
    kind: ModalKind,
    open: bool,
    close_on_esc: bool,
    flow: S,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModalView<V> {
    pub open: bool,
    pub close_on_esc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<V>,
}

impl<S: Default> ModalGate<S> {
    pub fn new(kind: ModalKind, close_on_esc: bool) -> Self {
        Self {
            kind,
            open: false,
            close_on_esc,
            flow: S::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opening an already open modal keeps its current sub-flow.
    pub fn open(&mut self) {
        if !self.open {
            self.flow = S::default();
            self.open = true;
        }
    }

    pub fn close(&mut self, reason: CloseReason) -> Result<(), ModalError> {
        if !self.open {
            return Err(ModalError::NotOpen(self.kind));
        }
        if reason != CloseReason::Control && !self.close_on_esc {
            return Err(ModalError::EscapeDisabled(self.kind));
        }
        self.open = false;
        self.flow = S::default();
        Ok(())
    }

    pub fn require_open(&self) -> Result<(), ModalError> {
        if self.open {
            Ok(())
        } else {
            Err(ModalError::NotOpen(self.kind))
        }
    }

    pub fn flow(&self) -> &S {
        &self.flow
    }

    /// Mutable access to the sub-flow; only while the modal is open.
    pub fn flow_mut(&mut self) -> Result<&mut S, ModalError> {
        self.require_open()?;
        Ok(&mut self.flow)
    }

    pub fn view_with<V>(&self, flow: impl FnOnce(&S) -> V) -> ModalView<V> {
        ModalView {
            open: self.open,
            close_on_esc: self.close_on_esc,
            flow: self.open.then(|| flow(&self.flow)),
        }
    }
}

impl ModalGate<()> {
    pub fn view(&self) -> ModalView<()> {
        ModalView {
            open: self.open,
            close_on_esc: self.close_on_esc,
            flow: None,
        }
    }
}
