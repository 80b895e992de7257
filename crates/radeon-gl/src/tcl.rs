//! # Hardware TCL Mode
//!
//! Whether vertex transform runs on the GPU. A program that fails to
//! translate turns it off until the bound programs change; retrying the
//! same failed translation on every draw would only waste time.
//!
//! ```text
//!            translation failure
//! Enabled ─────────────────────────▶ DisabledUntilStateChange
//!    ▲                                          │
//!    └──────────── program change ──────────────┘
//! ```

use crate::state::NewState;

/// Hardware vertex processing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TclMode {
    /// Draws go to the hardware path
    #[default]
    Enabled,
    /// Every draw falls back until the programs change
    DisabledUntilStateChange,
}

/// TCL mode of one context, with its transition rules
#[derive(Debug, Clone, Default)]
pub struct TclState {
    mode: TclMode,
    disables: u32,
}

impl TclState {
    /// Start with hardware TCL on
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    pub fn mode(&self) -> TclMode {
        self.mode
    }

    /// Whether draws may use the hardware path
    pub fn is_enabled(&self) -> bool {
        self.mode == TclMode::Enabled
    }

    /// Times hardware TCL was turned off
    pub fn disable_count(&self) -> u32 {
        self.disables
    }

    /// A bound program failed to translate
    pub fn disable(&mut self) {
        if self.mode == TclMode::Enabled {
            log::info!("hardware TCL disabled until the programs change");
            self.disables += 1;
        }
        self.mode = TclMode::DisabledUntilStateChange;
    }

    /// State in `changed` was modified. Returns whether hardware TCL came
    /// back on.
    pub fn notify_state_change(&mut self, changed: NewState) -> bool {
        if self.mode == TclMode::DisabledUntilStateChange && changed.contains(NewState::PROGRAM) {
            log::info!("hardware TCL re-enabled");
            self.mode = TclMode::Enabled;
            return true;
        }
        false
    }
}
