use dioxus::prelude::*;

use atm_common::session::StateSink;
use atm_common::state::{AtmEvent, AtmState};

use super::browser_wallet::blocking_alert;

/// Shared page state, provided at the top of the app.
pub fn use_atm_state() -> Signal<AtmState> {
    use_context::<Signal<AtmState>>()
}

/// Feeds session events into the page signal. Each event replaces the
/// snapshot with the one `AtmState::apply` derives from it.
#[derive(Clone, Copy)]
pub struct SignalSink {
    state: Signal<AtmState>,
}

impl SignalSink {
    pub fn new(state: Signal<AtmState>) -> Self {
        Self { state }
    }
}

impl StateSink for SignalSink {
    fn emit(&mut self, event: AtmEvent) {
        tracing::trace!(?event, "state transition");
        let next = self.state.peek().apply(event);
        self.state.set(next);
    }

    fn alert(&mut self, message: &str) {
        blocking_alert(message);
    }
}
