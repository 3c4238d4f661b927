use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;

use atm_common::config::AtmConfig;
use atm_common::session::{self, Session, StateSink};
use atm_common::state::{AtmEvent, AtmState};
use atm_common::view::Screen;

use crate::chain::SimulatedChain;
use crate::{init_tracing, ALICE};

/// Sink that keeps the latest snapshot plus a full trace of what happened.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub state: AtmState,
    pub events: Vec<AtmEvent>,
    pub alerts: Vec<String>,
    /// Loading flag after each event, aligned with `events`.
    pub loading: Vec<bool>,
}

impl StateSink for RecordingSink {
    fn emit(&mut self, event: AtmEvent) {
        self.state = self.state.apply(event.clone());
        self.loading.push(self.state.is_loading());
        self.events.push(event);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

impl RecordingSink {
    pub fn count(&self, matches: impl Fn(&AtmEvent) -> bool) -> usize {
        self.events.iter().filter(|e| matches(e.unbound())).count()
    }

    /// Index of the first event matching, if any.
    pub fn position(&self, matches: impl Fn(&AtmEvent) -> bool) -> Option<usize> {
        self.events.iter().position(|e| matches(e.unbound()))
    }

    pub fn screen(&self, config: &AtmConfig) -> Screen {
        Screen::from_state(&self.state, config, &Utc)
    }

    /// Forget the trace but keep the current snapshot.
    pub fn clear_trace(&mut self) {
        self.events.clear();
        self.alerts.clear();
        self.loading.clear();
    }
}

/// One recording sink driven by several concurrent flows on the same task.
#[derive(Clone, Debug, Default)]
pub struct SharedSink(Rc<RefCell<RecordingSink>>);

impl SharedSink {
    pub fn new(sink: RecordingSink) -> Self {
        Self(Rc::new(RefCell::new(sink)))
    }

    pub fn state(&self) -> AtmState {
        self.0.borrow().state.clone()
    }

    pub fn into_inner(self) -> RecordingSink {
        Rc::try_unwrap(self.0)
            .map(RefCell::into_inner)
            .unwrap_or_else(|shared| shared.borrow().clone())
    }
}

impl StateSink for SharedSink {
    fn emit(&mut self, event: AtmEvent) {
        self.0.borrow_mut().emit(event);
    }

    fn alert(&mut self, message: &str) {
        self.0.borrow_mut().alert(message);
    }
}

/// A page talking to a simulated wallet whose only account is [`ALICE`].
pub struct Harness {
    pub chain: SimulatedChain,
    pub config: AtmConfig,
    pub sink: RecordingSink,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let config = AtmConfig::default();
        Self {
            chain: SimulatedChain::new(config.contract_address, vec![ALICE]),
            config,
            sink: RecordingSink::default(),
        }
    }

    /// Page load, "connect" click, contract binding, and initial load.
    pub async fn connect(&mut self) -> Session<SimulatedChain> {
        session::discover(Some(&self.chain), &mut self.sink).await;
        let account = session::connect(Some(&self.chain), &mut self.sink)
            .await
            .expect("authorization should succeed");
        let binding = self.sink.state.binding;
        let bound = Session::bind(self.chain.clone(), account, binding, &self.config);
        bound.load(&mut self.sink).await;
        bound
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
