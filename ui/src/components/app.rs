use dioxus::prelude::*;

use atm_common::config::AtmConfig;
use atm_common::session::{self, Session, StateSink};
use atm_common::state::{AtmEvent, AtmState, WriteKind};
use atm_common::view::{Screen, CONNECT_PROMPT, INSTALL_PROMPT, PAGE_TITLE};

use super::atm_state::SignalSink;
use super::browser_wallet::BrowserWallet;
use super::confetti_overlay::ConfettiOverlay;
use super::dashboard_view::{DashboardView, ErrorBanner};

const STYLE: &str = r#"
.container { text-align: center; background-color: pink; min-height: 100vh; padding: 1rem; }
.container button { margin: 0.25rem; padding: 0.5rem 1rem; }
.error-banner { background: #fff3f3; border: 1px solid #d33; margin: 0.5rem auto; max-width: 40rem; padding: 0.5rem; }
.history { display: inline-block; margin: 0 1rem; text-align: left; vertical-align: top; }
.confetti { position: fixed; left: 50%; pointer-events: none; width: 0; height: 0; }
.confetti span { position: absolute; border-radius: 2px; animation-name: confetti-fly; animation-fill-mode: forwards; animation-timing-function: cubic-bezier(0.1, 0.8, 0.3, 1); }
@keyframes confetti-fly {
  from { transform: translate(0, 0) rotate(0deg); opacity: 1; }
  to { transform: translate(var(--dx), var(--dy)) rotate(540deg); opacity: 0; }
}
"#;

#[component]
pub fn App() -> Element {
    let state = use_context_provider(|| Signal::new(AtmState::new()));
    let wallet = use_hook(BrowserWallet::detect);
    let config = use_hook(AtmConfig::default);
    let mut session = use_signal(|| None::<Session<BrowserWallet>>);

    // Discover the wallet once and follow account switches.
    let discovery_wallet = wallet.clone();
    use_future(move || {
        let wallet = discovery_wallet.clone();
        async move {
            let mut sink = SignalSink::new(state);
            session::discover(wallet.as_ref(), &mut sink).await;
            if let Some(wallet) = wallet {
                wallet.on_accounts_changed(move |accounts| {
                    let mut sink = SignalSink::new(state);
                    session::adopt_first_account(&accounts, &mut sink);
                });
            }
        }
    });

    // Rebind the contract whenever the active account changes.
    let account = use_memo(move || state.read().account);
    let bind_wallet = wallet.clone();
    let bind_config = config.clone();
    use_effect(move || {
        let (Some(account), Some(wallet)) = (account(), bind_wallet.clone()) else {
            session.set(None);
            return;
        };
        let binding = state.peek().binding;
        let bound = match session.peek().as_ref() {
            Some(previous) => previous.rebind(account, binding),
            None => Session::bind(wallet, account, binding, &bind_config),
        };
        session.set(Some(bound.clone()));
        spawn(async move {
            let mut sink = SignalSink::new(state);
            bound.load(&mut sink).await;
        });
    });

    let connect_wallet = wallet.clone();
    let on_connect = move |_| {
        let wallet = connect_wallet.clone();
        spawn(async move {
            let mut sink = SignalSink::new(state);
            if let Err(err) = session::connect(wallet.as_ref(), &mut sink).await {
                tracing::debug!("connect did not complete: {err}");
            }
        });
    };

    let write = move |kind: WriteKind| {
        let Some(bound) = session.peek().clone() else {
            tracing::warn!("{} clicked before the contract was bound", kind.label());
            return;
        };
        spawn(async move {
            let mut sink = SignalSink::new(state);
            bound.submit(kind, &mut sink).await;
        });
    };

    let screen = Screen::from_state(&state.read(), &config, &chrono::Local);

    rsx! {
        main { class: "container",
            style { "{STYLE}" }
            header { h1 { "{PAGE_TITLE}" } }
            match screen {
                Screen::InstallPrompt => rsx! {
                    p { "{INSTALL_PROMPT}" }
                },
                Screen::ConnectPrompt { error } => rsx! {
                    if let Some(error) = error {
                        ErrorBanner {
                            message: error,
                            on_dismiss: move |_| SignalSink::new(state).emit(AtmEvent::ErrorDismissed),
                        }
                    }
                    button { onclick: on_connect, "{CONNECT_PROMPT}" }
                },
                Screen::Dashboard(dashboard) => rsx! {
                    DashboardView {
                        dashboard,
                        on_deposit: move |_| write(WriteKind::Deposit),
                        on_withdraw: move |_| write(WriteKind::Withdraw),
                        on_dismiss_error: move |_| SignalSink::new(state).emit(AtmEvent::ErrorDismissed),
                    }
                },
            }
            ConfettiOverlay {}
        }
    }
}
