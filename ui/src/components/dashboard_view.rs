use dioxus::prelude::*;

use atm_common::view::Dashboard;

use super::history_view::HistoryView;

#[component]
pub fn ErrorBanner(message: String, on_dismiss: EventHandler<()>) -> Element {
    rsx! {
        div { class: "error-banner",
            span { "{message}" }
            button { onclick: move |_| on_dismiss.call(()), "Dismiss" }
        }
    }
}

#[component]
pub fn DashboardView(
    dashboard: Dashboard,
    on_deposit: EventHandler<()>,
    on_withdraw: EventHandler<()>,
    on_dismiss_error: EventHandler<()>,
) -> Element {
    let disabled = dashboard.buttons_disabled;

    rsx! {
        div { class: "dashboard",
            if let Some(error) = dashboard.error.clone() {
                ErrorBanner { message: error, on_dismiss: on_dismiss_error }
            }
            p { "{dashboard.account_line}" }
            p { "{dashboard.balance_line}" }
            div { class: "actions",
                button {
                    disabled,
                    onclick: move |_| on_deposit.call(()),
                    "{dashboard.deposit_label}"
                }
                button {
                    disabled,
                    onclick: move |_| on_withdraw.call(()),
                    "{dashboard.withdraw_label}"
                }
            }
            div { class: "histories",
                HistoryView { panel: dashboard.deposits.clone() }
                HistoryView { panel: dashboard.withdrawals.clone() }
            }
        }
    }
}
