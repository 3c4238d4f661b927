use dioxus::prelude::*;

use atm_common::view::HistoryPanel;

/// One titled list of past deposits or withdrawals.
#[component]
pub fn HistoryView(panel: HistoryPanel) -> Element {
    rsx! {
        section { class: "history",
            h3 { "{panel.title}" }
            if panel.entries.is_empty() {
                p { class: "empty", "{panel.empty_text}" }
            } else {
                ul {
                    for (i, entry) in panel.entries.iter().enumerate() {
                        li { key: "{i}", "{entry}" }
                    }
                }
            }
        }
    }
}
