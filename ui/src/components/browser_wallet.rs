//! EIP-1193 adapter over the wallet injected at `window.ethereum`.

use alloy_primitives::Address;
use serde_json::Value;

use atm_common::error::AtmError;
use atm_common::wallet::Eip1193;

pub use imp::blocking_alert;

/// Handle to the injected wallet. Cheap to clone.
#[derive(Clone, Debug)]
pub struct BrowserWallet {
    #[cfg(target_family = "wasm")]
    ethereum: wasm_bindgen::JsValue,
}

// ─── WASM implementation ────────────────────────────────────────────────────

#[cfg(target_family = "wasm")]
mod imp {
    use js_sys::{Function, Promise, Reflect};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    use atm_common::wallet::parse_accounts;

    use super::*;

    /// Map a rejected promise / thrown value to an RPC error, keeping the
    /// EIP-1193 `code` and `message` when present.
    fn js_error(err: JsValue) -> AtmError {
        let code = Reflect::get(&err, &JsValue::from_str("code"))
            .ok()
            .and_then(|c| c.as_f64())
            .map(|c| c as i64)
            .unwrap_or(-32603);
        let message = Reflect::get(&err, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| format!("{err:?}"));
        AtmError::rpc(code, message)
    }

    fn js_method(target: &JsValue, name: &str) -> Result<Function, AtmError> {
        Reflect::get(target, &JsValue::from_str(name))
            .map_err(js_error)?
            .dyn_into::<Function>()
            .map_err(|_| AtmError::InvalidResponse(format!("wallet has no {name}()")))
    }

    impl BrowserWallet {
        /// The injected provider, if the page has one.
        pub fn detect() -> Option<Self> {
            let window = web_sys::window()?;
            let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
            if ethereum.is_undefined() || ethereum.is_null() {
                return None;
            }
            Some(Self { ethereum })
        }

        /// Call `callback` with the new account list whenever the user
        /// switches accounts in the wallet.
        pub fn on_accounts_changed(&self, mut callback: impl FnMut(Vec<Address>) + 'static) {
            let handler = Closure::<dyn FnMut(JsValue)>::new(move |accounts: JsValue| {
                let parsed = serde_wasm_bindgen::from_value::<Value>(accounts)
                    .map_err(|e| AtmError::InvalidResponse(e.to_string()))
                    .and_then(parse_accounts);
                match parsed {
                    Ok(list) => callback(list),
                    Err(err) => tracing::warn!("ignoring accountsChanged payload: {err}"),
                }
            });
            let subscribed = js_method(&self.ethereum, "on").and_then(|on| {
                on.call2(
                    &self.ethereum,
                    &JsValue::from_str("accountsChanged"),
                    handler.as_ref(),
                )
                .map_err(js_error)
            });
            match subscribed {
                // The listener lives as long as the page.
                Ok(_) => handler.forget(),
                Err(err) => tracing::warn!("could not subscribe to accountsChanged: {err}"),
            }
        }
    }

    impl Eip1193 for BrowserWallet {
        async fn request(&self, method: &str, params: Value) -> Result<Value, AtmError> {
            tracing::debug!(method, "wallet request");
            let payload = serde_json::json!({ "method": method, "params": params });
            let args = js_sys::JSON::parse(&payload.to_string()).map_err(js_error)?;

            let request = js_method(&self.ethereum, "request")?;
            let promise: Promise = request
                .call1(&self.ethereum, &args)
                .map_err(js_error)?
                .dyn_into()
                .map_err(|_| AtmError::InvalidResponse("request() did not return a promise".into()))?;
            let result = JsFuture::from(promise).await.map_err(js_error)?;

            if result.is_undefined() || result.is_null() {
                return Ok(Value::Null);
            }
            serde_wasm_bindgen::from_value(result)
                .map_err(|e| AtmError::InvalidResponse(e.to_string()))
        }

        async fn pause(&self, millis: u32) {
            gloo_timers::future::TimeoutFuture::new(millis).await;
        }
    }

    /// `window.alert`: blocks until the user dismisses it.
    pub fn blocking_alert(message: &str) {
        let shown = web_sys::window().map(|w| w.alert_with_message(message));
        if !matches!(shown, Some(Ok(()))) {
            tracing::warn!("could not show alert: {message}");
        }
    }
}

// Non-WASM stubs for type checking
#[cfg(not(target_family = "wasm"))]
mod imp {
    use super::*;

    impl BrowserWallet {
        pub fn detect() -> Option<Self> {
            None
        }

        pub fn on_accounts_changed(&self, _callback: impl FnMut(Vec<Address>) + 'static) {}
    }

    impl Eip1193 for BrowserWallet {
        async fn request(&self, _method: &str, _params: Value) -> Result<Value, AtmError> {
            Err(AtmError::ProviderAbsent)
        }
    }

    pub fn blocking_alert(message: &str) {
        tracing::warn!("alert: {message}");
    }
}
