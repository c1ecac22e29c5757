//! Injected EIP-1193 provider (MetaMask, Bitget, Binance wallet)

use js_sys::{Array, Function, JSON, Object, Promise, Reflect};
use referral_client::wallet::{ProviderFailure, WalletEvent, WalletProvider, parse_quantity};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Globals a wallet may inject, in lookup order
const PROVIDER_GLOBALS: [&str; 2] = ["ethereum", "BinanceChain"];

#[derive(Clone)]
pub struct InjectedWallet {
    ethereum: JsValue,
}

impl InjectedWallet {
    /// `window.ethereum`, falling back to `window.BinanceChain`
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        PROVIDER_GLOBALS.iter().find_map(|key| {
            let value = Reflect::get(&window, &JsValue::from_str(key)).ok()?;
            (!value.is_undefined() && !value.is_null()).then(|| {
                debug!(global = key, "Wallet provider detected");
                Self { ethereum: value }
            })
        })
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    /// `ethereum.request({ method, params })`
    pub async fn request(&self, method: &str, params: Value) -> Result<JsValue, ProviderFailure> {
        let request = self
            .method("request")
            .ok_or_else(|| ProviderFailure::new("Wallet does not support request()"))?;

        let args = Object::new();
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method)).map_err(failure_from_js)?;
        let params = JSON::parse(&params.to_string()).map_err(failure_from_js)?;
        Reflect::set(&args, &JsValue::from_str("params"), &params).map_err(failure_from_js)?;

        let promise: Promise = request
            .call1(&self.ethereum, &args)
            .map_err(failure_from_js)?
            .dyn_into()
            .map_err(failure_from_js)?;
        JsFuture::from(promise).await.map_err(failure_from_js)
    }

    /// [`InjectedWallet::request`] with the result decoded from JSON
    pub async fn request_json<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ProviderFailure> {
        let value = self.request(method, params).await?;
        let text = if value.is_undefined() {
            "null".to_string()
        } else {
            JSON::stringify(&value).map(String::from).map_err(failure_from_js)?
        };
        serde_json::from_str(&text).map_err(|e| ProviderFailure::new(format!("Unexpected {} response: {}", method, e)))
    }
}

/// Pull code and every candidate message out of a thrown JS value
fn failure_from_js(error: JsValue) -> ProviderFailure {
    let field = |target: &JsValue, key: &str| Reflect::get(target, &JsValue::from_str(key)).ok();
    let text = |target: &JsValue, key: &str| field(target, key).and_then(|v| v.as_string());
    let nested = |key: &str| field(&error, key).filter(JsValue::is_object);

    ProviderFailure {
        code: field(&error, "code").and_then(|v| v.as_f64()).map(|c| c as i64),
        nested_message: nested("error").and_then(|e| text(&e, "message")),
        data_message: nested("data").and_then(|d| text(&d, "message")),
        reason: text(&error, "reason"),
        message: text(&error, "message"),
        raw: error.as_string().unwrap_or_else(|| format!("{:?}", error)),
    }
}

impl WalletProvider for InjectedWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderFailure> {
        self.request_json("eth_requestAccounts", json!([])).await
    }

    async fn chain_id(&self) -> Result<u64, ProviderFailure> {
        let hex: String = self.request_json("eth_chainId", json!([])).await?;
        parse_quantity(&hex)
    }

    fn can_switch_network(&self) -> bool {
        self.method("request").is_some()
    }

    async fn switch_network(&self, chain_id: u64) -> Result<(), ProviderFailure> {
        let params = json!([{ "chainId": format!("0x{:x}", chain_id) }]);
        self.request("wallet_switchEthereumChain", params).await.map(|_| ())
    }

    fn subscribe(&self, listener: Rc<dyn Fn(WalletEvent)>) {
        let Some(on) = self.method("on") else {
            warn!("Wallet does not emit change events");
            return;
        };

        let accounts_listener = Rc::clone(&listener);
        let accounts = Closure::<dyn Fn(JsValue)>::new(move |value: JsValue| {
            let accounts = Array::from(&value).iter().filter_map(|v| v.as_string()).collect();
            accounts_listener(WalletEvent::AccountsChanged(accounts));
        });
        let chain = Closure::<dyn Fn(JsValue)>::new(move |value: JsValue| {
            let chain_id = value.as_string().and_then(|hex| parse_quantity(&hex).ok());
            listener(WalletEvent::ChainChanged(chain_id));
        });

        for (event, handler) in [("accountsChanged", &accounts), ("chainChanged", &chain)] {
            if let Err(e) = on.call2(&self.ethereum, &JsValue::from_str(event), handler.as_ref()) {
                warn!(event, error = ?e, "Could not register wallet listener");
            }
        }

        // Registered for the page lifetime
        accounts.forget();
        chain.forget();
    }
}
