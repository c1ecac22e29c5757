//! Page-level browser access: clock, interval timers, URL, clipboard, host config

use anyhow::{Context, Result, anyhow, bail};
use futures::StreamExt;
use futures::future::{AbortHandle, Abortable};
use gloo_timers::future::IntervalStream;
use js_sys::{Function, JSON, Promise, Reflect};
use referral_client::{Clock, Contracts, NetworkConfig, Scheduler};
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::info;
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};

fn js_error(value: JsValue) -> anyhow::Error {
    anyhow!("{:?}", value)
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().context("no window")
}

/// Wall clock from `Date.now()`
#[derive(Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_secs(&self) -> u64 {
        (js_sys::Date::now() / 1000.0) as u64
    }
}

/// Repeating timers on the page's event loop
#[derive(Clone, Copy, Default)]
pub struct IntervalScheduler;

/// Stops the timer when dropped
pub struct TickerHandle(AbortHandle);

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl Scheduler for IntervalScheduler {
    type Handle = TickerHandle;

    fn repeat(&self, period: Duration, mut tick: Box<dyn FnMut() -> ControlFlow<()>>) -> TickerHandle {
        let (handle, registration) = AbortHandle::new_pair();
        let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);

        let ticker = async move {
            let mut ticks = IntervalStream::new(millis);
            while ticks.next().await.is_some() {
                if tick().is_break() {
                    break;
                }
            }
        };
        spawn_local(async move {
            let _ = Abortable::new(ticker, registration).await;
        });

        TickerHandle(handle)
    }
}

pub fn page_url() -> Result<Url> {
    let href = window()?.location().href().map_err(js_error)?;
    Url::parse(&href).with_context(|| format!("unparseable page URL {}", href))
}

/// Contract addresses published by the host page as `window.APP_CONFIG`
pub fn app_config() -> Result<Contracts> {
    let value = Reflect::get(&JsValue::from(window()?), &JsValue::from_str("APP_CONFIG")).map_err(js_error)?;
    if value.is_undefined() || value.is_null() {
        bail!("window.APP_CONFIG is not set");
    }
    let json = String::from(JSON::stringify(&value).map_err(js_error)?);

    let contracts = NetworkConfig::from_json(&json)?.resolve()?;
    info!(chain_id = contracts.chain_id, "Network config loaded");
    Ok(contracts)
}

/// `navigator.clipboard.writeText(text)`
pub async fn copy_text(text: &str) -> Result<()> {
    let navigator = Reflect::get(&JsValue::from(window()?), &JsValue::from_str("navigator")).map_err(js_error)?;
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard")).map_err(js_error)?;
    let write_text: Function = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| anyhow!("clipboard is unavailable"))?;

    let promise: Promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    JsFuture::from(promise).await.map_err(js_error)?;
    Ok(())
}

/// Full page load of `link`
pub fn navigate(link: &str) -> Result<()> {
    window()?.location().set_href(link).map_err(js_error)
}
