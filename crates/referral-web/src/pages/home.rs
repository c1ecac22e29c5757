use leptos::prelude::*;
use leptos::task::spawn_local;
use referral_client::address::checksummed;
use referral_client::constants::{LARGE_PRICE_TOKENS, MEDIUM_PRICE_TOKENS, PLACEHOLDER, SMALL_PRICE_TOKENS};
use referral_client::wallet::WalletEvent;
use referral_client::{
    Client, Contracts, CountdownDisplay, DashboardSnapshot, Selection, Session, Side, Tier, UiHooks,
};
use shared::CONFIG;
use std::future::Future;
use std::rc::Rc;
use tracing::{error, warn};
use url::Url;

use crate::components::{KpiGrid, Panel};
use crate::provider::{
    BrowserClock, InjectedWallet, IntervalScheduler, RpcLedger, app_config, copy_text, navigate, page_url,
};

type PageClient = Client<InjectedWallet, RpcLedger, IntervalScheduler, BrowserClock>;

const PACKAGES: [(&str, Tier, u64); 3] = [
    ("S", Tier::Small, SMALL_PRICE_TOKENS),
    ("M", Tier::Medium, MEDIUM_PRICE_TOKENS),
    ("L", Tier::Large, LARGE_PRICE_TOKENS),
];

const BUTTON: &str = "px-3 py-1 border border-[var(--rule)] disabled:opacity-40";

/// What the controls render from; rebuilt from the client after every change
#[derive(Debug, Clone, Default, PartialEq)]
struct PageState {
    session: Session,
    selection: Selection,
    preview: String,
    can_submit: bool,
}

impl PageState {
    fn of(client: &PageClient) -> Self {
        Self {
            session: client.session(),
            selection: client.selection(),
            preview: client.preview_link(),
            can_submit: client.can_submit(),
        }
    }
}

/// Run one client action; a second press while one is in flight is dropped
fn run_action<F, Fut>(
    client: StoredValue<Rc<PageClient>, LocalStorage>,
    busy: RwSignal<bool>,
    set_state: WriteSignal<PageState>,
    action: F,
) where
    F: FnOnce(Rc<PageClient>) -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    if busy.get_untracked() {
        return;
    }
    busy.set(true);

    let client = client.get_value();
    spawn_local(async move {
        action(Rc::clone(&client)).await;
        set_state.set(PageState::of(&client));
        busy.set(false);
    });
}

#[component]
pub fn HomePage() -> impl IntoView {
    let body = match page_url().and_then(|url| Ok((app_config()?, url))) {
        Ok((contracts, url)) => view! { <ReferralDashboard contracts=contracts page_url=url /> }.into_any(),
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "Page setup failed");
            view! {
                <div class="border border-dashed border-[var(--rule)] p-4">
                    "Configuration error: " {message}
                </div>
            }
            .into_any()
        }
    };

    view! {
        <main class="max-w-[80ch] mx-auto px-4 py-8 md:py-12">
            <header class="mb-8 text-center">
                <div class="font-bold">{CONFIG.name}</div>
                <div class="text-[var(--ink-light)] mt-2">{CONFIG.tagline}</div>
            </header>
            {body}
        </main>
    }
}

#[component]
fn ReferralDashboard(contracts: Contracts, page_url: Url) -> impl IntoView {
    let (status, set_status) = signal(String::from("Ready. Connect wallet to start."));
    let (countdown, set_countdown) = signal(PLACEHOLDER.to_string());
    let (snapshot, set_snapshot) = signal(None::<DashboardSnapshot>);
    let busy = RwSignal::new(false);

    let hooks = UiHooks {
        status: Rc::new(move |message: &str| set_status.set(message.to_string())),
        countdown: Rc::new(move |display: &CountdownDisplay| set_countdown.set(display.to_string())),
        snapshot: Rc::new(move |s: &DashboardSnapshot| set_snapshot.set(Some(s.clone()))),
    };
    let wallet = InjectedWallet::detect();
    let ledger = RpcLedger::new(wallet.clone(), contracts);
    let client = Rc::new(Client::new(
        wallet,
        ledger,
        contracts,
        page_url,
        IntervalScheduler,
        BrowserClock,
        hooks,
    ));

    let has_wallet = client.has_wallet();
    let (state, set_state) = signal(PageState::of(&client));
    let (sponsor_text, set_sponsor_text) =
        signal(client.selection().sponsor.map(|a| checksummed(&a)).unwrap_or_default());

    // Notifications are ignored until connected; each one runs as its own task
    let weak = Rc::downgrade(&client);
    client.subscribe(Rc::new(move |event: WalletEvent| {
        let Some(client) = weak.upgrade() else {
            return;
        };
        spawn_local(async move {
            let _ = client.handle_wallet_event(event).await;
            set_state.set(PageState::of(&client));
        });
    }));

    let client = StoredValue::new_local(client);
    let sync = move || client.with_value(|c| set_state.set(PageState::of(c)));

    let connected = move || state.with(|s| s.session.account.is_some());
    let wallet_text = move || {
        state.with(|s| {
            s.session
                .account
                .map(|a| checksummed(&a))
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        })
    };
    let network_text = move || {
        state.with(|s| match s.session.chain_id {
            Some(id) if id == contracts.chain_id => format!("{} ({})", CONFIG.network.name, id),
            Some(id) => format!("chainId {}", id),
            None => PLACEHOLDER.to_string(),
        })
    };

    let copy_link = move |side: Side| {
        let link = client.with_value(|c| c.share_link(side));
        spawn_local(async move {
            match copy_text(&link).await {
                Ok(()) => set_status.set("Copied ✅".to_string()),
                Err(e) => {
                    warn!(error = %e, "Copy failed");
                    set_status.set(format!("Copy failed: {}", e));
                }
            }
        });
    };
    let join_company = move |side: Side| {
        let link = client.with_value(|c| c.company_link(side));
        if let Err(e) = navigate(&link) {
            set_status.set(format!("Navigation failed: {}", e));
        }
    };

    view! {
        // Wallet
        <Panel id="wallet" title="Wallet">
            {(!has_wallet).then(|| view! {
                <div class="text-sm text-[var(--ink-light)]">
                    "No wallet detected. Open this page in a wallet DApp browser."
                </div>
            })}
            <div>
                <button
                    class=BUTTON
                    disabled=move || busy.get()
                    on:click=move |_| {
                        run_action(client, busy, set_state, |c| async move {
                            let _ = c.connect().await;
                        })
                    }
                >
                    "Connect wallet"
                </button>
            </div>
            <div><strong>"WALLET"</strong> "  " {wallet_text}</div>
            <div><strong>"NETWORK"</strong> " " {network_text}</div>
        </Panel>

        // Package
        <Panel id="package" title="Package">
            <div class="flex flex-wrap gap-2">
                {PACKAGES
                    .into_iter()
                    .map(|(code, tier, price)| {
                        view! {
                            <button
                                class=BUTTON
                                class:font-bold=move || state.with(|s| s.selection.tier == Some(tier))
                                on:click=move |_| {
                                    client.with_value(|c| c.choose_package(code));
                                    sync();
                                }
                            >
                                {format!("{} · {} {}", tier.label(), price, CONFIG.token.symbol)}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
            <div>
                <strong>"SELECTED"</strong> " "
                {move || state.with(|s| s.selection.tier.map(Tier::label).unwrap_or(PLACEHOLDER))}
            </div>
        </Panel>

        // Sponsor and side
        <Panel id="sponsor" title="Sponsor" hint="Referral links fill this in; invalid input disables buying.">
            <input
                class="w-full px-2 py-1 border border-[var(--rule)] font-mono"
                placeholder="0x..."
                prop:value=move || sponsor_text.get()
                on:input=move |ev| {
                    let raw = event_target_value(&ev);
                    client.with_value(|c| c.enter_sponsor(&raw));
                    set_sponsor_text.set(raw);
                    sync();
                }
                on:blur=move |_| {
                    if let Some(sponsor) = state.with_untracked(|s| s.selection.sponsor) {
                        set_sponsor_text.set(checksummed(&sponsor));
                    }
                }
            />
            <div class="flex flex-wrap gap-2 items-center">
                <button
                    class=BUTTON
                    on:click=move |_| {
                        client.with_value(|c| c.choose_side(Side::Left));
                        sync();
                    }
                >
                    "Left"
                </button>
                <button
                    class=BUTTON
                    on:click=move |_| {
                        client.with_value(|c| c.choose_side(Side::Right));
                        sync();
                    }
                >
                    "Right"
                </button>
                <span>
                    <strong>"SIDE"</strong> " "
                    {move || state.with(|s| s.selection.side.map(Side::label).unwrap_or(PLACEHOLDER))}
                </span>
            </div>
            <div class="text-sm font-mono break-all text-[var(--ink-light)]">
                {move || state.with(|s| s.preview.clone())}
            </div>
            <div class="flex flex-wrap gap-2">
                <button class=BUTTON on:click=move |_| copy_link(Side::Left)>"Copy link (Left)"</button>
                <button class=BUTTON on:click=move |_| copy_link(Side::Right)>"Copy link (Right)"</button>
                <button class=BUTTON on:click=move |_| join_company(Side::Left)>"Join company (Left)"</button>
                <button class=BUTTON on:click=move |_| join_company(Side::Right)>"Join company (Right)"</button>
            </div>
        </Panel>

        // Buy
        <Panel id="buy" title="Buy / Upgrade">
            <button
                class=BUTTON
                disabled=move || busy.get() || !state.with(|s| s.can_submit)
                on:click=move |_| {
                    run_action(client, busy, set_state, |c| async move {
                        let _ = c.buy().await;
                    })
                }
            >
                {format!("Approve {} & buy", CONFIG.token.symbol)}
            </button>
        </Panel>

        // Dashboard
        <Panel id="dashboard" title="Dashboard">
            <KpiGrid snapshot=snapshot countdown=countdown />
            <div class="flex flex-wrap gap-2 pt-2">
                <button
                    class=BUTTON
                    disabled=move || busy.get() || !connected()
                    on:click=move |_| {
                        run_action(client, busy, set_state, |c| async move {
                            let _ = c.claim_primary_reward().await;
                        })
                    }
                >
                    "Claim bonus"
                </button>
                <button
                    class=BUTTON
                    disabled=move || busy.get() || !connected()
                    on:click=move |_| {
                        run_action(client, busy, set_state, |c| async move {
                            let _ = c.claim_stake_reward().await;
                        })
                    }
                >
                    "Claim stake"
                </button>
                <button
                    class=BUTTON
                    disabled=move || busy.get() || !connected()
                    on:click=move |_| {
                        run_action(client, busy, set_state, |c| async move {
                            let _ = c.refresh().await;
                        })
                    }
                >
                    "Refresh"
                </button>
            </div>
        </Panel>

        // Status
        <div class="mb-6 border border-dashed border-[var(--rule)] p-4" role="status">
            {move || status.get()}
        </div>

        <footer class="text-sm text-[var(--ink-light)] break-all">
            {contracts.summary_line()}
        </footer>
    }
}
