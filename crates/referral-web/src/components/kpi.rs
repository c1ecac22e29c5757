use leptos::prelude::*;
use referral_client::DashboardSnapshot;
use referral_client::constants::PLACEHOLDER;
use shared::CONFIG;

/// One labelled dashboard figure
#[component]
pub fn Kpi(#[prop(into)] label: String, #[prop(into)] value: Signal<String>) -> impl IntoView {
    view! {
        <div>
            <strong>{label}</strong> " " {move || value.get()}
        </div>
    }
}

/// Figures from the last refresh; `-` until the first one lands
#[component]
pub fn KpiGrid(snapshot: ReadSignal<Option<DashboardSnapshot>>, countdown: ReadSignal<String>) -> impl IntoView {
    let field = move |f: fn(&DashboardSnapshot) -> String| {
        Signal::derive(move || {
            snapshot.with(|s| s.as_ref().map(f).unwrap_or_else(|| PLACEHOLDER.to_string()))
        })
    };

    view! {
        <div class="grid grid-cols-1 md:grid-cols-2 gap-x-8 gap-y-1">
            <Kpi label="PACKAGE" value=field(|s| s.tier.to_string()) />
            <Kpi label="RANK" value=field(|s| s.rank.to_string()) />
            <Kpi label=format!("CLAIMABLE {}", CONFIG.token.symbol) value=field(|s| s.claimable_primary.clone()) />
            <Kpi label=format!("CLAIMABLE {}", CONFIG.token.reward_symbol) value=field(|s| s.claimable_secondary.clone()) />
            <Kpi label="VOLUME LEFT" value=field(|s| s.volume_left.clone()) />
            <Kpi label="VOLUME RIGHT" value=field(|s| s.volume_right.clone()) />
            <Kpi label="STAKE PRINCIPAL" value=field(|s| s.principal.clone()) />
            <Kpi label="PENDING REWARD" value=field(|s| s.pending_reward.clone()) />
            <Kpi label="STAKE END" value=field(|s| s.stake_end.clone()) />
            <Kpi label="COUNTDOWN" value=Signal::derive(move || countdown.get()) />
        </div>
    }
}
