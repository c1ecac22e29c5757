use leptos::prelude::*;

/// Titled block of the page with an optional one-line hint under the title
#[component]
pub fn Panel(
    #[prop(into)] id: String,
    #[prop(into)] title: String,
    #[prop(optional, into)] hint: Option<String>,
    children: Children,
) -> impl IntoView {
    view! {
        <section id=id class="mb-8">
            <h2 class="font-bold uppercase mb-1">
                {format!("─┤ {} ├─", title)}
            </h2>
            {hint.map(|hint| view! { <div class="text-sm text-[var(--ink-light)] mb-2">{hint}</div> })}
            <div class="pl-4 border-l border-dashed border-[var(--rule)] space-y-2">
                {children()}
            </div>
        </section>
    }
}
