use yew::prelude::*;

/// Presentation-only animated loading indicator.
#[function_component]
pub fn Spinner() -> Html {
    html! {
        <div
            class="inline-block animate-spin rounded-full h-8 w-8 \
                   border-2 border-neutral-900 dark:border-neutral-100 \
                   border-t-transparent dark:border-t-transparent"
        ></div>
    }
}
