use yew::prelude::*;

use crate::components::LoadingOverlay;
use crate::hooks::use_cart;

#[function_component]
pub fn CartPage() -> Html {
    let cart = use_cart();

    if cart.is_initial_loading() {
        return html! { <LoadingOverlay /> };
    }

    let refetch = cart.refetch.clone();
    let on_refresh = Callback::from(move |_: MouseEvent| refetch.emit(()));

    html! {
        <div class="max-w-3xl mx-auto">
            <div class="flex items-center justify-between mb-6">
                <h1 class="text-2xl font-bold">{"Your cart"}</h1>
                <button
                    onclick={on_refresh}
                    class="text-sm text-blue-600 dark:text-blue-400"
                >
                    {"Refresh"}
                </button>
            </div>
            {if let Some(error) = &cart.error {
                html! {
                    <div class="p-4 rounded-md bg-red-50 dark:bg-red-900/20 \
                               border border-red-200 dark:border-red-800">
                        <p class="text-sm text-red-700 dark:text-red-400">
                            {format!("Error loading cart: {error}")}
                        </p>
                    </div>
                }
            } else {
                html! {}
            }}
            {match cart.data.as_deref() {
                Some(cart) if cart.is_empty() => html! {
                    <p class="text-neutral-600 dark:text-neutral-400">
                        {"Your cart is empty."}
                    </p>
                },
                Some(cart) => html! {
                    <>
                        <ul class="divide-y divide-neutral-200 \
                                   dark:divide-neutral-700">
                            {for cart.items.iter().map(|item| html! {
                                <li class="py-3 flex justify-between">
                                    <span>
                                        {format!(
                                            "{} × {}",
                                            item.quantity, item.name
                                        )}
                                    </span>
                                    <span>
                                        {format!("${}", item.line_total())}
                                    </span>
                                </li>
                            })}
                        </ul>
                        <p class="mt-4 text-right font-semibold">
                            {format!("Subtotal: ${}", cart.subtotal())}
                        </p>
                    </>
                },
                None => html! {},
            }}
        </div>
    }
}
