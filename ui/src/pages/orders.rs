use yew::prelude::*;

use crate::components::LoadingOverlay;
use crate::hooks::use_orders;

#[function_component]
pub fn OrdersPage() -> Html {
    let orders = use_orders();

    if orders.is_initial_loading() {
        return html! { <LoadingOverlay /> };
    }

    html! {
        <div class="max-w-3xl mx-auto">
            <h1 class="text-2xl font-bold mb-6">{"Order history"}</h1>
            {if let Some(error) = &orders.error {
                html! {
                    <div class="p-4 rounded-md bg-red-50 dark:bg-red-900/20 \
                               border border-red-200 dark:border-red-800">
                        <p class="text-sm text-red-700 dark:text-red-400">
                            {format!("Error loading orders: {error}")}
                        </p>
                    </div>
                }
            } else {
                html! {}
            }}
            {match orders.data.as_deref() {
                Some(orders) if orders.is_empty() => html! {
                    <p class="text-neutral-600 dark:text-neutral-400">
                        {"No orders yet."}
                    </p>
                },
                Some(orders) => html! {
                    <ul class="divide-y divide-neutral-200 \
                               dark:divide-neutral-700">
                        {for orders.iter().map(|order| html! {
                            <li class="py-3 flex justify-between">
                                <span>
                                    {format!(
                                        "{} · {} items",
                                        order.placed_at.strftime("%Y-%m-%d"),
                                        order.item_count
                                    )}
                                </span>
                                <span class="flex gap-4">
                                    <span class="text-neutral-500">
                                        {order.status.label()}
                                    </span>
                                    <span>{format!("${}", order.total)}</span>
                                </span>
                            </li>
                        })}
                    </ul>
                },
                None => html! {},
            }}
        </div>
    }
}
