use yew::prelude::*;
use yew_router::prelude::*;

use crate::Route;

#[function_component]
pub fn HomePage() -> Html {
    html! {
        <div class="text-center py-12">
            <h1 class="text-4xl font-bold text-gray-900 dark:text-white">
                {"Storefront"}
            </h1>
            <p class="mt-4 text-gray-600 dark:text-gray-300">
                {"Browse your cart, orders, and profile."}
            </p>
            <div class="mt-8 flex justify-center gap-4">
                <Link<Route>
                    to={Route::Cart}
                    classes="px-4 py-2 rounded-md bg-blue-600 text-white"
                >
                    {"View cart"}
                </Link<Route>>
                <Link<Route>
                    to={Route::Orders}
                    classes="px-4 py-2 rounded-md border border-neutral-300 \
                             dark:border-neutral-600"
                >
                    {"Order history"}
                </Link<Route>>
            </div>
        </div>
    }
}
