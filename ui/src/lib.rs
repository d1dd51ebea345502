use payloads::APIClient;
use yew::prelude::*;
use yew_router::prelude::*;

pub mod components;
pub mod contexts;
pub mod hooks;
mod logs;
pub mod pages;

use contexts::query::QueryCacheProvider;
use pages::{CartPage, HomePage, NotFoundPage, OrdersPage, ProfilePage};

// Global API client - configurable via environment or same-origin fallback
pub fn get_api_client() -> APIClient {
    // Try environment variable first (set at build time)
    let address = option_env!("BACKEND_URL")
        .map(|url| url.to_string())
        .unwrap_or_else(|| {
            // Fallback to same origin (current setup)
            let window = web_sys::window().unwrap();
            let location = window.location();
            location.origin().unwrap()
        });

    APIClient {
        address,
        inner_client: reqwest::Client::new(),
    }
}

#[function_component]
pub fn App() -> Html {
    logs::init_logging();
    html! {
        <BrowserRouter>
            <QueryCacheProvider>
                <div class="min-h-screen bg-white dark:bg-gray-900 text-gray-900 dark:text-gray-100 transition-colors">
                    <Header />
                    <main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8">
                        <Switch<Route> render={switch} />
                    </main>
                </div>
            </QueryCacheProvider>
        </BrowserRouter>
    }
}

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/cart")]
    Cart,
    #[at("/orders")]
    Orders,
    #[at("/profile")]
    Profile,
    #[not_found]
    #[at("/404")]
    NotFound,
}

#[function_component]
fn Header() -> Html {
    html! {
        <header class="border-b border-neutral-200 dark:border-neutral-700">
            <nav class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-4 flex items-center gap-6">
                <Link<Route> to={Route::Home} classes="font-bold">
                    {"Storefront"}
                </Link<Route>>
                <Link<Route> to={Route::Cart}>{"Cart"}</Link<Route>>
                <Link<Route> to={Route::Orders}>{"Orders"}</Link<Route>>
                <Link<Route> to={Route::Profile}>{"Profile"}</Link<Route>>
            </nav>
        </header>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <HomePage /> },
        Route::Cart => html! { <CartPage /> },
        Route::Orders => html! { <OrdersPage /> },
        Route::Profile => html! { <ProfilePage /> },
        Route::NotFound => html! { <NotFoundPage /> },
    }
}
