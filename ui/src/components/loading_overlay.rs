use yew::prelude::*;

use crate::components::Spinner;

/// Full-viewport blocking layer shown while a parent boundary is
/// awaiting data or navigation. Stateless: no props, no outputs.
#[function_component]
pub fn LoadingOverlay() -> Html {
    html! {
        <div
            class="fixed inset-0 bg-white/80 dark:bg-gray-900/80 z-50 \
                   flex items-center justify-center"
        >
            <Spinner />
        </div>
    }
}
