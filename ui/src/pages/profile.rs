use yew::prelude::*;

use crate::components::LoadingOverlay;
use crate::hooks::use_profile;

#[function_component]
pub fn ProfilePage() -> Html {
    let profile = use_profile();

    if profile.is_initial_loading() {
        return html! { <LoadingOverlay /> };
    }

    html! {
        <div class="max-w-3xl mx-auto">
            <h1 class="text-2xl font-bold mb-6">{"Profile"}</h1>
            {if let Some(error) = &profile.error {
                html! {
                    <div class="p-4 rounded-md bg-red-50 dark:bg-red-900/20 \
                               border border-red-200 dark:border-red-800">
                        <p class="text-sm text-red-700 dark:text-red-400">
                            {format!("Error loading profile: {error}")}
                        </p>
                    </div>
                }
            } else {
                html! {}
            }}
            {if let Some(profile) = profile.data.as_deref() {
                let name = profile
                    .display_name
                    .clone()
                    .unwrap_or_else(|| profile.email.clone());
                html! {
                    <dl class="space-y-4">
                        <div>
                            <dt class="text-sm text-neutral-500">
                                {"Name"}
                            </dt>
                            <dd>{name}</dd>
                        </div>
                        <div>
                            <dt class="text-sm text-neutral-500">
                                {"Email"}
                            </dt>
                            <dd>{profile.email.clone()}</dd>
                        </div>
                        <div>
                            <dt class="text-sm text-neutral-500">
                                {"Member since"}
                            </dt>
                            <dd>
                                {profile
                                    .created_at
                                    .strftime("%B %Y")
                                    .to_string()}
                            </dd>
                        </div>
                    </dl>
                }
            } else {
                html! {}
            }}
        </div>
    }
}
