use leptos::prelude::*;

use crate::components::explorer::ExplorerView;

/// The technique catalog bundled with the app.
const CATALOG_JSON: &str = include_str!("../../data/catalog.json");

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<div class="fullscreen-explorer">
			<ExplorerView catalog_json=CATALOG_JSON />
		</div>
	}
}
