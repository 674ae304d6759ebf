use leptos::prelude::*;

/// 404 fallback.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<h1>"Page not found"</h1>
		<p>
			<a href="/">"Back to the explorer"</a>
		</p>
	}
}
