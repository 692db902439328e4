use leptos::prelude::*;
use log::info;

use crate::components::org_chart::OrgChart;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let on_node_activated = Callback::new(|id: String| {
		// The host application decides what activation means; the demo just
		// logs it.
		info!("node activated: {id}");
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-chart">
				<OrgChart
					endpoint="/api/org/subtree"
					fullscreen=true
					on_node_activated=on_node_activated
				/>
				<div class="chart-overlay">
					<h1>"Organization Chart"</h1>
					<p class="subtitle">
						"Click a person to open their profile. Scroll to zoom. Drag to pan."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
