use crate::{maud_conveniences::link_button, state::RosterState};
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<RosterState>) -> Markup {
    state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full" {
            h1 class="text-2xl font-semibold mb-6 text-center" {
                "Contoso University"
            }

            div class="flex flex-row space-x-4 justify-center" {
                (link_button("/students", "View Students", "slate"))
                (link_button("/students/create", "Add a Student", "slate"))
            }
        }
    })
}
