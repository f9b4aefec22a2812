use crate::{
    data::student::{Student, format_date},
    error::{RosterResult, StoreSnafu},
    listing::{ListQueryState, ListingParams, SortKey, list_students},
    maud_conveniences::{link_button, table, title},
    state::RosterState,
};
use axum::extract::{Query, State};
use maud::{Markup, html};
use snafu::ResultExt;

pub fn listing_href(params: &ListingParams) -> String {
    match serde_urlencoded::to_string(params) {
        Ok(query) if !query.is_empty() => format!("/students?{query}"),
        _ => "/students".to_string(),
    }
}

fn sort_header(text: &'static str, state: &ListQueryState, toggle: SortKey) -> Markup {
    html! {
        a class="hover:text-blue-300 underline" href=(listing_href(&state.link_params(toggle, None))) {(text)}
    }
}

fn student_row(student: Student) -> [Markup; 4] {
    let id = student.id;
    [
        html! {(student.last_name)},
        html! {(student.first_mid_name)},
        html! {(format_date(student.enrollment_date))},
        html! {
            div class="flex flex-row space-x-2" {
                a class="hover:text-blue-300 underline" href={"/students/edit?id=" (id)} {"Edit"}
                a class="hover:text-blue-300 underline" href={"/students/details?id=" (id)} {"Details"}
                a class="hover:text-red-300 underline" href={"/students/delete?id=" (id)} {"Delete"}
            }
        },
    ]
}

pub async fn get_students(
    State(state): State<RosterState>,
    Query(params): Query<ListingParams>,
) -> RosterResult<Markup> {
    let mut store = state.student_store().await?;
    let listing = list_students(&mut store, &params)
        .await
        .context(StoreSnafu)?;
    drop(store);

    let query_state = &listing.state;
    let page = &listing.page;
    let page_href = |page_number| {
        listing_href(&query_state.link_params(query_state.sort_key, Some(page_number)))
    };

    let headers = [
        sort_header("Last Name", query_state, listing.toggles.name),
        html! {"First Name"},
        sort_header("Enrollment Date", query_state, listing.toggles.date),
        html! {},
    ];
    let rows = page.items.iter().cloned().map(student_row).collect();

    Ok(state.render(html! {
        div class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-4xl w-full flex flex-col space-y-4" {
            div class="flex flex-row items-center justify-between" {
                (title("Students"))
                (link_button("/students/create", "Create New", "blue"))
            }
            form method="get" action="/students" class="flex flex-row space-x-4 items-center" {
                label for="searchString" class="text-gray-300 whitespace-nowrap" {"Find by name:"}
                input type="search" id="searchString" name="searchString" value=[query_state.filter_text.as_deref()] class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {}
                button type="submit" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Search"}
            }
            (table(html! {}, headers, rows))
            div class="flex flex-row items-center justify-between text-gray-300" {
                @if page.has_previous() {
                    a class="hover:text-blue-300 underline" href=(page_href(page.page_number - 1)) {"« Previous"}
                } @else {
                    span class="text-gray-500" {"« Previous"}
                }
                span {"Page " (page.page_number) " of " (page.total_pages) " (" (page.total_items) " students)"}
                @if page.has_next() {
                    a class="hover:text-blue-300 underline" href=(page_href(page.page_number + 1)) {"Next »"}
                } @else {
                    span class="text-gray-500" {"Next »"}
                }
            }
        }
    }))
}
