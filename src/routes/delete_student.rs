use crate::{
    data::{IdForm, student::Student},
    error::{MissingIdSnafu, RosterError, RosterResult},
    maud_conveniences::{error_alert, form_submit_button, link_button, title},
    mutation::{self, MutationFailure},
    routes::student_in_detail::student_details,
    state::RosterState,
};
use axum::{
    Form,
    body::Body,
    extract::{Query, State},
    http::Response,
    response::{IntoResponse, Redirect},
};
use maud::{Markup, html};
use serde::Deserialize;
use snafu::OptionExt;

pub fn confirm_redirect(id: i32) -> Redirect {
    Redirect::to(&format!("/students/delete?id={id}&saveChangesError=true"))
}

fn confirmation(id: i32, student: Option<&Student>, alert: Option<&str>) -> Markup {
    html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full" {
            (title("Delete"))
            @if let Some(alert) = alert {
                (error_alert(alert))
            }
            h3 class="text-lg font-semibold mb-2" {"Are you sure you want to delete this?"}
            @if let Some(student) = student {
                (student_details(student))
            }
            form method="post" action="/students/delete" class="flex flex-row space-x-4" {
                input type="hidden" name="id" value=(id) {}
                (form_submit_button(Some("Delete")))
                (link_button("/students", "Back to List", "slate"))
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub id: Option<i32>,
    pub save_changes_error: Option<bool>,
}

pub async fn get_delete_student(
    State(state): State<RosterState>,
    Query(DeleteQuery {
        id,
        save_changes_error,
    }): Query<DeleteQuery>,
) -> RosterResult<Markup> {
    let id = id.context(MissingIdSnafu)?;
    let confirm = mutation::confirm_delete(
        &mut state.student_store().await?,
        id,
        save_changes_error.unwrap_or(false),
    )
    .await?;

    Ok(state.render(confirmation(id, Some(&confirm.student), confirm.banner)))
}

pub async fn post_delete_student(
    State(state): State<RosterState>,
    Form(IdForm { id }): Form<IdForm>,
) -> RosterResult<Response<Body>> {
    let id = id.context(MissingIdSnafu)?;
    let mut store = state.student_store().await?;

    match mutation::delete(&mut store, id).await {
        Ok(()) => Ok(Redirect::to("/students").into_response()),
        Err(failure) => {
            let summary = failure.summary();
            match failure {
                MutationFailure::RedirectToConfirm { id, .. } => {
                    Ok(confirm_redirect(id).into_response())
                }
                MutationFailure::Inline { preserved, .. }
                | MutationFailure::Invalid { preserved, .. } => Ok(state
                    .render(confirmation(id, preserved.as_ref(), summary))
                    .into_response()),
                MutationFailure::NotFound { id } => Err(RosterError::MissingStudent { id }),
            }
        }
    }
}
