use crate::{
    data::{
        IdForm,
        store::StudentStore,
        student::{Student, format_date},
    },
    error::{MissingIdSnafu, MissingStudentSnafu, RosterResult, StoreSnafu},
    maud_conveniences::{link_button, title},
    state::RosterState,
};
use axum::extract::{Query, State};
use maud::{Markup, html};
use snafu::{OptionExt, ResultExt};

pub fn student_details(student: &Student) -> Markup {
    html! {
        div class="py-4 space-y-2" {
            p class="text-gray-200 font-semibold" {
                "Last Name: "
                span class="font-medium" {(student.last_name)}
            }
            p class="text-gray-200 font-semibold" {
                "First Name: "
                span class="font-medium" {(student.first_mid_name)}
            }
            p class="text-gray-200 font-semibold" {
                "Email Address: "
                a href={"mailto:" (student.email_address)} class="font-medium text-blue-400" {(student.email_address)}
            }
            p class="text-gray-200 font-semibold" {
                "Enrollment Date: "
                span class="font-medium" {(format_date(student.enrollment_date))}
            }
        }
    }
}

pub async fn get_student(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
) -> RosterResult<Markup> {
    let id = id.context(MissingIdSnafu)?;
    let student = state
        .student_store()
        .await?
        .find(id)
        .await
        .context(StoreSnafu)?
        .context(MissingStudentSnafu { id })?;

    Ok(state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full" {
            (title(&student))
            (student_details(&student))
            div class="flex flex-row space-x-4" {
                (link_button(format!("/students/edit?id={id}"), "Edit", "blue"))
                (link_button("/students", "Back to List", "slate"))
            }
        }
    }))
}
