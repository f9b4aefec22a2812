use crate::{
    data::{
        IdForm,
        store::StudentStore,
        student::{FieldErrors, StudentForm},
    },
    error::{MissingIdSnafu, MissingStudentSnafu, RosterError, RosterResult, StoreSnafu},
    maud_conveniences::{error_alert, form_submit_button, link_button, student_fields, title},
    mutation::{self, MutationFailure},
    routes::delete_student::confirm_redirect,
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
use snafu::{OptionExt, ResultExt};

fn student_form(
    heading: &'static str,
    action: &str,
    form: &StudentForm,
    errors: &FieldErrors,
    summary: Option<&str>,
) -> Markup {
    html! {
        div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full max-w-md" {
            (title(heading))
            @if let Some(summary) = summary {
                (error_alert(summary))
            }
            form method="post" action=(action) {
                (student_fields(form, errors))
                (form_submit_button(Some("Save")))
            }
            div class="mt-4" {
                (link_button("/students", "Back to List", "slate"))
            }
        }
    }
}

pub async fn get_create_student(State(state): State<RosterState>) -> Markup {
    state.render(student_form(
        "Create Student",
        "/students/create",
        &StudentForm::default(),
        &FieldErrors::default(),
        None,
    ))
}

pub async fn post_create_student(
    State(state): State<RosterState>,
    Form(form): Form<StudentForm>,
) -> RosterResult<Response<Body>> {
    let mut store = state.student_store().await?;

    let (form, errors, summary) = match mutation::create(&mut store, form).await {
        Ok(_) => return Ok(Redirect::to("/students").into_response()),
        Err(failure) => {
            let summary = failure.summary();
            match failure {
                MutationFailure::Invalid { preserved, errors } => (preserved, errors, summary),
                MutationFailure::Inline { preserved, .. } => {
                    (preserved, FieldErrors::default(), summary)
                }
                MutationFailure::NotFound { id } => return Err(RosterError::MissingStudent { id }),
                MutationFailure::RedirectToConfirm { id, .. } => {
                    return Ok(confirm_redirect(id).into_response());
                }
            }
        }
    };

    Ok(state
        .render(student_form(
            "Create Student",
            "/students/create",
            &form,
            &errors,
            summary,
        ))
        .into_response())
}

pub async fn get_edit_student(
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

    Ok(state.render(student_form(
        "Edit Student",
        &format!("/students/edit?id={id}"),
        &StudentForm::from(&student),
        &FieldErrors::default(),
        None,
    )))
}

/// A successful edit shows the edit form again with the saved values.
pub async fn post_edit_student(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
    Form(attempted): Form<StudentForm>,
) -> RosterResult<Response<Body>> {
    let id = id.context(MissingIdSnafu)?;
    let mut store = state.student_store().await?;

    let (form, errors, summary) = match mutation::update(&mut store, id, &attempted).await {
        Ok(student) => (StudentForm::from(&student), FieldErrors::default(), None),
        Err(failure) => {
            let summary = failure.summary();
            match failure {
                MutationFailure::Invalid {
                    preserved: Some(student),
                    errors,
                } => (
                    StudentForm::redisplay(&student, &attempted, &errors),
                    errors,
                    summary,
                ),
                MutationFailure::Inline {
                    preserved: Some(student),
                    ..
                } => (StudentForm::from(&student), FieldErrors::default(), summary),
                MutationFailure::Invalid { preserved: None, .. } => {
                    return Err(RosterError::MissingStudent { id });
                }
                MutationFailure::Inline {
                    preserved: None,
                    source,
                } => return Err(RosterError::Store { source }),
                MutationFailure::NotFound { id } => return Err(RosterError::MissingStudent { id }),
                MutationFailure::RedirectToConfirm { id, .. } => {
                    return Ok(confirm_redirect(id).into_response());
                }
            }
        }
    };
    drop(store);

    Ok(state
        .render(student_form(
            "Edit Student",
            &format!("/students/edit?id={id}"),
            &form,
            &errors,
            summary,
        ))
        .into_response())
}
