//! Create, edit and delete for students.
//!
//! Each mutation goes `Validating → Applying` and ends up either committed or failed. The store
//! does its own retrying, so a [`StoreError`] seen here is final and only needs classifying:
//! [`MutationKind::recovery`] decides whether the caller shows the error inline or gets sent
//! back to the delete confirmation with its error banner.

use crate::{
    data::{
        store::{FailureKind, StoreError, StudentStore},
        student::{FieldErrors, Student, StudentForm},
    },
    error::{MissingStudentSnafu, RosterResult, StoreSnafu},
};
use snafu::{OptionExt, ResultExt};

pub const SAVE_CHANGES_ERROR: &str =
    "Unable to save changes. Try again, and if problem persists see your administrator.";
pub const DELETE_FAILED_BANNER: &str =
    "Delete failed. Try again and if the problem persists see your system administrator.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStage {
    Validating,
    Applying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Stay on the current page and show [`SAVE_CHANGES_ERROR`].
    Inline,
    /// Go back to the delete confirmation with `saveChangesError=true`.
    RedirectToConfirm,
}

impl MutationKind {
    /// Only a data error during a delete takes the caller back to the confirmation page. An
    /// exhausted retry budget is shown inline everywhere, deletes included.
    pub const fn recovery(self, failure: FailureKind) -> Recovery {
        match (self, failure) {
            (Self::Delete, FailureKind::Data) => Recovery::RedirectToConfirm,
            _ => Recovery::Inline,
        }
    }
}

/// Why a mutation didn't commit. `T` is whatever gets shown again to the caller.
#[derive(Debug)]
pub enum MutationFailure<T> {
    NotFound { id: i32 },
    Invalid { preserved: T, errors: FieldErrors },
    Inline { preserved: T, source: StoreError },
    RedirectToConfirm { id: i32, source: StoreError },
}

impl<T> MutationFailure<T> {
    /// The form-level message shown above the fields, if this failure has one.
    pub const fn summary(&self) -> Option<&'static str> {
        match self {
            Self::Inline { .. } => Some(SAVE_CHANGES_ERROR),
            _ => None,
        }
    }

    fn classify(kind: MutationKind, id: i32, preserved: T, source: StoreError) -> Self {
        warn!(
            ?kind,
            id,
            stage = ?MutationStage::Applying,
            failure = ?source.kind(),
            ?source,
            "unable to save changes"
        );

        match kind.recovery(source.kind()) {
            Recovery::Inline => Self::Inline { preserved, source },
            Recovery::RedirectToConfirm => Self::RedirectToConfirm { id, source },
        }
    }
}

pub async fn create(
    store: &mut impl StudentStore,
    form: StudentForm,
) -> Result<i32, MutationFailure<StudentForm>> {
    let new_student = match form.validate() {
        Ok(new_student) => new_student,
        Err(errors) => {
            debug!(stage = ?MutationStage::Validating, ?errors, "rejected new student");
            return Err(MutationFailure::Invalid {
                preserved: form,
                errors,
            });
        }
    };

    match store.add(new_student).await {
        Ok(id) => {
            info!(id, "created student");
            Ok(id)
        }
        Err(source) => Err(MutationFailure::classify(
            MutationKind::Create,
            0,
            form,
            source,
        )),
    }
}

/// Loads the student first; fails with [`MutationFailure::Inline`] (nothing to preserve) when even
/// that can't be done.
pub async fn update(
    store: &mut impl StudentStore,
    id: i32,
    form: &StudentForm,
) -> Result<Student, MutationFailure<Option<Student>>> {
    let mut student = match store.find(id).await {
        Ok(Some(student)) => student,
        Ok(None) => return Err(MutationFailure::NotFound { id }),
        Err(source) => {
            return Err(MutationFailure::classify(
                MutationKind::Update,
                id,
                None,
                source,
            ));
        }
    };

    let errors = form.bind_onto(&mut student);
    if !errors.is_empty() {
        debug!(id, stage = ?MutationStage::Validating, ?errors, "rejected student edit");
        return Err(MutationFailure::Invalid {
            preserved: Some(student),
            errors,
        });
    }

    match store.apply_fields(&student).await {
        Ok(()) => {
            info!(id, "updated student");
            Ok(student)
        }
        Err(source) => Err(MutationFailure::classify(
            MutationKind::Update,
            id,
            Some(student),
            source,
        )),
    }
}

#[derive(Debug)]
pub struct DeleteConfirmation {
    pub student: Student,
    pub banner: Option<&'static str>,
}

/// The read-only half of a delete.
pub async fn confirm_delete(
    store: &mut impl StudentStore,
    id: i32,
    save_changes_error: bool,
) -> RosterResult<DeleteConfirmation> {
    let student = store
        .find(id)
        .await
        .context(StoreSnafu)?
        .context(MissingStudentSnafu { id })?;

    Ok(DeleteConfirmation {
        student,
        banner: save_changes_error.then_some(DELETE_FAILED_BANNER),
    })
}

/// The committing half of a delete. On an inline failure the student is handed back if it had
/// been loaded, so the confirmation can be shown again.
pub async fn delete(
    store: &mut impl StudentStore,
    id: i32,
) -> Result<(), MutationFailure<Option<Student>>> {
    let student = match store.find(id).await {
        Ok(Some(student)) => student,
        Ok(None) => return Err(MutationFailure::NotFound { id }),
        Err(source) => {
            return Err(MutationFailure::classify(
                MutationKind::Delete,
                id,
                None,
                source,
            ));
        }
    };

    match store.remove(id).await {
        Ok(()) => {
            info!(id, "deleted student");
            Ok(())
        }
        Err(source) => Err(MutationFailure::classify(
            MutationKind::Delete,
            id,
            Some(student),
            source,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::store::memory::MemoryStore, error::RosterError};
    use time::macros::date;

    fn carson() -> Student {
        Student {
            id: 1,
            last_name: "Alexander".into(),
            first_mid_name: "Carson".into(),
            email_address: "carson@example.com".into(),
            enrollment_date: date!(2005 - 09 - 01),
        }
    }

    fn valid_form() -> StudentForm {
        StudentForm {
            last_name: Some("Olivetto".into()),
            first_mid_name: Some("Nino".into()),
            email_address: Some("nino@example.com".into()),
            enrollment_date: Some("2005-09-01".into()),
        }
    }

    #[test]
    fn recovery_table() {
        use FailureKind::{Data, RetryExhausted};

        assert_eq!(MutationKind::Create.recovery(RetryExhausted), Recovery::Inline);
        assert_eq!(MutationKind::Create.recovery(Data), Recovery::Inline);
        assert_eq!(MutationKind::Update.recovery(RetryExhausted), Recovery::Inline);
        assert_eq!(MutationKind::Update.recovery(Data), Recovery::Inline);
        assert_eq!(MutationKind::Delete.recovery(RetryExhausted), Recovery::Inline);
        assert_eq!(
            MutationKind::Delete.recovery(Data),
            Recovery::RedirectToConfirm
        );
    }

    #[tokio::test]
    async fn create_adds_a_valid_student() {
        let mut store = MemoryStore::default();
        let id = create(&mut store, valid_form())
            .await
            .expect("form is valid");

        let added = store.get(id).expect("student was added");
        assert_eq!(added.last_name, "Olivetto");
        assert_eq!(added.enrollment_date, date!(2005 - 09 - 01));
    }

    #[tokio::test]
    async fn invalid_create_never_reaches_the_store() {
        let mut store = MemoryStore::default();
        let form = StudentForm {
            last_name: Some(String::new()),
            ..valid_form()
        };

        let Err(MutationFailure::Invalid { preserved, errors }) =
            create(&mut store, form.clone()).await
        else {
            panic!("expected a validation failure");
        };

        assert_eq!(store.add_calls, 0);
        assert_eq!(preserved, form);
        assert_eq!(
            errors
                .for_field(crate::data::student::StudentField::LastName)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn failed_create_keeps_the_form_and_persists_nothing() {
        for kind in [FailureKind::RetryExhausted, FailureKind::Data] {
            let mut store = MemoryStore::default();
            store.fail_next_commit(kind);

            let failure = create(&mut store, valid_form())
                .await
                .expect_err("commit was scripted to fail");

            assert_eq!(failure.summary(), Some(SAVE_CHANGES_ERROR));
            let MutationFailure::Inline { preserved, .. } = failure else {
                panic!("create failures are always inline");
            };
            assert_eq!(preserved, valid_form());
            assert_eq!(store.len(), 0);
        }
    }

    #[tokio::test]
    async fn update_never_takes_the_id_from_the_payload() {
        let mut store = MemoryStore::with_students([carson()]);
        let form: StudentForm =
            serde_urlencoded::from_str("id=999&last_name=X").expect("form decodes");

        let updated = update(&mut store, 1, &form).await.expect("update commits");

        assert_eq!(updated.id, 1);
        assert_eq!(
            store.get(1),
            Some(&Student {
                last_name: "X".into(),
                ..carson()
            })
        );
        assert!(!store.contains(999));
    }

    #[tokio::test]
    async fn update_of_missing_student_is_not_found() {
        let mut store = MemoryStore::default();
        let failure = update(&mut store, 42, &valid_form())
            .await
            .expect_err("nobody has id 42");
        assert!(matches!(failure, MutationFailure::NotFound { id: 42 }));
        assert_eq!(store.apply_calls, 0);
    }

    #[tokio::test]
    async fn invalid_update_shows_what_was_bound() {
        let mut store = MemoryStore::with_students([carson()]);
        let form = StudentForm {
            last_name: Some("Anand".into()),
            email_address: Some(String::new()),
            ..StudentForm::default()
        };

        let Err(MutationFailure::Invalid { preserved, .. }) = update(&mut store, 1, &form).await
        else {
            panic!("blank email should fail validation");
        };

        assert_eq!(store.apply_calls, 0);
        let preserved = preserved.expect("student was loaded");
        assert_eq!(preserved.last_name, "Anand");
        assert_eq!(preserved.email_address, "carson@example.com");
        assert_eq!(store.get(1), Some(&carson()));
    }

    #[tokio::test]
    async fn failed_update_is_inline_for_both_kinds() {
        for kind in [FailureKind::RetryExhausted, FailureKind::Data] {
            let mut store = MemoryStore::with_students([carson()]);
            store.fail_next_commit(kind);
            let form = StudentForm {
                first_mid_name: Some("Carlos".into()),
                ..StudentForm::default()
            };

            let failure = update(&mut store, 1, &form)
                .await
                .expect_err("commit was scripted to fail");

            assert_eq!(failure.summary(), Some(SAVE_CHANGES_ERROR));
            let MutationFailure::Inline {
                preserved: Some(preserved),
                ..
            } = failure
            else {
                panic!("update failures are always inline");
            };
            assert_eq!(preserved.first_mid_name, "Carlos");
            assert_eq!(store.get(1), Some(&carson()));
        }
    }

    #[tokio::test]
    async fn delete_removes_the_student() {
        let mut store = MemoryStore::with_students([carson()]);
        delete(&mut store, 1).await.expect("delete commits");
        assert!(!store.contains(1));
    }

    #[tokio::test]
    async fn delete_data_error_redirects_to_confirmation() {
        let mut store = MemoryStore::with_students([carson()]);
        store.fail_next_commit(FailureKind::Data);

        let failure = delete(&mut store, 1)
            .await
            .expect_err("commit was scripted to fail");

        assert!(matches!(
            failure,
            MutationFailure::RedirectToConfirm { id: 1, .. }
        ));
        assert_eq!(failure.summary(), None);
        assert!(store.contains(1));
    }

    #[tokio::test]
    async fn delete_retry_exhaustion_is_inline() {
        let mut store = MemoryStore::with_students([carson()]);
        store.fail_next_commit(FailureKind::RetryExhausted);

        let failure = delete(&mut store, 1)
            .await
            .expect_err("commit was scripted to fail");

        assert_eq!(failure.summary(), Some(SAVE_CHANGES_ERROR));
        let MutationFailure::Inline { preserved, .. } = failure else {
            panic!("exhausted retries aren't redirected");
        };
        assert_eq!(preserved, Some(carson()));
        assert!(store.contains(1));
    }

    #[tokio::test]
    async fn delete_of_missing_student_is_not_found() {
        let mut store = MemoryStore::default();
        assert!(matches!(
            delete(&mut store, 3).await,
            Err(MutationFailure::NotFound { id: 3 })
        ));
        assert_eq!(store.remove_calls, 0);
    }

    #[tokio::test]
    async fn confirmation_banner_only_after_a_failure() {
        let mut store = MemoryStore::with_students([carson()]);

        let plain = confirm_delete(&mut store, 1, false)
            .await
            .expect("student exists");
        assert_eq!(plain.banner, None);

        let flagged = confirm_delete(&mut store, 1, true)
            .await
            .expect("student exists");
        assert_eq!(flagged.banner, Some(DELETE_FAILED_BANNER));
        assert_eq!(flagged.student, carson());

        assert!(matches!(
            confirm_delete(&mut store, 2, false).await,
            Err(RosterError::MissingStudent { id: 2 })
        ));
    }
}
