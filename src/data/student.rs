use maud::{Markup, Render, html};
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Student {
    pub id: i32,
    pub last_name: String,
    pub first_mid_name: String,
    pub email_address: String,
    pub enrollment_date: Date,
}

impl Render for Student {
    fn render(&self) -> Markup {
        html! {
            (self.first_mid_name) " " (self.last_name)
        }
    }
}

/// A validated student that has not been given an ID by the store yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub last_name: String,
    pub first_mid_name: String,
    pub email_address: String,
    pub enrollment_date: Date,
}

impl NewStudent {
    pub fn with_id(self, id: i32) -> Student {
        let Self {
            last_name,
            first_mid_name,
            email_address,
            enrollment_date,
        } = self;
        Student {
            id,
            last_name,
            first_mid_name,
            email_address,
            enrollment_date,
        }
    }
}

/// The only fields a create or edit form may bind. Anything else in the body (an `id`, say) is
/// dropped by serde and never reaches the record.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub last_name: Option<String>,
    pub first_mid_name: Option<String>,
    pub email_address: Option<String>,
    pub enrollment_date: Option<String>,
}

impl From<&Student> for StudentForm {
    fn from(student: &Student) -> Self {
        Self {
            last_name: Some(student.last_name.clone()),
            first_mid_name: Some(student.first_mid_name.clone()),
            email_address: Some(student.email_address.clone()),
            enrollment_date: Some(format_date(student.enrollment_date)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    LastName,
    FirstMidName,
    EmailAddress,
    EnrollmentDate,
}

impl StudentField {
    pub const ALL: [Self; 4] = [
        Self::LastName,
        Self::FirstMidName,
        Self::EmailAddress,
        Self::EnrollmentDate,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::LastName => "last_name",
            Self::FirstMidName => "first_mid_name",
            Self::EmailAddress => "email_address",
            Self::EnrollmentDate => "enrollment_date",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LastName => "Last Name",
            Self::FirstMidName => "First Name",
            Self::EmailAddress => "Email Address",
            Self::EnrollmentDate => "Enrollment Date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: StudentField,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, field: StudentField, message: String) {
        self.0.push(FieldError { field, message });
    }

    pub fn for_field(&self, field: StudentField) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(move |error| error.field == field)
            .map(|error| error.message.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = StudentField> + '_ {
        self.0.iter().map(|error| error.field)
    }
}

enum Bound<T> {
    Absent,
    Value(T),
    Invalid,
}

impl StudentForm {
    pub fn field(&self, field: StudentField) -> Option<&str> {
        match field {
            StudentField::LastName => self.last_name.as_deref(),
            StudentField::FirstMidName => self.first_mid_name.as_deref(),
            StudentField::EmailAddress => self.email_address.as_deref(),
            StudentField::EnrollmentDate => self.enrollment_date.as_deref(),
        }
    }

    /// What to show after a failed edit: the student's current values, except for fields that
    /// didn't bind, which keep whatever was typed.
    pub fn redisplay(student: &Student, attempted: &Self, errors: &FieldErrors) -> Self {
        let mut form = Self::from(student);
        for field in errors.fields() {
            let typed = attempted.field(field).map(str::to_string);
            match field {
                StudentField::LastName => form.last_name = typed,
                StudentField::FirstMidName => form.first_mid_name = typed,
                StudentField::EmailAddress => form.email_address = typed,
                StudentField::EnrollmentDate => form.enrollment_date = typed,
            }
        }
        form
    }

    /// Checks every field is present and well-formed, as needed for a brand new record.
    pub fn validate(&self) -> Result<NewStudent, FieldErrors> {
        let mut errors = FieldErrors::default();

        let mut required_text = |field: StudentField| match bind_text(self.field(field), field, &mut errors) {
            Bound::Value(value) => Some(value),
            Bound::Absent => {
                errors.push(field, required_message(field));
                None
            }
            Bound::Invalid => None,
        };
        let last_name = required_text(StudentField::LastName);
        let first_mid_name = required_text(StudentField::FirstMidName);
        let email_address = required_text(StudentField::EmailAddress);

        let field = StudentField::EnrollmentDate;
        let enrollment_date = match bind_date(self.field(field), &mut errors) {
            Bound::Value(date) => Some(date),
            Bound::Absent => {
                errors.push(field, required_message(field));
                None
            }
            Bound::Invalid => None,
        };

        match (last_name, first_mid_name, email_address, enrollment_date) {
            (Some(last_name), Some(first_mid_name), Some(email_address), Some(enrollment_date))
                if errors.is_empty() =>
            {
                Ok(NewStudent {
                    last_name,
                    first_mid_name,
                    email_address,
                    enrollment_date,
                })
            }
            _ => Err(errors),
        }
    }

    /// Copies every submitted, valid field onto `student`. Fields missing from the form are left
    /// alone; submitted fields that don't validate are reported and also left alone.
    pub fn bind_onto(&self, student: &mut Student) -> FieldErrors {
        let mut errors = FieldErrors::default();

        if let Bound::Value(value) =
            bind_text(self.field(StudentField::LastName), StudentField::LastName, &mut errors)
        {
            student.last_name = value;
        }
        if let Bound::Value(value) = bind_text(
            self.field(StudentField::FirstMidName),
            StudentField::FirstMidName,
            &mut errors,
        ) {
            student.first_mid_name = value;
        }
        if let Bound::Value(value) = bind_text(
            self.field(StudentField::EmailAddress),
            StudentField::EmailAddress,
            &mut errors,
        ) {
            student.email_address = value;
        }
        if let Bound::Value(date) =
            bind_date(self.field(StudentField::EnrollmentDate), &mut errors)
        {
            student.enrollment_date = date;
        }

        errors
    }
}

fn required_message(field: StudentField) -> String {
    format!("The {} field is required.", field.label())
}

fn bind_text(raw: Option<&str>, field: StudentField, errors: &mut FieldErrors) -> Bound<String> {
    match raw.map(str::trim) {
        None => Bound::Absent,
        Some("") => {
            errors.push(field, required_message(field));
            Bound::Invalid
        }
        Some(value) => Bound::Value(value.to_string()),
    }
}

fn bind_date(raw: Option<&str>, errors: &mut FieldErrors) -> Bound<Date> {
    let field = StudentField::EnrollmentDate;
    match raw.map(str::trim) {
        None => Bound::Absent,
        Some("") => {
            errors.push(field, required_message(field));
            Bound::Invalid
        }
        Some(value) => match Date::parse(value, DATE_FORMAT) {
            Ok(date) => Bound::Value(date),
            Err(e) => {
                debug!(?e, value, "unable to parse enrollment date");
                errors.push(
                    field,
                    format!("The value '{value}' is not valid for {}.", field.label()),
                );
                Bound::Invalid
            }
        },
    }
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}
