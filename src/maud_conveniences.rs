use crate::data::student::{FieldErrors, StudentField, StudentForm};
use maud::{Markup, Render, html};

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn table<const N: usize>(
    overall_title: Markup,
    titles: [Markup; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (overall_title)
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for title in titles {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                            }
                        }
                    }
                    tbody {
                        @for row in items {
                            tr {
                                @for col in row {
                                    td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn form_element(id: &'static str, label: &'static str, element: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (element)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    ty: Option<&'static str>,
    value: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required[required] type=(ty.unwrap_or("text")) id=(id) name=(id) value=[value] class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {}
        },
    )
}

pub fn form_submit_button(text: Option<&'static str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (text.unwrap_or("Submit"))
            }
        }
    }
}

pub fn error_alert(message: impl Render) -> Markup {
    html! {
        div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
            span class="block sm:inline" {(message)}
        }
    }
}

/// The four student fields, pre-filled from `form`, with any field errors underneath.
pub fn student_fields(form: &StudentForm, errors: &FieldErrors) -> Markup {
    html! {
        @for field in StudentField::ALL {
            (simple_form_element(field.name(), field.label(), true, input_type(field), form.field(field)))
            @for message in errors.for_field(field) {
                p class="text-red-400 text-sm -mt-3 mb-4" {(message)}
            }
        }
    }
}

const fn input_type(field: StudentField) -> Option<&'static str> {
    match field {
        StudentField::EmailAddress => Some("email"),
        StudentField::EnrollmentDate => Some("date"),
        StudentField::LastName | StudentField::FirstMidName => None,
    }
}

pub fn link_button(href: impl Render, text: &'static str, colour: &'static str) -> Markup {
    html! {
        a href=(href) class={"bg-" (colour) "-600 hover:bg-" (colour) "-800 font-bold py-2 px-4 rounded"} {(text)}
    }
}
