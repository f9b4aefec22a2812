use serde::Deserialize;

pub mod retry;
pub mod store;
pub mod student;

/// `id` is optional so a missing one can be answered with a 400 rather than axum's rejection.
#[derive(Deserialize)]
pub struct IdForm {
    pub id: Option<i32>,
}
