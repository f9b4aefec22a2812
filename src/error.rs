use crate::data::store::StoreError;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Error talking to the student store"))]
    Store { source: StoreError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseEnvNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("No student ID was provided"))]
    MissingId,
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i32 },
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input
        const SU: StatusCode = StatusCode::SERVICE_UNAVAILABLE; //store gave up

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MigrateError { .. } => ISE,
            Self::Store { source } => match source {
                StoreError::RetryExhausted { .. } => SU,
                StoreError::Data { .. } => ISE,
            },
            Self::BadEnvVar { .. } | Self::ParsePort { .. } | Self::ParseEnvNumber { .. } => ISE,
            Self::MissingId => BI,
            Self::MissingStudent { .. } => NF,
        };

        error!(?self, "Error!");
        (
            status_code,
            Html(html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Roster Error: "}
                    span {(self.to_string())}
                }
            }),
        )
            .into_response()
    }
}
