use crate::{
    config::RuntimeConfiguration,
    data::store::PgStudentStore,
    error::{GetDatabaseConnectionSnafu, MigrateSnafu, OpenDatabaseSnafu, RosterResult},
};
use maud::{DOCTYPE, Markup, html};
use snafu::ResultExt;
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

#[derive(Clone, Debug)]
pub struct RosterState {
    pool: Pool<Postgres>,
    config: RuntimeConfiguration,
}

impl RosterState {
    pub async fn new(options: PgPoolOptions, config: RuntimeConfiguration) -> RosterResult<Self> {
        let pool = options
            .connect(&config.db_config().get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool, config })
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Contoso University" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center justify-center text-white" {
                    nav class="w-full bg-gray-800 px-8 py-4 mb-8 flex flex-row space-x-6" {
                        a href="/" class="font-bold hover:text-blue-300" {"Contoso University"}
                        a href="/students" class="hover:text-blue-300" {"Students"}
                    }
                    (markup)
                }
            }
        }
    }

    /// Checks a connection out of the pool for the rest of the request. It goes back to the pool
    /// when the returned store is dropped.
    pub async fn student_store(&self) -> RosterResult<PgStudentStore> {
        let conn = self
            .pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)?;
        Ok(PgStudentStore::new(conn, self.config.retry_policy()))
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
    }
}
