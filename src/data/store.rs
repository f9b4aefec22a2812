use crate::data::{
    retry::RetryPolicy,
    student::{NewStudent, Student},
};
use futures::FutureExt;
use snafu::Snafu;
use sqlx::{PgConnection, Postgres, pool::PoolConnection};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("Gave up on the store after {} attempts", attempts))]
    RetryExhausted { attempts: u32, source: sqlx::Error },
    #[snafu(display("Error with student data"))]
    Data { source: sqlx::Error },
}

/// Which of the two failure classes a [`StoreError`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RetryExhausted,
    Data,
}

impl StoreError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::RetryExhausted { .. } => FailureKind::RetryExhausted,
            Self::Data { .. } => FailureKind::Data,
        }
    }
}

/// Persistence for students. Every mutating call commits before it returns, and retrying
/// transient failures is entirely the implementor's business.
pub trait StudentStore {
    async fn query(&mut self) -> Result<Vec<Student>, StoreError>;
    async fn find(&mut self, id: i32) -> Result<Option<Student>, StoreError>;
    async fn add(&mut self, student: NewStudent) -> Result<i32, StoreError>;
    async fn remove(&mut self, id: i32) -> Result<(), StoreError>;
    /// Writes the editable fields of `student` back to the row with the same ID.
    async fn apply_fields(&mut self, student: &Student) -> Result<(), StoreError>;
}

/// A single pooled connection, held for one request and handed back to the pool on drop.
pub struct PgStudentStore {
    conn: PoolConnection<Postgres>,
    retry_policy: RetryPolicy,
}

impl PgStudentStore {
    pub const fn new(conn: PoolConnection<Postgres>, retry_policy: RetryPolicy) -> Self {
        Self { conn, retry_policy }
    }
}

impl StudentStore for PgStudentStore {
    async fn query(&mut self) -> Result<Vec<Student>, StoreError> {
        self.retry_policy
            .run("query", &mut *self.conn, |conn: &mut PgConnection| {
                sqlx::query_as::<_, Student>("SELECT * FROM public.students")
                    .fetch_all(conn)
                    .boxed()
            })
            .await
    }

    async fn find(&mut self, id: i32) -> Result<Option<Student>, StoreError> {
        self.retry_policy
            .run("find", &mut *self.conn, |conn: &mut PgConnection| {
                sqlx::query_as::<_, Student>("SELECT * FROM public.students WHERE id = $1")
                    .bind(id)
                    .fetch_optional(conn)
                    .boxed()
            })
            .await
    }

    async fn add(&mut self, student: NewStudent) -> Result<i32, StoreError> {
        self.retry_policy
            .run("add", &mut *self.conn, |conn: &mut PgConnection| {
                sqlx::query_scalar::<_, i32>(
                    "INSERT INTO public.students (last_name, first_mid_name, email_address, enrollment_date) VALUES ($1, $2, $3, $4) RETURNING id",
                )
                .bind(student.last_name.clone())
                .bind(student.first_mid_name.clone())
                .bind(student.email_address.clone())
                .bind(student.enrollment_date)
                .fetch_one(conn)
                .boxed()
            })
            .await
    }

    async fn remove(&mut self, id: i32) -> Result<(), StoreError> {
        self.retry_policy
            .run("remove", &mut *self.conn, |conn: &mut PgConnection| {
                sqlx::query("DELETE FROM public.students WHERE id = $1")
                    .bind(id)
                    .execute(conn)
                    .map(|result| result.map(|_| ()))
                    .boxed()
            })
            .await
    }

    async fn apply_fields(&mut self, student: &Student) -> Result<(), StoreError> {
        self.retry_policy
            .run("apply_fields", &mut *self.conn, |conn: &mut PgConnection| {
                sqlx::query("UPDATE public.students SET last_name = $2, first_mid_name = $3, email_address = $4, enrollment_date = $5 WHERE id = $1")
                    .bind(student.id)
                    .bind(student.last_name.clone())
                    .bind(student.first_mid_name.clone())
                    .bind(student.email_address.clone())
                    .bind(student.enrollment_date)
                    .execute(conn)
                    .map(|result| result.map(|_| ()))
                    .boxed()
            })
            .await
    }
}
