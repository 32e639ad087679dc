use crate::{
    data::{
        RecordStore,
        student::{StudentFields, StudentId, StudentRecord},
    },
    error::{GetDatabaseConnectionSnafu, MigrateSnafu, MakeQuerySnafu, OpenDatabaseSnafu, StudentsResult},
};
use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{Pool, Postgres, pool::PoolConnection, postgres::PgPoolOptions};

const COLUMNS: &str = "id, first_name, last_name, gender, department, address";

#[derive(Clone, Debug)]
pub struct PostgresRecordStore {
    pool: Pool<Postgres>,
}

impl PostgresRecordStore {
    pub async fn new(options: PgPoolOptions, db_path: &str) -> StudentsResult<Self> {
        let pool = options.connect(db_path).await.context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> StudentsResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert(&self, to_be_added: StudentFields) -> StudentsResult<StudentRecord> {
        let StudentFields {
            first_name,
            last_name,
            gender,
            department,
            address,
        } = to_be_added;

        let mut conn = self.get_connection().await?;
        sqlx::query_as::<_, StudentRecord>(&format!(
            "INSERT INTO public.students (id, first_name, last_name, gender, department, address) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        ))
        .bind(StudentId::new_random())
        .bind(first_name)
        .bind(last_name)
        .bind(gender)
        .bind(department)
        .bind(address)
        .fetch_one(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_all(&self) -> StudentsResult<Vec<StudentRecord>> {
        sqlx::query_as::<_, StudentRecord>(&format!(
            "SELECT {COLUMNS} FROM public.students ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_by_id(&self, id: StudentId) -> StudentsResult<Option<StudentRecord>> {
        let mut conn = self.get_connection().await?;
        sqlx::query_as::<_, StudentRecord>(&format!(
            "SELECT {COLUMNS} FROM public.students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn replace_by_id(
        &self,
        id: StudentId,
        fields: StudentFields,
    ) -> StudentsResult<Option<StudentRecord>> {
        let StudentFields {
            first_name,
            last_name,
            gender,
            department,
            address,
        } = fields;

        let mut conn = self.get_connection().await?;
        sqlx::query_as::<_, StudentRecord>(&format!(
            "UPDATE public.students SET first_name = $2, last_name = $3, gender = $4, department = $5, address = $6 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(gender)
        .bind(department)
        .bind(address)
        .fetch_optional(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn remove_by_id(&self, id: StudentId) -> StudentsResult<bool> {
        let mut conn = self.get_connection().await?;
        let result = sqlx::query("DELETE FROM public.students WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;

        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
