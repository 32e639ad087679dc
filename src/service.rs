use crate::{
    data::{
        RecordStore,
        student::{StudentFields, StudentId, StudentRecord},
    },
    error::{MissingStudentSnafu, StudentsResult},
};
use async_trait::async_trait;
use snafu::{OptionExt, ensure};
use std::sync::Arc;

pub mod http;

/// The five record operations, as seen by anything that renders or edits
/// students. Absent records are always `MissingStudent`.
#[async_trait]
pub trait RecordService: Send + Sync + 'static {
    /// `None` when the service confirmed the create without echoing the record back.
    async fn create(&self, fields: StudentFields) -> StudentsResult<Option<StudentRecord>>;
    async fn list_all(&self) -> StudentsResult<Vec<StudentRecord>>;
    async fn get_by_id(&self, id: StudentId) -> StudentsResult<StudentRecord>;
    async fn update_by_id(
        &self,
        id: StudentId,
        fields: StudentFields,
    ) -> StudentsResult<StudentRecord>;
    async fn delete_by_id(&self, id: StudentId) -> StudentsResult<()>;
}

#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn RecordStore>,
}

impl StudentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Creates a record, always handing it back.
    pub async fn create_record(&self, fields: StudentFields) -> StudentsResult<StudentRecord> {
        let record = self.store.insert(fields).await?;
        info!(id = %record.id, "Student record created successfully");
        Ok(record)
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}

#[async_trait]
impl RecordService for StudentService {
    async fn create(&self, fields: StudentFields) -> StudentsResult<Option<StudentRecord>> {
        self.create_record(fields).await.map(Some)
    }

    async fn list_all(&self) -> StudentsResult<Vec<StudentRecord>> {
        self.store.get_all().await
    }

    async fn get_by_id(&self, id: StudentId) -> StudentsResult<StudentRecord> {
        self.store
            .get_by_id(id)
            .await?
            .context(MissingStudentSnafu { id: id.to_string() })
    }

    async fn update_by_id(
        &self,
        id: StudentId,
        fields: StudentFields,
    ) -> StudentsResult<StudentRecord> {
        let record = self
            .store
            .replace_by_id(id, fields)
            .await?
            .context(MissingStudentSnafu { id: id.to_string() })?;
        debug!(%id, "Student record updated");
        Ok(record)
    }

    async fn delete_by_id(&self, id: StudentId) -> StudentsResult<()> {
        let removed = self.store.remove_by_id(id).await?;
        ensure!(removed, MissingStudentSnafu { id: id.to_string() });
        info!(%id, "Student deleted successfully");
        Ok(())
    }
}
