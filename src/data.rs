use crate::error::StudentsResult;
use async_trait::async_trait;
use student::{StudentFields, StudentId, StudentRecord};

pub mod memory_store;
pub mod postgres_store;
pub mod student;

/// Persistence for student records. The store owns identity assignment; the
/// `Option`/`bool` returns mean "no such record", and are turned into
/// `NotFound` by the service on top.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn insert(&self, to_be_added: StudentFields) -> StudentsResult<StudentRecord>;
    async fn get_all(&self) -> StudentsResult<Vec<StudentRecord>>;
    async fn get_by_id(&self, id: StudentId) -> StudentsResult<Option<StudentRecord>>;
    async fn replace_by_id(
        &self,
        id: StudentId,
        fields: StudentFields,
    ) -> StudentsResult<Option<StudentRecord>>;
    async fn remove_by_id(&self, id: StudentId) -> StudentsResult<bool>;

    async fn close(&self) {}
}

#[cfg(test)]
pub mod test_utils {
    use super::{RecordStore, StudentFields, StudentId, StudentRecord};
    use crate::error::{StudentsError, StudentsResult};
    use async_trait::async_trait;

    pub fn fields(first_name: &str, last_name: &str, gender: &str, department: &str) -> StudentFields {
        StudentFields {
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender: gender.into(),
            department: department.into(),
            address: format!("{first_name}'s house"),
        }
    }

    pub fn record(first_name: &str, last_name: &str, gender: &str, department: &str) -> StudentRecord {
        StudentRecord::from_fields(
            StudentId::new_random(),
            fields(first_name, last_name, gender, department),
        )
    }

    /// A store whose backing database is never reachable.
    pub struct UnreachableStore;

    fn unreachable<T>() -> StudentsResult<T> {
        Err(StudentsError::MakeQuery {
            source: sqlx::Error::PoolTimedOut,
        })
    }

    #[async_trait]
    impl RecordStore for UnreachableStore {
        async fn insert(&self, _: StudentFields) -> StudentsResult<StudentRecord> {
            unreachable()
        }

        async fn get_all(&self) -> StudentsResult<Vec<StudentRecord>> {
            unreachable()
        }

        async fn get_by_id(&self, _: StudentId) -> StudentsResult<Option<StudentRecord>> {
            unreachable()
        }

        async fn replace_by_id(
            &self,
            _: StudentId,
            _: StudentFields,
        ) -> StudentsResult<Option<StudentRecord>> {
            unreachable()
        }

        async fn remove_by_id(&self, _: StudentId) -> StudentsResult<bool> {
            unreachable()
        }
    }
}
