use crate::{
    data::{
        RecordStore,
        student::{StudentFields, StudentId, StudentRecord},
    },
    error::StudentsResult,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Process-local store, kept in insertion order. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<StudentRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, to_be_added: StudentFields) -> StudentsResult<StudentRecord> {
        let mut records = self.records.write().await;

        let mut id = StudentId::new_random();
        while records.iter().any(|record| record.id == id) {
            id = StudentId::new_random();
        }

        let record = StudentRecord::from_fields(id, to_be_added);
        records.push(record.clone());
        Ok(record)
    }

    async fn get_all(&self) -> StudentsResult<Vec<StudentRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn get_by_id(&self, id: StudentId) -> StudentsResult<Option<StudentRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn replace_by_id(
        &self,
        id: StudentId,
        fields: StudentFields,
    ) -> StudentsResult<Option<StudentRecord>> {
        let mut records = self.records.write().await;
        let Some(existing) = records.iter_mut().find(|record| record.id == id) else {
            return Ok(None);
        };

        *existing = StudentRecord::from_fields(id, fields);
        Ok(Some(existing.clone()))
    }

    async fn remove_by_id(&self, id: StudentId) -> StudentsResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_utils::fields;

    #[tokio::test]
    async fn keeps_insertion_order() {
        let store = MemoryRecordStore::new();
        let first = store.insert(fields("Anna", "Smith", "Female", "BCA")).await.unwrap();
        let second = store.insert(fields("Bob", "Jones", "Male", "BA")).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn replace_keeps_id_and_position() {
        let store = MemoryRecordStore::new();
        let first = store.insert(fields("Anna", "Smith", "Female", "BCA")).await.unwrap();
        let second = store.insert(fields("Bob", "Jones", "Male", "BA")).await.unwrap();

        let replaced = store
            .replace_by_id(first.id, fields("Annie", "Smith", "Female", "BSC"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.id, first.id);
        assert_eq!(replaced.first_name, "Annie");

        let all = store.get_all().await.unwrap();
        assert_eq!(all[0], replaced);
        assert_eq!(all[1], second);
    }

    #[tokio::test]
    async fn missing_records_report_absence() {
        let store = MemoryRecordStore::new();
        let id = StudentId::new_random();

        assert!(store.get_by_id(id).await.unwrap().is_none());
        assert!(store
            .replace_by_id(id, fields("Anna", "Smith", "Female", "BCA"))
            .await
            .unwrap()
            .is_none());
        assert!(!store.remove_by_id(id).await.unwrap());
    }

    #[tokio::test]
    async fn remove_is_final() {
        let store = MemoryRecordStore::new();
        let record = store.insert(fields("Anna", "Smith", "Female", "BCA")).await.unwrap();

        assert!(store.remove_by_id(record.id).await.unwrap());
        assert!(!store.remove_by_id(record.id).await.unwrap());
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
