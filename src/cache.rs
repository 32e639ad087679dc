//! The dashboard's copy of the record set.
//!
//! The cache is what every table render reads from. It is filled by a full
//! `RecordService::list_all` and afterwards kept in step with the store by
//! applying the outcome of each *successful* mutation according to its
//! [`SyncPolicy`]. Failed calls never touch it.

use crate::data::student::{StudentId, StudentRecord};
use jiff::Timestamp;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Apply the confirmed change to the local copy.
    PatchLocally,
    /// Throw the local copy away and list everything again.
    Refetch,
}

impl FromStr for SyncPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" | "patch_locally" => Ok(Self::PatchLocally),
            "refetch" => Ok(Self::Refetch),
            _ => Err(()),
        }
    }
}

/// A mutation the service has confirmed.
#[derive(Debug, Clone)]
pub enum ConfirmedChange {
    /// `None` when the service did not send the new record back.
    Created(Option<StudentRecord>),
    Updated(StudentRecord),
    Deleted(StudentId),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[must_use]
pub enum SyncOutcome {
    Patched,
    /// The copy was left alone and should be replaced by a fresh listing.
    NeedsRefetch,
}

#[derive(Debug, Clone)]
pub struct StudentCache {
    records: Vec<StudentRecord>,
    policy: SyncPolicy,
    last_synced_at: Option<Timestamp>,
    patches_since_sync: usize,
}

impl StudentCache {
    pub const fn new(policy: SyncPolicy) -> Self {
        Self {
            records: Vec::new(),
            policy,
            last_synced_at: None,
            patches_since_sync: 0,
        }
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn get(&self, id: StudentId) -> Option<&StudentRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub const fn last_synced_at(&self) -> Option<Timestamp> {
        self.last_synced_at
    }

    pub const fn patches_since_sync(&self) -> usize {
        self.patches_since_sync
    }

    /// Replaces the whole copy with a fresh listing.
    pub fn replace_all(&mut self, records: Vec<StudentRecord>) {
        debug!(count = records.len(), "Refreshed student cache");
        self.records = records;
        self.last_synced_at = Some(Timestamp::now());
        self.patches_since_sync = 0;
    }

    /// Brings the copy in line with a change the service already confirmed.
    ///
    /// Never talks to the service itself, so it is safe to call under a lock; when
    /// a full listing is needed instead the caller is told to fetch one.
    pub fn apply_confirmed(&mut self, change: ConfirmedChange) -> SyncOutcome {
        if self.policy == SyncPolicy::Refetch {
            return SyncOutcome::NeedsRefetch;
        }

        match change {
            ConfirmedChange::Created(None) => return SyncOutcome::NeedsRefetch,
            ConfirmedChange::Created(Some(record)) => self.records.push(record),
            ConfirmedChange::Updated(record) => {
                match self.records.iter_mut().find(|existing| existing.id == record.id) {
                    Some(existing) => *existing = record,
                    None => self.records.push(record),
                }
            }
            ConfirmedChange::Deleted(id) => self.records.retain(|record| record.id != id),
        }

        self.patches_since_sync += 1;
        SyncOutcome::Patched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{memory_store::MemoryRecordStore, test_utils::fields},
        service::{RecordService, StudentService},
    };
    use std::sync::Arc;

    async fn seeded_service() -> StudentService {
        let service = StudentService::new(Arc::new(MemoryRecordStore::new()));
        service
            .create(fields("Anna", "Smith", "Female", "BCA"))
            .await
            .unwrap();
        service
            .create(fields("Bob", "Anderson", "Male", "BA"))
            .await
            .unwrap();
        service
    }

    async fn synced_cache(service: &StudentService, policy: SyncPolicy) -> StudentCache {
        let mut cache = StudentCache::new(policy);
        cache.replace_all(service.list_all().await.unwrap());
        cache
    }

    #[test]
    fn policies_parse() {
        assert_eq!("patch".parse::<SyncPolicy>(), Ok(SyncPolicy::PatchLocally));
        assert_eq!(" Refetch ".parse::<SyncPolicy>(), Ok(SyncPolicy::Refetch));
        assert_eq!("never".parse::<SyncPolicy>(), Err(()));
    }

    #[tokio::test]
    async fn replacing_marks_the_sync_time() {
        let service = seeded_service().await;
        let mut cache = StudentCache::new(SyncPolicy::PatchLocally);
        assert!(cache.last_synced_at().is_none());

        cache.replace_all(service.list_all().await.unwrap());
        assert_eq!(cache.records().len(), 2);
        assert!(cache.last_synced_at().is_some());
        assert_eq!(cache.patches_since_sync(), 0);
    }

    #[tokio::test]
    async fn patches_follow_confirmed_changes() {
        let service = seeded_service().await;
        let mut cache = synced_cache(&service, SyncPolicy::PatchLocally).await;
        let synced_at = cache.last_synced_at();

        let created = service
            .create(fields("Cara", "Lee", "Other", "BSC"))
            .await
            .unwrap();
        assert_eq!(
            cache.apply_confirmed(ConfirmedChange::Created(created.clone())),
            SyncOutcome::Patched
        );
        let created = created.unwrap();
        assert_eq!(cache.records().last(), Some(&created));

        let updated = service
            .update_by_id(created.id, fields("Cara", "Leigh", "Other", "BSC"))
            .await
            .unwrap();
        assert_eq!(
            cache.apply_confirmed(ConfirmedChange::Updated(updated.clone())),
            SyncOutcome::Patched
        );
        assert_eq!(cache.get(created.id), Some(&updated));

        service.delete_by_id(created.id).await.unwrap();
        assert_eq!(
            cache.apply_confirmed(ConfirmedChange::Deleted(created.id)),
            SyncOutcome::Patched
        );
        assert!(cache.get(created.id).is_none());

        assert_eq!(cache.records(), service.list_all().await.unwrap());
        assert_eq!(cache.last_synced_at(), synced_at);
        assert_eq!(cache.patches_since_sync(), 3);
    }

    #[tokio::test]
    async fn create_without_echo_asks_for_a_refetch() {
        let service = seeded_service().await;
        let mut cache = synced_cache(&service, SyncPolicy::PatchLocally).await;

        assert_eq!(
            cache.apply_confirmed(ConfirmedChange::Created(None)),
            SyncOutcome::NeedsRefetch
        );
        assert_eq!(cache.records().len(), 2);
        assert_eq!(cache.patches_since_sync(), 0);
    }

    #[tokio::test]
    async fn refetch_policy_never_patches() {
        let service = seeded_service().await;
        let mut cache = synced_cache(&service, SyncPolicy::Refetch).await;

        let victim = cache.records()[0].clone();
        assert_eq!(
            cache.apply_confirmed(ConfirmedChange::Deleted(victim.id)),
            SyncOutcome::NeedsRefetch
        );

        assert_eq!(cache.get(victim.id), Some(&victim));
        assert_eq!(cache.patches_since_sync(), 0);
    }
}
