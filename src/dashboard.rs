//! Per-client dashboard state: each mounted dashboard page gets its own cache,
//! edit session and pending delete, found again through the id its requests carry.

use crate::{
    cache::{ConfirmedChange, StudentCache, SyncOutcome, SyncPolicy},
    data::student::{StudentFields, StudentId, StudentRecord},
    error::StudentsResult,
    service::RecordService,
};
use axum::http::HeaderMap;
use jiff::{SignedDuration, Timestamp};
use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Header every htmx request from a mounted dashboard carries its [`ClientId`] in.
pub const DASHBOARD_CLIENT_HEADER: &str = "x-dashboard-client";

/// Dashboards that haven't been heard from in this long are dropped on the next mount.
const IDLE_TIMEOUT: SignedDuration = SignedDuration::from_secs(30 * 60);

/// Where a single row is in its inline-edit lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EditPhase {
    Viewing,
    Editing,
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditSession {
    id: StudentId,
    draft: StudentFields,
    saving: bool,
}

/// At most one row is being edited at a time; starting another replaces it.
#[derive(Debug, Clone, Default)]
pub struct RecordEditor {
    session: Option<EditSession>,
}

impl RecordEditor {
    pub fn phase_of(&self, id: StudentId) -> EditPhase {
        match &self.session {
            Some(session) if session.id == id && session.saving => EditPhase::Saving,
            Some(session) if session.id == id => EditPhase::Editing,
            _ => EditPhase::Viewing,
        }
    }

    pub fn editing_id(&self) -> Option<StudentId> {
        self.session.as_ref().map(|session| session.id)
    }

    pub fn draft_of(&self, id: StudentId) -> Option<&StudentFields> {
        self.session
            .as_ref()
            .filter(|session| session.id == id)
            .map(|session| &session.draft)
    }

    /// Viewing -> Editing. Purely local.
    pub fn begin(&mut self, record: &StudentRecord) {
        self.session = Some(EditSession {
            id: record.id,
            draft: record.fields(),
            saving: false,
        });
    }

    /// Editing -> Saving, handing back the full draft to send.
    ///
    /// Returns `None` if `id` isn't the row being edited, or it is already saving.
    pub fn begin_save(&mut self, id: StudentId, draft: StudentFields) -> Option<StudentFields> {
        let session = self.session.as_mut().filter(|session| session.id == id)?;
        if session.saving {
            return None;
        }

        session.draft = draft;
        session.saving = true;
        Some(session.draft.clone())
    }

    /// Saving -> Viewing.
    pub fn save_succeeded(&mut self, id: StudentId) {
        if self.editing_id() == Some(id) {
            self.session = None;
        }
    }

    /// Saving -> Editing, keeping the draft so nothing typed is lost.
    pub fn save_failed(&mut self, id: StudentId) {
        if let Some(session) = self.session.as_mut().filter(|session| session.id == id) {
            session.saving = false;
        }
    }

    /// Editing -> Viewing, throwing the draft away.
    pub fn cancel(&mut self, id: StudentId) {
        if self.editing_id() == Some(id) {
            self.session = None;
        }
    }
}

/// The two-step delete: a click marks one id, then confirm or cancel.
#[derive(Debug, Clone, Default)]
pub struct DeleteConfirmation {
    pending: Option<StudentId>,
}

impl DeleteConfirmation {
    #[cfg(test)]
    pub const fn pending(&self) -> Option<StudentId> {
        self.pending
    }

    /// Replaces whatever was pending before.
    pub fn request(&mut self, id: StudentId) {
        self.pending = Some(id);
    }

    /// Takes the pending id for deletion if it is `id`, leaving nothing pending.
    ///
    /// A confirmation for anything else is ignored, as it can only come from a
    /// prompt that has since been replaced.
    pub fn confirm(&mut self, id: StudentId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self, id: StudentId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }
}

/// All the state behind one dashboard: the cached records and the two
/// interaction states layered on top of them.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub cache: StudentCache,
    pub editor: RecordEditor,
    pub deletion: DeleteConfirmation,
}

impl Dashboard {
    pub fn new(policy: SyncPolicy) -> Self {
        Self {
            cache: StudentCache::new(policy),
            editor: RecordEditor::default(),
            deletion: DeleteConfirmation::default(),
        }
    }
}

/// Lists everything without holding the dashboard, then swaps the listing in.
pub async fn refresh(dashboard: &Mutex<Dashboard>, service: &dyn RecordService) -> StudentsResult<()> {
    let records = service.list_all().await?;
    dashboard.lock().await.cache.replace_all(records);
    Ok(())
}

/// Applies a confirmed change, fetching outside the lock if the cache asks for it.
pub async fn sync_confirmed(
    dashboard: &Mutex<Dashboard>,
    change: ConfirmedChange,
    service: &dyn RecordService,
) -> StudentsResult<()> {
    let outcome = dashboard.lock().await.cache.apply_confirmed(change);
    if outcome == SyncOutcome::NeedsRefetch {
        refresh(dashboard, service).await?;
    }
    Ok(())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(DASHBOARD_CLIENT_HEADER)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ClientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

struct Registered {
    dashboard: Arc<Mutex<Dashboard>>,
    last_seen: Timestamp,
}

/// Every live dashboard, keyed by the client that mounted it.
#[derive(Default)]
pub struct DashboardRegistry {
    clients: Mutex<HashMap<ClientId, Registered>>,
}

impl DashboardRegistry {
    /// Registers a fresh dashboard for a new page load.
    pub async fn mount(&self, policy: SyncPolicy) -> (ClientId, Arc<Mutex<Dashboard>>) {
        self.mount_at(policy, Timestamp::now()).await
    }

    async fn mount_at(
        &self,
        policy: SyncPolicy,
        now: Timestamp,
    ) -> (ClientId, Arc<Mutex<Dashboard>>) {
        let mut clients = self.clients.lock().await;

        let before = clients.len();
        clients.retain(|_, registered| now.duration_since(registered.last_seen) < IDLE_TIMEOUT);
        if clients.len() < before {
            debug!(dropped = before - clients.len(), "Dropped idle dashboards");
        }

        let id = ClientId::new_random();
        let dashboard = Arc::new(Mutex::new(Dashboard::new(policy)));
        clients.insert(
            id,
            Registered {
                dashboard: dashboard.clone(),
                last_seen: now,
            },
        );

        (id, dashboard)
    }

    pub async fn get(&self, id: ClientId) -> Option<Arc<Mutex<Dashboard>>> {
        let mut clients = self.clients.lock().await;
        let registered = clients.get_mut(&id)?;
        registered.last_seen = Timestamp::now();
        Some(registered.dashboard.clone())
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }
}
