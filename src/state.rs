use crate::{
    config::{RuntimeConfiguration, StoreConfig},
    dashboard::{ClientId, Dashboard, DashboardRegistry},
    data::{RecordStore, memory_store::MemoryRecordStore, postgres_store::PostgresRecordStore},
    error::StudentsResult,
    maud_conveniences::render_nav,
    service::{RecordService, StudentService, http::HttpRecordService},
};
use axum::http::HeaderMap;
use maud::{DOCTYPE, Markup, html};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct StudentsState {
    service: StudentService,
    dashboard_service: Arc<dyn RecordService>,
    dashboards: Arc<DashboardRegistry>,
    config: RuntimeConfiguration,
}

impl StudentsState {
    pub async fn new(options: PgPoolOptions, config: RuntimeConfiguration) -> StudentsResult<Self> {
        let store: Arc<dyn RecordStore> = match config.store() {
            StoreConfig::Postgres(db_config) => {
                Arc::new(PostgresRecordStore::new(options, &db_config.get_db_path()).await?)
            }
            StoreConfig::Memory => {
                warn!("Using the in-memory store, nothing will be persisted");
                Arc::new(MemoryRecordStore::new())
            }
        };

        let dashboard_service: Option<Arc<dyn RecordService>> = match &config.dashboard().api_url {
            Some(api_url) => {
                info!(?api_url, "Dashboard talking to remote records service");
                Some(Arc::new(HttpRecordService::new(api_url.as_str())?))
            }
            None => None,
        };

        Ok(Self::build(store, dashboard_service, config))
    }

    /// In-process everything, used when the store is already built.
    pub fn with_store(store: Arc<dyn RecordStore>, config: RuntimeConfiguration) -> Self {
        Self::build(store, None, config)
    }

    fn build(
        store: Arc<dyn RecordStore>,
        dashboard_service: Option<Arc<dyn RecordService>>,
        config: RuntimeConfiguration,
    ) -> Self {
        let service = StudentService::new(store);
        let dashboard_service =
            dashboard_service.unwrap_or_else(|| Arc::new(service.clone()) as Arc<dyn RecordService>);
        Self {
            service,
            dashboard_service,
            dashboards: Arc::new(DashboardRegistry::default()),
            config,
        }
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :), and to allow direct html! usage
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Student Details" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                    (render_nav())
                    (markup)
                    div id="notifications" class="fixed top-4 right-4 flex flex-col space-y-2" {}
                }
            }
        }
    }

    /// The records service backing the JSON API.
    pub const fn service(&self) -> &StudentService {
        &self.service
    }

    /// The records service the dashboard and forms talk to.
    pub fn records(&self) -> &dyn RecordService {
        self.dashboard_service.as_ref()
    }

    pub fn dashboards(&self) -> &DashboardRegistry {
        &self.dashboards
    }

    /// The dashboard of the page that sent these headers, if it is still around.
    pub async fn client_dashboard(&self, headers: &HeaderMap) -> Option<Arc<Mutex<Dashboard>>> {
        let id = ClientId::from_headers(headers)?;
        self.dashboards.get(id).await
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub async fn sensible_shutdown(&self) {
        self.service.close().await;
    }
}
