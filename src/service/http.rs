use crate::{
    data::student::{StudentFields, StudentId, StudentRecord},
    error::{RemoteRequestSnafu, StudentsError, StudentsResult},
    service::RecordService,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use snafu::ResultExt;

/// Talks to a student records service over its JSON surface.
#[derive(Clone, Debug)]
pub struct HttpRecordService {
    client: Client,
    base_url: String,
}

impl HttpRecordService {
    pub fn new(base_url: impl Into<String>) -> StudentsResult<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(RemoteRequestSnafu)?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn student_url(&self, id: StudentId) -> String {
        self.url(&format!("/students/{id}"))
    }
}

/// Maps a non-success answer onto the error the in-process service would have given.
fn check_status(response: Response, id: Option<StudentId>) -> StudentsResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(StudentsError::MissingStudent {
            id: id.to_string(),
        }),
        _ => Err(StudentsError::RemoteStatus { status }),
    }
}

#[async_trait]
impl RecordService for HttpRecordService {
    async fn create(&self, fields: StudentFields) -> StudentsResult<Option<StudentRecord>> {
        let response = self
            .client
            .post(self.url("/addstudents"))
            .json(&fields)
            .send()
            .await
            .context(RemoteRequestSnafu)?;
        let response = check_status(response, None)?;

        // some backends only answer with a plain-text confirmation instead of the record
        let body = response.bytes().await.context(RemoteRequestSnafu)?;
        Ok(serde_json::from_slice(&body).ok())
    }

    async fn list_all(&self) -> StudentsResult<Vec<StudentRecord>> {
        let response = self
            .client
            .get(self.url("/students"))
            .send()
            .await
            .context(RemoteRequestSnafu)?;

        check_status(response, None)?
            .json()
            .await
            .context(RemoteRequestSnafu)
    }

    async fn get_by_id(&self, id: StudentId) -> StudentsResult<StudentRecord> {
        let response = self
            .client
            .get(self.student_url(id))
            .send()
            .await
            .context(RemoteRequestSnafu)?;

        check_status(response, Some(id))?
            .json()
            .await
            .context(RemoteRequestSnafu)
    }

    async fn update_by_id(
        &self,
        id: StudentId,
        fields: StudentFields,
    ) -> StudentsResult<StudentRecord> {
        let response = self
            .client
            .put(self.student_url(id))
            .json(&fields)
            .send()
            .await
            .context(RemoteRequestSnafu)?;

        check_status(response, Some(id))?
            .json()
            .await
            .context(RemoteRequestSnafu)
    }

    async fn delete_by_id(&self, id: StudentId) -> StudentsResult<()> {
        let response = self
            .client
            .delete(self.student_url(id))
            .send()
            .await
            .context(RemoteRequestSnafu)?;

        check_status(response, Some(id))?;
        Ok(())
    }
}
