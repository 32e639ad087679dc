use crate::{
    data::student::{StudentFields, StudentRecord},
    error::{MalformedBodySnafu, MessageBody, StudentsResult},
    routes::parse_id,
    service::RecordService,
    state::StudentsState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use snafu::ResultExt;

pub async fn post_add_student(
    State(state): State<StudentsState>,
    body: Result<Json<StudentFields>, JsonRejection>,
) -> StudentsResult<(StatusCode, Json<StudentRecord>)> {
    let Json(fields) = body.context(MalformedBodySnafu)?;
    let record = state.service().create_record(fields).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_students(
    State(state): State<StudentsState>,
) -> StudentsResult<Json<Vec<StudentRecord>>> {
    state.service().list_all().await.map(Json)
}

pub async fn get_student(
    State(state): State<StudentsState>,
    Path(id): Path<String>,
) -> StudentsResult<Json<StudentRecord>> {
    let id = parse_id(&id)?;
    state.service().get_by_id(id).await.map(Json)
}

pub async fn put_student(
    State(state): State<StudentsState>,
    Path(id): Path<String>,
    body: Result<Json<StudentFields>, JsonRejection>,
) -> StudentsResult<Json<StudentRecord>> {
    let id = parse_id(&id)?;
    let Json(fields) = body.context(MalformedBodySnafu)?;
    state.service().update_by_id(id, fields).await.map(Json)
}

pub async fn delete_student(
    State(state): State<StudentsState>,
    Path(id): Path<String>,
) -> StudentsResult<Json<MessageBody>> {
    let id = parse_id(&id)?;
    state.service().delete_by_id(id).await?;
    Ok(Json(MessageBody::new("Student deleted successfully")))
}
