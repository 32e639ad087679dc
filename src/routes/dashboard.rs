use crate::{
    cache::{ConfirmedChange, StudentCache},
    dashboard::{
        ClientId, DASHBOARD_CLIENT_HEADER, Dashboard, EditPhase, RecordEditor, refresh,
        sync_confirmed,
    },
    data::student::{
        SUGGESTED_DEPARTMENTS, SUGGESTED_GENDERS, StudentFields, StudentId, StudentRecord,
    },
    maud_conveniences::{
        BUTTON_CLASSES, DANGER_BUTTON_CLASSES, INPUT_CLASSES, SECONDARY_BUTTON_CLASSES,
        error_alert, form_element, notification, select_element, title,
    },
    routes::{STUDENTS_CHANGED, parse_id, students_changed},
    state::StudentsState,
    view::{
        ALLOWED_PAGE_SIZES, NO_FILTER, Page, SortDirection, SortKey, TableQuery, visible_records,
    },
};
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use std::iter::once;

const COLUMN_TITLES: [&str; 6] = [
    "First Name",
    "Last Name",
    "Gender",
    "Department",
    "Address",
    "Actions",
];
const CELL_CLASSES: &str = "py-2 px-4 border-b border-gray-600 text-gray-200";

fn error_notification(description: &str) -> Markup {
    notification("Something went wrong", description)
}

/// Only the toast is shown, the request's target is left as it was.
fn error_only(description: &str) -> Response {
    ([("HX-Reswap", "none")], error_notification(description)).into_response()
}

fn expired() -> Response {
    error_only("This dashboard has expired, reload the page to carry on.")
}

fn client_headers(client: ClientId) -> String {
    serde_json::json!({ DASHBOARD_CLIENT_HEADER: client.to_string() }).to_string()
}

pub async fn get_dashboard(
    State(state): State<StudentsState>,
    Query(query): Query<TableQuery>,
) -> Markup {
    let (client, dashboard) = state
        .dashboards()
        .mount(state.config().dashboard().sync_policy)
        .await;

    let load_failed = match refresh(&dashboard, state.records()).await {
        Ok(()) => false,
        Err(e) => {
            error!(?e, "Error fetching students");
            true
        }
    };

    let default_page_size = state.config().dashboard().page_size;
    let dashboard = dashboard.lock().await;

    state.render(html! {
        div hx-headers=(client_headers(client)) class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-6xl w-full flex flex-col space-y-4" {
            div class="flex flex-row justify-between items-center" {
                (title("Student Dashboard"))
                button hx-get="/internal/new_student_form" hx-target="#modal" class=(BUTTON_CLASSES) {"Add Student"}
            }
            @if load_failed {
                (error_alert("Unable to load students."))
            }
            (filters_form(&query, default_page_size))
            (render_table(&dashboard, &query, default_page_size))
            div id="modal" {}
        }
    })
}


fn filters_form(query: &TableQuery, default_page_size: usize) -> Markup {
    let gender = query.gender_filter().unwrap_or(NO_FILTER);
    let department = query.department_filter().unwrap_or(NO_FILTER);
    let page_size = query.page_size_or(default_page_size);

    html! {
        form id="filters" hx-get="/internal/students_table" hx-target="#students_table" hx-swap="outerHTML" hx-trigger="submit, input changed delay:300ms from:#search, change" class="flex flex-row flex-wrap gap-4 items-end" {
            (form_element("search", "Search", html! {
                input type="search" id="search" name="search" placeholder="Search by first name or last name" value=(query.search) class=(INPUT_CLASSES) {}
            }))
            (form_element("gender", "Gender", select_element("gender", once(NO_FILTER).chain(SUGGESTED_GENDERS), Some(gender))))
            (form_element("department", "Department", select_element("department", once(NO_FILTER).chain(SUGGESTED_DEPARTMENTS), Some(department))))
            (form_element("sort", "Sort by", html! {
                select id="sort" name="sort" class=(INPUT_CLASSES) {
                    option value="unsorted" selected[query.sort == SortKey::Unsorted] {"Nothing"}
                    option value="firstName" selected[query.sort == SortKey::FirstName] {"First Name"}
                    option value="lastName" selected[query.sort == SortKey::LastName] {"Last Name"}
                }
            }))
            (form_element("order", "Order", html! {
                select id="order" name="order" class=(INPUT_CLASSES) {
                    option value="asc" selected[query.order == SortDirection::Asc] {"Ascending"}
                    option value="desc" selected[query.order == SortDirection::Desc] {"Descending"}
                }
            }))
            (form_element("page_size", "Per page", html! {
                select id="page_size" name="page_size" class=(INPUT_CLASSES) {
                    @for size in ALLOWED_PAGE_SIZES {
                        option value=(size) selected[size == page_size] {(size)}
                    }
                }
            }))
        }
    }
}

fn page_vals(page: usize) -> String {
    serde_json::json!({ "page": page.max(1) }).to_string()
}

fn sync_status(cache: &StudentCache) -> Markup {
    html! {
        p class="text-xs text-gray-400" {
            @match cache.last_synced_at() {
                Some(synced_at) => {
                    "Last synced at " (synced_at)
                    @if cache.patches_since_sync() > 0 {
                        " (" (cache.patches_since_sync()) " local changes since)"
                    }
                }
                None => "Not yet synced",
            }
        }
    }
}

fn render_table(dashboard: &Dashboard, query: &TableQuery, default_page_size: usize) -> Markup {
    let visible = visible_records(dashboard.cache.records(), query);
    let page = Page::slice(
        visible,
        query.current_page(),
        query.page_size_or(default_page_size),
    );

    html! {
        div id="students_table" hx-get="/internal/students_table" hx-trigger={(STUDENTS_CHANGED) " from:body"} hx-include="#filters" hx-vals=(page_vals(page.number)) hx-swap="outerHTML" class="flex flex-col space-y-4" {
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for column in COLUMN_TITLES {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(column)}
                            }
                        }
                    }
                    tbody {
                        @if page.total_items == 0 {
                            tr {
                                td colspan=(COLUMN_TITLES.len()) class="text-center py-4 text-red-500" {"No results found."}
                            }
                        }
                        @for record in &page.items {
                            (render_row(record, &dashboard.editor))
                        }
                    }
                }
            }
            div class="flex flex-row justify-between items-center" {
                button hx-get="/internal/students_table" hx-vals=(page_vals(page.number.saturating_sub(1))) hx-target="#students_table" hx-swap="outerHTML" disabled[!page.has_previous()] class=(BUTTON_CLASSES) {
                    "Previous"
                }
                span class="text-sm text-gray-300" {
                    "Page " (page.number) " of " (page.total_pages()) ", " (page.total_items) " students"
                }
                button hx-get="/internal/students_table" hx-vals=(page_vals(page.number + 1)) hx-target="#students_table" hx-swap="outerHTML" disabled[!page.has_next()] class=(BUTTON_CLASSES) {
                    "Next"
                }
            }
            (sync_status(&dashboard.cache))
        }
    }
}

fn render_row(record: &StudentRecord, editor: &RecordEditor) -> Markup {
    match editor.phase_of(record.id) {
        EditPhase::Viewing => viewing_row(record),
        phase => {
            let draft = editor
                .draft_of(record.id)
                .cloned()
                .unwrap_or_else(|| record.fields());
            editing_row(record.id, &draft, phase == EditPhase::Saving)
        }
    }
}

fn viewing_row(record: &StudentRecord) -> Markup {
    html! {
        tr id={"student-" (record.id)} {
            td class=(CELL_CLASSES) {(record.first_name)}
            td class=(CELL_CLASSES) {(record.last_name)}
            td class=(CELL_CLASSES) {(record.gender)}
            td class=(CELL_CLASSES) {(record.department)}
            td class=(CELL_CLASSES) {(record.address)}
            td class=(CELL_CLASSES) {
                div class="flex flex-row space-x-2" {
                    button hx-get={"/internal/students/" (record.id) "/edit"} hx-target="closest tr" hx-swap="outerHTML" class=(SECONDARY_BUTTON_CLASSES) {"Edit"}
                    button hx-get={"/internal/students/" (record.id) "/delete"} hx-target="#modal" class=(DANGER_BUTTON_CLASSES) {"Delete"}
                }
            }
        }
    }
}

fn editing_row(id: StudentId, draft: &StudentFields, saving: bool) -> Markup {
    let inputs = [
        ("firstName", draft.first_name.as_str()),
        ("lastName", draft.last_name.as_str()),
        ("gender", draft.gender.as_str()),
        ("department", draft.department.as_str()),
        ("address", draft.address.as_str()),
    ];

    html! {
        tr id={"student-" (id)} class="bg-gray-700" {
            @for (name, value) in inputs {
                td class=(CELL_CLASSES) {
                    input type="text" name=(name) value=(value) disabled[saving] class=(INPUT_CLASSES) {}
                }
            }
            td class=(CELL_CLASSES) {
                div class="flex flex-row space-x-2" {
                    button hx-put={"/internal/students/" (id)} hx-include="closest tr" hx-target="closest tr" hx-swap="outerHTML" disabled[saving] class=(BUTTON_CLASSES) {
                        @if saving {"Saving..."} @else {"Save"}
                    }
                    button hx-get={"/internal/students/" (id) "/cancel_edit"} hx-target="closest tr" hx-swap="outerHTML" disabled[saving] class=(SECONDARY_BUTTON_CLASSES) {"Cancel"}
                }
            }
        }
    }
}

pub async fn internal_get_students_table(
    State(state): State<StudentsState>,
    headers: HeaderMap,
    Query(query): Query<TableQuery>,
) -> Response {
    let Some(dashboard) = state.client_dashboard(&headers).await else {
        return expired();
    };

    let dashboard = dashboard.lock().await;
    render_table(&dashboard, &query, state.config().dashboard().page_size).into_response()
}

pub async fn internal_get_edit_student(
    State(state): State<StudentsState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(dashboard) = state.client_dashboard(&headers).await else {
        return expired();
    };
    let Ok(id) = parse_id(&id) else {
        return error_only("Student not found");
    };

    let mut dashboard = dashboard.lock().await;
    let Some(record) = dashboard.cache.get(id).cloned() else {
        return error_only("Student not found");
    };

    // any other row that was mid-edit goes back to viewing when the table re-renders
    dashboard.editor.begin(&record);
    students_changed(editing_row(id, &record.fields(), false))
}

pub async fn internal_get_cancel_edit(
    State(state): State<StudentsState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(dashboard) = state.client_dashboard(&headers).await else {
        return expired();
    };
    let Ok(id) = parse_id(&id) else {
        return error_only("Student not found");
    };

    let mut dashboard = dashboard.lock().await;
    dashboard.editor.cancel(id);

    match dashboard.cache.get(id) {
        Some(record) => viewing_row(record).into_response(),
        None => html! {}.into_response(),
    }
}

pub async fn internal_put_student(
    State(state): State<StudentsState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(draft): Form<StudentFields>,
) -> Response {
    let Some(dashboard) = state.client_dashboard(&headers).await else {
        return expired();
    };
    let Ok(id) = parse_id(&id) else {
        return error_only("Student not found");
    };

    let Some(to_send) = dashboard.lock().await.editor.begin_save(id, draft) else {
        return students_changed(error_notification(
            "That student is no longer being edited.",
        ));
    };

    match state.records().update_by_id(id, to_send.clone()).await {
        Ok(updated) => {
            dashboard.lock().await.editor.save_succeeded(id);
            if let Err(e) = sync_confirmed(
                &dashboard,
                ConfirmedChange::Updated(updated.clone()),
                state.records(),
            )
            .await
            {
                warn!(?e, "Unable to sync dashboard after update");
            }

            students_changed(html! {
                (viewing_row(&updated))
                (notification("Edit Successful", "Student data has been updated."))
            })
        }
        Err(e) => {
            error!(?e, "Error saving student data");
            dashboard.lock().await.editor.save_failed(id);

            html! {
                (editing_row(id, &to_send, false))
                (error_notification("Unable to save the student, nothing was changed."))
            }
            .into_response()
        }
    }
}

pub async fn internal_get_delete_student(
    State(state): State<StudentsState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(dashboard) = state.client_dashboard(&headers).await else {
        return expired();
    };
    let Ok(id) = parse_id(&id) else {
        return error_only("Student not found");
    };

    let mut dashboard = dashboard.lock().await;
    dashboard.deletion.request(id);
    let name = dashboard.cache.get(id).map(StudentRecord::full_name);

    confirmation_modal(id, name.as_deref(), None).into_response()
}

fn confirmation_modal(id: StudentId, name: Option<&str>, failure: Option<&str>) -> Markup {
    html! {
        div class="fixed inset-0 z-50 flex items-center justify-center bg-black/50" {
            div class="bg-gray-800 p-6 rounded-lg shadow-md max-w-md" {
                @if let Some(failure) = failure {
                    (error_alert(failure))
                }
                p class="mb-4" {"Are you sure you want to delete this student?"}
                @if let Some(name) = name {
                    p class="mb-4 font-semibold" {(name)}
                }
                div class="flex flex-row justify-between space-x-4" {
                    button hx-post={"/internal/students/" (id) "/pending_delete"} hx-target="#modal" class=(SECONDARY_BUTTON_CLASSES) {"Cancel"}
                    @if failure.is_none() {
                        button hx-delete={"/internal/students/" (id) "/pending_delete"} hx-target="#modal" class=(DANGER_BUTTON_CLASSES) {"Yes, Delete"}
                    }
                }
            }
        }
    }
}

pub async fn internal_delete_pending(
    State(state): State<StudentsState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(dashboard) = state.client_dashboard(&headers).await else {
        return expired();
    };
    let Ok(id) = parse_id(&id) else {
        return error_only("Student not found");
    };

    if !dashboard.lock().await.deletion.confirm(id) {
        warn!(%id, "Delete confirmed for a student that wasn't pending");
        return html! {}.into_response();
    }

    match state.records().delete_by_id(id).await {
        Ok(()) => {
            dashboard.lock().await.editor.cancel(id);
            if let Err(e) =
                sync_confirmed(&dashboard, ConfirmedChange::Deleted(id), state.records()).await
            {
                warn!(?e, "Unable to sync dashboard after delete");
            }

            students_changed(notification(
                "Student Deleted",
                "The student has been successfully deleted.",
            ))
        }
        Err(e) => {
            error!(?e, "Error deleting student");
            let name = dashboard
                .lock()
                .await
                .cache
                .get(id)
                .map(StudentRecord::full_name);
            confirmation_modal(id, name.as_deref(), Some("Unable to delete the student."))
                .into_response()
        }
    }
}

pub async fn internal_post_cancel_pending(
    State(state): State<StudentsState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(dashboard) = state.client_dashboard(&headers).await else {
        return expired();
    };

    if let Ok(id) = parse_id(&id) {
        dashboard.lock().await.deletion.cancel(id);
    }
    html! {}.into_response()
}
