use crate::{
    cache::ConfirmedChange,
    dashboard::sync_confirmed,
    data::student::{SUGGESTED_DEPARTMENTS, SUGGESTED_GENDERS, StudentFields},
    maud_conveniences::{
        INPUT_CLASSES, SECONDARY_BUTTON_CLASSES, error_alert, form_element, form_submit_button,
        select_element, simple_form_element, success_alert, title,
    },
    routes::students_changed,
    state::StudentsState,
};
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

pub async fn get_student_details(State(state): State<StudentsState>) -> Markup {
    state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-lg w-full" {
            (title("Student Details Form"))
            div id="student_form" {
                (student_form(&StudentFields::default()))
            }
        }
    })
}

pub fn student_form(values: &StudentFields) -> Markup {
    let current_gender = if values.gender.is_empty() {
        SUGGESTED_GENDERS[0]
    } else {
        values.gender.as_str()
    };
    let current_department = Some(values.department.as_str()).filter(|d| !d.is_empty());

    html! {
        form hx-post="/internal/new_student" hx-trigger="submit" hx-target="#student_form" hx-swap="outerHTML" class="p-4" {
            (simple_form_element("firstName", "First Name", true, Some(values.first_name.as_str())))
            (simple_form_element("lastName", "Last Name", true, Some(values.last_name.as_str())))

            (form_element("gender", "Gender", html! {
                div class="flex flex-row space-x-4" {
                    @for gender in SUGGESTED_GENDERS {
                        label class="flex items-center space-x-2 cursor-pointer" {
                            input type="radio" name="gender" value=(gender) checked[gender == current_gender] {}
                            span {(gender)}
                        }
                    }
                }
            }))

            (form_element("department", "Department", select_element("department", SUGGESTED_DEPARTMENTS, current_department)))

            (form_element("address", "Address", html! {
                textarea id="address" name="address" placeholder="Type your address here." class=(INPUT_CLASSES) {(values.address)}
            }))

            (form_submit_button(Some("Submit")))
        }
    }
}

/// The same form, opened over the dashboard so a create lands in its cache.
pub async fn internal_get_new_student_form() -> Markup {
    html! {
        div class="fixed inset-0 z-50 flex items-center justify-center bg-black/50" {
            div class="bg-gray-800 p-6 rounded-lg shadow-md max-w-lg w-full" {
                div class="flex flex-row justify-between items-center" {
                    (title("Add a Student"))
                    button type="button" onclick="document.getElementById('modal').replaceChildren()" class=(SECONDARY_BUTTON_CLASSES) {"Close"}
                }
                div id="student_form" {
                    (student_form(&StudentFields::default()))
                }
            }
        }
    }
}

pub async fn internal_post_new_student(
    State(state): State<StudentsState>,
    headers: HeaderMap,
    Form(fields): Form<StudentFields>,
) -> Response {
    let created = match state.records().create(fields.clone()).await {
        Ok(created) => created,
        Err(e) => {
            error!(?e, "Error submitting student");
            return html! {
                div id="student_form" {
                    (error_alert("An error occurred while submitting data."))
                    (student_form(&fields))
                }
            }
            .into_response();
        }
    };

    let markup = html! {
        div id="student_form" {
            (success_alert(html! {
                "Data submitted successfully! "
                a href="/dashboard" class="underline font-semibold" {"View the dashboard"}
            }))
            (student_form(&StudentFields::default()))
        }
    };

    // the standalone page has no dashboard of its own, the next mount lists everything
    let Some(dashboard) = state.client_dashboard(&headers).await else {
        return markup.into_response();
    };

    if let Err(e) =
        sync_confirmed(&dashboard, ConfirmedChange::Created(created), state.records()).await
    {
        warn!(?e, "Unable to sync dashboard after create");
    }
    students_changed(markup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::SyncPolicy,
        config::RuntimeConfiguration,
        dashboard::{DASHBOARD_CLIENT_HEADER, refresh},
        data::{
            memory_store::MemoryRecordStore,
            test_utils::{UnreachableStore, fields},
        },
        service::RecordService,
    };
    use std::sync::Arc;

    async fn body_of(response: Response) -> (bool, String) {
        let triggered = response.headers().contains_key("HX-Trigger");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (triggered, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn submitting_from_a_dashboard_patches_its_cache() {
        let state = StudentsState::with_store(
            Arc::new(MemoryRecordStore::new()),
            RuntimeConfiguration::for_tests(),
        );
        let (client, dashboard) = state.dashboards().mount(SyncPolicy::PatchLocally).await;
        refresh(&dashboard, state.records()).await.unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(DASHBOARD_CLIENT_HEADER, client.to_string().parse().unwrap());

        let (triggered, markup) = body_of(
            internal_post_new_student(
                State(state.clone()),
                headers,
                Form(fields("Anna", "Smith", "Female", "BCA")),
            )
            .await,
        )
        .await;
        assert!(triggered);
        assert!(markup.contains("Data submitted successfully!"));

        let stored = state.service().list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        let dashboard = dashboard.lock().await;
        assert_eq!(dashboard.cache.records(), stored);
        assert_eq!(dashboard.cache.patches_since_sync(), 1);
    }

    #[tokio::test]
    async fn submitting_from_the_form_page_just_creates() {
        let state = StudentsState::with_store(
            Arc::new(MemoryRecordStore::new()),
            RuntimeConfiguration::for_tests(),
        );

        let (triggered, markup) = body_of(
            internal_post_new_student(
                State(state.clone()),
                HeaderMap::new(),
                Form(fields("Anna", "Smith", "Female", "BCA")),
            )
            .await,
        )
        .await;
        assert!(!triggered);
        assert!(markup.contains("Data submitted successfully!"));
        assert_eq!(state.service().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failures_keep_what_was_typed() {
        let state =
            StudentsState::with_store(Arc::new(UnreachableStore), RuntimeConfiguration::for_tests());

        let (triggered, markup) = body_of(
            internal_post_new_student(
                State(state.clone()),
                HeaderMap::new(),
                Form(fields("Anna", "Smith", "Female", "BCA")),
            )
            .await,
        )
        .await;

        assert!(!triggered);
        assert!(markup.contains("An error occurred while submitting data."));
        assert!(markup.contains("value=\"Anna\""));
    }

    #[test]
    fn form_defaults_to_the_first_gender() {
        let markup = student_form(&StudentFields::default()).into_string();
        assert!(markup.contains(r#"value="Male" checked"#));
    }
}
