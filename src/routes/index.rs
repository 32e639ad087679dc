use axum::extract::State;
use maud::{Markup, html};
use crate::state::StudentsState;

pub async fn get_index_route(State(state): State<StudentsState>) -> Markup {
    state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full" {
            h1 class="text-2xl font-semibold mb-6 text-center" {
                "Student Details"
            }

            div class="flex flex-row space-x-4 justify-center" {
                a href="/studentdetails" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded"  {
                    "Add a Student"
                }
                a href="/dashboard" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded"  {
                    "View Dashboard"
                }
            }
        }
    })
}
