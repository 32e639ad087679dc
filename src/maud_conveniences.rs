use maud::{Markup, Render, html};

pub const INPUT_CLASSES: &str = "shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
pub const BUTTON_CLASSES: &str = "bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline disabled:opacity-50 disabled:cursor-not-allowed";
pub const SECONDARY_BUTTON_CLASSES: &str = "bg-gray-700 hover:bg-gray-600 text-gray-300 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline";
pub const DANGER_BUTTON_CLASSES: &str = "bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded";

pub fn render_nav() -> Markup {
    html! {
        nav class="w-full bg-gray-800 shadow-md mb-8" {
            div class="max-w-6xl mx-auto px-4 py-3 flex flex-row space-x-6" {
                a href="/" class="font-semibold hover:text-blue-400" {"Students"}
                a href="/studentdetails" class="hover:text-blue-400" {"Add Student"}
                a href="/dashboard" class="hover:text-blue-400" {"Dashboard"}
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, element: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (element)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    value: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required[required] type="text" id=(id) name=(id) value=[value] class=(INPUT_CLASSES) {}
        },
    )
}

pub fn select_element(
    id: &'static str,
    options: impl IntoIterator<Item = &'static str>,
    current: Option<&str>,
) -> Markup {
    html! {
        select id=(id) name=(id) class=(INPUT_CLASSES) {
            @for option in options {
                option value=(option) selected[current == Some(option)] {(option)}
            }
        }
    }
}

pub fn form_submit_button(text: Option<&str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class=(BUTTON_CLASSES) {
                (text.unwrap_or("Submit"))
            }
        }
    }
}

pub fn error_alert(desc: impl Render) -> Markup {
    html! {
        div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
            strong class="font-bold" {"Error! "}
            span {(desc)}
        }
    }
}

pub fn success_alert(desc: impl Render) -> Markup {
    html! {
        div class="bg-green-100 border border-green-400 text-green-700 px-4 py-3 rounded relative mb-4" role="status" {
            span {(desc)}
        }
    }
}

/// Out-of-band toast, swapped into the page's notification area.
pub fn notification(heading: &str, description: &str) -> Markup {
    html! {
        div hx-swap-oob="beforeend:#notifications" {
            div class="bg-gray-700 border border-gray-500 rounded shadow-md px-4 py-3 max-w-xs" role="status" {
                button type="button" class="float-right text-gray-400 hover:text-white ml-2" onclick="this.parentElement.remove()" {"×"}
                p class="font-semibold" {(heading)}
                p class="text-sm text-gray-300" {(description)}
            }
        }
    }
}
