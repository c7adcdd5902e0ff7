//! Alert banners for surfacing error messages on the views.

use maud::{Markup, html};

/// A red banner for when fetching data from the backend services fails.
pub fn error_alert(message: &str) -> Markup {
    html! {
        div
            data-alert="error"
            role="alert"
            class="w-full p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400"
        {
            (message)
        }
    }
}
