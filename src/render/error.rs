use crate::api::ErrorResult;
use crate::html::escape;

use super::escaped_list;

pub fn render_error(result: &ErrorResult) -> String {
    let mut html = format!(
        "<div class=\"result-card error\"><h3>❌ Error</h3><p class=\"error-message\">{}</p>",
        escape(&result.message)
    );
    html.push_str(&escaped_list("error-details", &result.detail_errors));
    if let Some(request_id) = &result.request_id {
        html.push_str(&format!(
            "<p class=\"request-id\">Request ID: <code>{}</code></p>",
            escape(request_id)
        ));
    }
    html.push_str("</div>");
    html
}
