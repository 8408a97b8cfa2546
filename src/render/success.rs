use tracing::warn;

use crate::api::SuccessResult;
use crate::html::escape;
use crate::validate::HOSTING_DOMAIN;

use super::escaped_list;

/// Only links into the hosting domain become anchors; escaping alone does
/// not stop `javascript:` or `data:` URLs from running.
fn is_pull_request_url(url: &str) -> bool {
    url.strip_prefix("https://")
        .and_then(|rest| rest.strip_prefix(HOSTING_DOMAIN))
        .is_some_and(|path| path.starts_with('/'))
}

/// Changed files with per-type markers, the pull request link when one was
/// opened, and any warnings.
pub fn render_success(result: &SuccessResult) -> String {
    let mut html = String::from("<div class=\"result-card success\"><h3>✅ Changes applied</h3>");

    let count = result.changes_count.unwrap_or(result.changed_files.len());
    html.push_str(&format!(
        "<p class=\"summary\">{count} file{} changed",
        if count == 1 { "" } else { "s" }
    ));
    if let Some(branch) = &result.branch_name {
        html.push_str(&format!(" on branch <code>{}</code>", escape(branch)));
    }
    html.push_str(".</p>");

    if let Some(pr) = &result.pull_request {
        let label = match pr.number {
            Some(number) => format!("View pull request #{number}"),
            None => "View pull request".to_string(),
        };
        if is_pull_request_url(&pr.url) {
            html.push_str(&format!(
                "<p class=\"pr-link\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{label}</a></p>",
                escape(&pr.url)
            ));
        } else {
            warn!(url = %pr.url, "pull request link is not on the hosting domain, not linking it");
            html.push_str(&format!(
                "<p class=\"pr-link\">{label}: <code>{}</code></p>",
                escape(&pr.url)
            ));
        }
    }
    if let Some(error) = &result.pull_request_error {
        html.push_str(&format!(
            "<p class=\"pr-error\">Pull request was not created: {}</p>",
            escape(error)
        ));
    }

    if !result.changed_files.is_empty() {
        html.push_str("<h4>Changed files</h4><ul class=\"changed-files\">");
        for file in &result.changed_files {
            html.push_str(&format!(
                "<li class=\"change-{label}\"><span class=\"marker\">{marker}</span> <code>{path}</code> <span class=\"change-type\">{label}</span></li>",
                label = file.change_type.label(),
                marker = file.change_type.marker(),
                path = escape(&file.file_path),
            ));
        }
        html.push_str("</ul>");
    }

    if !result.warnings.is_empty() {
        html.push_str("<div class=\"warnings\"><h4>⚠️ Warnings</h4>");
        html.push_str(&escaped_list("warning-list", &result.warnings));
        html.push_str("</div>");
    }

    html.push_str("</div>");
    html
}
