use crate::api::AnalysisResult;
use crate::html::escape;

use super::escaped_list;

/// Repository overview: identity, size, languages, and the files the
/// backend considers most relevant for edits.
pub fn render_analysis(result: &AnalysisResult) -> String {
    let repo = &result.repository;
    let analysis = &result.analysis;

    let mut html = format!(
        "<div class=\"result-card analysis\"><h3>🔍 {}/{}</h3>",
        escape(&repo.owner),
        escape(&repo.name)
    );
    if let Some(description) = repo.description.as_deref().filter(|d| !d.trim().is_empty()) {
        html.push_str(&format!("<p class=\"description\">{}</p>", escape(description)));
    }

    html.push_str(&format!(
        "<div class=\"analysis-stats\"><span class=\"stat\">{} file{}</span>\
         <span class=\"stat\">{} director{}</span>",
        analysis.file_count,
        if analysis.file_count == 1 { "" } else { "s" },
        analysis.structure_summary.directories,
        if analysis.structure_summary.directories == 1 { "y" } else { "ies" },
    ));
    if let Some(branch) = &repo.default_branch {
        html.push_str(&format!(
            "<span class=\"stat\">Default branch: <code>{}</code></span>",
            escape(branch)
        ));
    }
    html.push_str("</div>");

    if !analysis.languages.is_empty() {
        html.push_str("<h4>Languages</h4>");
        html.push_str(&escaped_list("languages", &analysis.languages));
    }

    if !analysis.important_files.is_empty() {
        html.push_str("<h4>Important files</h4><ul class=\"important-files\">");
        for path in &analysis.important_files {
            html.push_str(&format!("<li><code>{}</code></li>", escape(path)));
        }
        html.push_str("</ul>");
    }

    html.push_str("</div>");
    html
}
