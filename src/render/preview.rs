use crate::api::PreviewResult;
use crate::config::PreviewDefaults;
use crate::html::escape;

/// Value of the `data-action` attribute on the preview's apply button.
const APPLY_ACTION: &str = "apply-preview";

/// File count, confidence, complexity, one collapsible diff per sampled
/// change, and a button that re-runs the request through `execute`.
///
/// Missing confidence or complexity fall back to `defaults`.
pub fn render_preview(result: &PreviewResult, defaults: &PreviewDefaults) -> String {
    let summary = &result.plan_summary;
    let confidence = summary.confidence.unwrap_or(defaults.default_confidence) * 100.0;
    let complexity = summary
        .estimated_complexity
        .as_deref()
        .unwrap_or(&defaults.default_complexity);

    let mut html = String::from("<div class=\"result-card preview\"><h3>👀 Preview</h3>");
    html.push_str(&format!(
        "<div class=\"preview-stats\">\
         <span class=\"stat\">{count} file{plural} to change</span>\
         <span class=\"stat\">Confidence: {confidence:.1}%</span>\
         <span class=\"stat\">Complexity: {complexity}</span>\
         </div>",
        count = summary.total_instructions,
        plural = if summary.total_instructions == 1 { "" } else { "s" },
        complexity = escape(complexity),
    ));

    if result.sample_changes.is_empty() {
        html.push_str("<p class=\"hint\">No sample changes were generated for this request.</p>");
    }
    for change in &result.sample_changes {
        html.push_str("<div class=\"sample-change\"><div class=\"sample-header\">");
        html.push_str(&format!("<code>{}</code>", escape(&change.file_path)));
        if let Some(language) = &change.language {
            html.push_str(&format!(" <span class=\"language\">{}</span>", escape(language)));
        }
        html.push_str("</div>");
        if let Some(diff) = change.diff.as_deref().filter(|d| !d.is_empty()) {
            html.push_str(&format!(
                "<details><summary>Show diff</summary><pre class=\"diff\">{}</pre></details>",
                escape(diff)
            ));
        }
        html.push_str("</div>");
    }

    html.push_str(&format!(
        "<button type=\"button\" class=\"btn btn-primary\" data-action=\"{APPLY_ACTION}\">Apply these changes</button></div>"
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{PlanSummary, SampleChange};

    fn empty_preview() -> PreviewResult {
        PreviewResult {
            plan_summary: PlanSummary::default(),
            sample_changes: vec![],
            request_id: None,
        }
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let mut result = empty_preview();
        result.plan_summary.confidence = Some(0.0);
        let html = render_preview(&result, &PreviewDefaults::default());
        assert!(html.contains("Confidence: 0.0%"));
        assert!(html.contains("Complexity: medium"));
    }

    #[test]
    fn test_configured_defaults() {
        let defaults = PreviewDefaults {
            default_confidence: 0.5,
            default_complexity: "unknown".to_string(),
        };
        let html = render_preview(&empty_preview(), &defaults);
        assert!(html.contains("Confidence: 50.0%"));
        assert!(html.contains("Complexity: unknown"));
    }

    #[test]
    fn test_stats_and_samples() {
        let result = PreviewResult {
            plan_summary: PlanSummary {
                total_instructions: 3,
                confidence: Some(0.853),
                estimated_complexity: Some("quick".to_string()),
            },
            sample_changes: vec![
                SampleChange {
                    file_path: "src/app.py".to_string(),
                    language: Some("python".to_string()),
                    diff: Some("-old\n+new".to_string()),
                },
                SampleChange {
                    file_path: "README.md".to_string(),
                    language: None,
                    diff: None,
                },
            ],
            request_id: None,
        };
        let html = render_preview(&result, &PreviewDefaults::default());
        assert!(html.contains("3 files to change"));
        assert!(html.contains("Confidence: 85.3%"));
        assert!(html.contains("Complexity: quick"));
        assert!(html.contains("<code>src/app.py</code> <span class=\"language\">python</span>"));
        assert_eq!(html.matches("<details>").count(), 1);
        assert!(html.contains("data-action=\"apply-preview\""));
    }

    #[test]
    fn test_diff_text_is_escaped() {
        let mut result = empty_preview();
        result.sample_changes.push(SampleChange {
            file_path: "index.html".to_string(),
            language: Some("html".to_string()),
            diff: Some("+<script>steal()</script>\n-if a < b && c".to_string()),
        });
        let html = render_preview(&result, &PreviewDefaults::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("+&lt;script&gt;steal()&lt;/script&gt;\n-if a &lt; b &amp;&amp; c"));
    }
}
