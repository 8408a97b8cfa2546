use crate::api::types::PlanResult;
use crate::html::escape;

use super::escaped_list;

/// Planned instructions in priority order, followed by risks and
/// dependencies.
pub fn render_plan(result: &PlanResult) -> String {
    let plan = &result.plan;
    let mut html = String::from("<div class=\"result-card plan\"><h3>🗺️ Edit plan</h3>");

    let mut stats = format!(
        "<div class=\"plan-stats\"><span class=\"stat\">{} step{}</span>",
        plan.instructions.len(),
        if plan.instructions.len() == 1 { "" } else { "s" }
    );
    if let Some(confidence) = plan.confidence {
        stats.push_str(&format!("<span class=\"stat\">Confidence: {:.1}%</span>", confidence * 100.0));
    }
    if let Some(complexity) = &plan.estimated_complexity {
        stats.push_str(&format!("<span class=\"stat\">Complexity: {}</span>", escape(complexity)));
    }
    stats.push_str("</div>");
    html.push_str(&stats);

    let mut ordered: Vec<_> = plan.instructions.iter().collect();
    ordered.sort_by_key(|instruction| instruction.priority);

    if !ordered.is_empty() {
        html.push_str("<ol class=\"plan-steps\">");
        for instruction in ordered {
            html.push_str(&format!(
                "<li><span class=\"marker\">{marker}</span> <code>{path}</code> <span class=\"priority\">P{priority}</span> {description}</li>",
                marker = instruction.change_type.marker(),
                path = escape(&instruction.file_path),
                priority = instruction.priority,
                description = escape(&instruction.description),
            ));
        }
        html.push_str("</ol>");
    }

    if !plan.risks.is_empty() {
        html.push_str("<h4>Risks</h4>");
        html.push_str(&escaped_list("plan-risks", &plan.risks));
    }
    if !plan.dependencies.is_empty() {
        html.push_str("<h4>Dependencies</h4>");
        html.push_str(&escaped_list("plan-dependencies", &plan.dependencies));
    }

    html.push_str("</div>");
    html
}
