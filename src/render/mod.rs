//! HTML fragments for the console's result panel.
//!
//! Every renderer is a pure function of its input. Text that came from the
//! user or the backend is passed through [`crate::html::escape`] before it is
//! interpolated; the templates themselves are the only raw markup.

mod analysis;
mod error;
mod plan;
mod preview;
mod success;

pub use analysis::render_analysis;
pub use error::render_error;
pub use plan::render_plan;
pub use preview::render_preview;
pub use success::render_success;

use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::{OperationKind, OperationResult};
use crate::config::PreviewDefaults;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write fragment file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Render whichever variant `result` holds.
pub fn render_result(result: &OperationResult, defaults: &PreviewDefaults) -> String {
    match result {
        OperationResult::Success(success) => render_success(success),
        OperationResult::Preview(preview) => render_preview(preview, defaults),
        OperationResult::Plan(plan) => render_plan(plan),
        OperationResult::Analysis(analysis) => render_analysis(analysis),
        OperationResult::Error(error) => render_error(error),
    }
}

/// Placeholder shown while an operation is in flight.
pub fn render_loading(kind: OperationKind) -> String {
    let label = match kind {
        OperationKind::Execute => "Applying changes and opening a pull request…",
        OperationKind::Preview => "Generating a preview of the changes…",
        OperationKind::Plan => "Planning the changes…",
        OperationKind::Analyze => "Analyzing the repository…",
    };
    format!(
        "<div class=\"result-card loading\">\
         <div class=\"spinner\" role=\"status\"></div>\
         <p>{label}</p>\
         <p class=\"hint\">This can take a minute for larger repositories.</p>\
         </div>"
    )
}

/// Write a fragment to stdout (default) or to a file.
#[instrument(skip(fragment), fields(bytes = fragment.len()))]
pub fn output(fragment: &str, output_path: Option<&Path>) -> Result<(), OutputError> {
    match output_path {
        None => {
            debug!("writing fragment to terminal");
            println!("{fragment}");
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing fragment to file");
            std::fs::write(path, fragment)?;
            Ok(())
        }
    }
}

/// `<ul>` of escaped items, or nothing when `items` is empty.
fn escaped_list(class: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut html = format!("<ul class=\"{class}\">");
    for item in items {
        html.push_str("<li>");
        html.push_str(&crate::html::escape(item));
        html.push_str("</li>");
    }
    html.push_str("</ul>");
    html
}
