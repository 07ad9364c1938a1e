//! Output formatting for task lists and details.

use crate::form::RecordForm;
use crate::types::TaskSummary;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a list of `{id, name}` rows.
pub fn format_summaries(tasks: &[TaskSummary], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json!(tasks).to_string(),
        OutputFormat::Text => {
            if tasks.is_empty() {
                return "(no tasks)\n".to_string();
            }
            let width = tasks
                .iter()
                .map(|t| t.id.to_string().len())
                .max()
                .unwrap_or(1);
            let mut out = String::new();
            for task in tasks {
                out.push_str(&format!("{:>width$}  {}\n", task.id, task.name));
            }
            out
        }
    }
}

/// Render a record form read-only.
pub fn format_form(form: &RecordForm) -> String {
    let mut out = format!("== {} ==\n", form.title);
    for spec in &form.fields {
        let value = form.value(spec.key);
        if form.is_expanded(spec) {
            out.push_str(&format!("{}:\n", spec.label));
            for line in value.lines() {
                out.push_str(&format!("  {}\n", line));
            }
        } else {
            out.push_str(&format!("{}: {}\n", spec.label, value));
        }
    }
    out
}
