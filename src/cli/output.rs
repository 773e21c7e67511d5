//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ExamError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ExamError) -> String {
    match e {
        ExamError::AuthRequired => format!(
            "{}\nPass --user <id> or set session.user in config/config.toml.",
            e
        ),
        ExamError::Validation(errors) => {
            let mut out = String::from("Invalid exam:");
            for (field, message) in errors.iter() {
                out.push_str(&format!("\n  {}: {}", field, message));
            }
            out
        }
        other => other.to_string(),
    }
}
