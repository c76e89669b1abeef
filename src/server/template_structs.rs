//! Askama template structs for the web interface.
//!
//! Each struct corresponds to an HTML template in the templates/ directory.

use askama::Template;

use crate::pipeline::PipelineOutcome;

/// Upload form, optionally showing a message or the last result.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    pub has_message: bool,
    pub message: String,
    pub has_result: bool,
    pub extracted_text: String,
    pub corrected_text: String,
    pub summary: String,
    pub engine: String,
    pub used_fallback: bool,
    pub has_image: bool,
    pub image_url: String,
}

impl<'a> IndexTemplate<'a> {
    /// Bare upload form.
    pub fn form() -> Self {
        Self {
            title: "Upload",
            has_message: false,
            message: String::new(),
            has_result: false,
            extracted_text: String::new(),
            corrected_text: String::new(),
            summary: String::new(),
            engine: String::new(),
            used_fallback: false,
            has_image: false,
            image_url: String::new(),
        }
    }

    /// Upload form with a notice such as "No image uploaded".
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            has_message: true,
            message: message.into(),
            ..Self::form()
        }
    }

    /// Results page for a processed upload.
    pub fn with_outcome(outcome: &PipelineOutcome, saved_as: Option<&str>) -> Self {
        Self {
            title: "Result",
            has_result: true,
            extracted_text: outcome.display_text(),
            corrected_text: outcome.display_corrected(),
            summary: outcome.display_summary().to_string(),
            engine: outcome.engine.to_string(),
            used_fallback: outcome.used_fallback,
            has_image: saved_as.is_some(),
            image_url: saved_as
                .map(|name| format!("/uploads/{}", name))
                .unwrap_or_default(),
            ..Self::form()
        }
    }
}

/// Error page template.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub title: &'a str,
    pub message: &'a str,
}
