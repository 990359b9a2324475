//! Renderers for the assembled `ResumeDocument` (§4.8's "render" phase).
//!
//! PDF is attempted first via a LaTeX template compiled with `pdflatex`
//! (grounded in the original system's `latex_renderer.py`); any failure is
//! logged and recorded as a `None` path, never propagated — the resume_id
//! and structured sections are the primary product (§7, Renderer row).
//! DOCX is always attempted afterward with `docx-rs`, the teacher's
//! existing dependency (used there for reading; here for writing).

mod docx;
mod pdf;

use crate::domain::draft::ResumeDocument;
use std::path::PathBuf;
use std::time::Duration;

pub struct RenderResult {
    pub pdf_path: Option<String>,
    pub docx_path: Option<String>,
}

/// Sanitized filename stem per §4.8: keep `[A-Za-z0-9-_ ]`, replace spaces
/// with underscores.
pub fn sanitize_filename(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_' || *c == ' ')
        .collect();
    kept.trim().replace(' ', "_")
}

/// Render both formats into `output_dir/{stem}_v{version}.{ext}`. Never
/// returns an error: both renderer failures are independently recoverable.
pub async fn render_all(
    document: &ResumeDocument,
    output_dir: &str,
    job_title: &str,
    version: i64,
    pdf_timeout: Duration,
) -> RenderResult {
    let stem = format!("{}_v{}", sanitize_filename(job_title), version);
    if let Err(e) = std::fs::create_dir_all(output_dir) {
        log::warn!("[render] failed to create output dir {}: {}", output_dir, e);
        return RenderResult { pdf_path: None, docx_path: None };
    }

    let pdf_path = PathBuf::from(output_dir).join(format!("{}.pdf", stem));
    let pdf_result = match pdf::render_pdf(document, &pdf_path, pdf_timeout).await {
        Ok(path) => Some(path.to_string_lossy().into_owned()),
        Err(e) => {
            log::warn!("[render] PDF rendering failed for '{}': {}", job_title, e);
            None
        }
    };

    let docx_path_buf = PathBuf::from(output_dir).join(format!("{}.docx", stem));
    let docx_path = match docx::render_docx(document, &docx_path_buf) {
        Ok(path) => Some(path.to_string_lossy().into_owned()),
        Err(e) => {
            log::warn!("[render] DOCX rendering failed for '{}': {}", job_title, e);
            None
        }
    };

    RenderResult { pdf_path, docx_path }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_allowed_chars_and_replaces_spaces() {
        assert_eq!(sanitize_filename("Senior Backend Engineer!"), "Senior_Backend_Engineer");
        assert_eq!(sanitize_filename("C++ / Rust Dev"), "C__Rust_Dev");
    }
}
