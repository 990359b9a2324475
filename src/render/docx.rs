//! DOCX rendering via `docx-rs`, the teacher's existing dependency (used
//! there to *read* imported resumes in `profile_import.rs`; here to write
//! the generated one), grounded in the original system's `export_service.py`
//! structure: name, contact line, then one heading + paragraph/bullet block
//! per non-empty section.

use crate::domain::draft::{ResumeDocument, ResumeDocumentSection};
use docx_rs::{AlignmentType, Docx, Paragraph, Run};
use std::fs::File;
use std::path::{Path, PathBuf};

fn heading(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).bold().size(28))
}

fn body_text(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn bullet(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(format!("\u{2022} {}", text)))
}

/// Always attempted per §4.8; any I/O or encoding failure is returned as
/// an error string for the caller to log, never fatal to generation.
pub fn render_docx(document: &ResumeDocument, output_path: &Path) -> Result<PathBuf, String> {
    let mut docx = Docx::new();

    for section in &document.sections {
        match section {
            ResumeDocumentSection::PersonalInfo { info } => {
                docx = docx.add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text(&info.full_name).bold().size(36))
                        .align(AlignmentType::Center),
                );
                let mut contact_parts = Vec::new();
                if let Some(email) = &info.email {
                    contact_parts.push(email.clone());
                }
                if let Some(phone) = &info.phone_number {
                    contact_parts.push(phone.clone());
                }
                if !contact_parts.is_empty() {
                    docx = docx.add_paragraph(body_text(&contact_parts.join(" | ")).align(AlignmentType::Center));
                }
            }
            ResumeDocumentSection::Education { entries } => {
                docx = docx.add_paragraph(heading("Education"));
                for e in entries {
                    let years = format!(
                        "{}–{}",
                        e.start_year.map(|y| y.to_string()).unwrap_or_default(),
                        e.end_year.map(|y| y.to_string()).unwrap_or_default()
                    );
                    docx = docx.add_paragraph(body_text(&format!("{}, {} ({})", e.degree, e.institution, years)));
                }
            }
            ResumeDocumentSection::Experience { entries } => {
                docx = docx.add_paragraph(heading("Experience"));
                docx = add_entries(docx, entries);
            }
            ResumeDocumentSection::Projects { entries } => {
                docx = docx.add_paragraph(heading("Projects"));
                docx = add_entries(docx, entries);
            }
            ResumeDocumentSection::Skills { skills, .. } => {
                docx = docx.add_paragraph(heading("Skills"));
                docx = docx.add_paragraph(body_text(&skills.join(", ")));
            }
            ResumeDocumentSection::Certifications { entries } => {
                docx = docx.add_paragraph(heading("Certifications"));
                for c in entries {
                    let suffix = c.year.map(|y| format!(" ({})", y)).unwrap_or_default();
                    docx = docx.add_paragraph(body_text(&format!("{}{}", c.name, suffix)));
                }
            }
            ResumeDocumentSection::Achievements { entries } => {
                docx = docx.add_paragraph(heading("Achievements"));
                for a in entries {
                    docx = docx.add_paragraph(bullet(&a.title));
                }
            }
            ResumeDocumentSection::ExternalProfiles { entries } => {
                docx = docx.add_paragraph(heading("Profiles"));
                for p in entries {
                    docx = docx.add_paragraph(body_text(&format!("{}: {}", p.platform, p.profile_url)));
                }
            }
        }
    }

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("failed to create output directory: {}", e))?;
    }
    let file = File::create(output_path).map_err(|e| format!("failed to create DOCX file: {}", e))?;
    docx.build().pack(file).map_err(|e| format!("failed to write DOCX: {}", e))?;

    Ok(output_path.to_path_buf())
}

fn add_entries(mut docx: Docx, entries: &[crate::domain::draft::ResolvedEntry]) -> Docx {
    for entry in entries {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(&entry.title).bold()));
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(&entry.subtitle).italic()));
        for b in &entry.bullets {
            docx = docx.add_paragraph(bullet(b));
        }
    }
    docx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draft::PersonalInfo;
    use std::collections::HashMap;

    #[test]
    fn renders_docx_file_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("resume.docx");
        let document = ResumeDocument {
            job_title: "Backend Engineer".to_string(),
            sections: vec![ResumeDocumentSection::PersonalInfo {
                info: PersonalInfo { full_name: "Jane Doe".to_string(), email: None, phone_number: None },
            }],
            keyword_coverage: HashMap::new(),
        };
        let result = render_docx(&document, &output_path).unwrap();
        assert!(result.exists());
        assert!(std::fs::metadata(result).unwrap().len() > 0);
    }
}
