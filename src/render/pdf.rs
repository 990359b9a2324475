//! LaTeX-based PDF rendering via a `pdflatex` subprocess, grounded in the
//! original system's `latex_renderer.py`: build a minimal `article`-class
//! LaTeX source from the document tree, compile it in a scratch directory,
//! and copy the resulting PDF to the destination path.

use crate::domain::draft::{Confidence, ResumeDocumentSection};
use crate::domain::draft::ResumeDocument;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Escape LaTeX special characters. Order matters: backslash first, so
/// the replacement text for the other characters isn't re-escaped.
fn latex_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '$' => out.push_str("\\$"),
            '#' => out.push_str("\\#"),
            '_' => out.push_str("\\_"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

fn confidence_suffix(name: &str, confidence: &std::collections::HashMap<String, Confidence>) -> String {
    match confidence.iter().find(|(skill, _)| skill.eq_ignore_ascii_case(name)) {
        Some((_, Confidence::Weak)) => format!("{}*", latex_escape(name)),
        _ => latex_escape(name),
    }
}

fn render_latex(document: &ResumeDocument) -> String {
    let mut body = String::new();

    for section in &document.sections {
        match section {
            ResumeDocumentSection::PersonalInfo { info } => {
                body.push_str(&format!(
                    "{{\\LARGE\\bfseries {}}}\\\\[4pt]\n",
                    latex_escape(&info.full_name)
                ));
                let mut contact = Vec::new();
                if let Some(email) = &info.email {
                    contact.push(latex_escape(email));
                }
                if let Some(phone) = &info.phone_number {
                    contact.push(latex_escape(phone));
                }
                if !contact.is_empty() {
                    body.push_str(&format!("{}\\\\[8pt]\n", contact.join(" $\\mid$ ")));
                }
            }
            ResumeDocumentSection::Education { entries } => {
                body.push_str("\\section*{Education}\n");
                for e in entries {
                    body.push_str(&format!(
                        "\\textbf{{{}}}, {} ({}--{})\\\\\n",
                        latex_escape(&e.degree),
                        latex_escape(&e.institution),
                        e.start_year.map(|y| y.to_string()).unwrap_or_default(),
                        e.end_year.map(|y| y.to_string()).unwrap_or_default(),
                    ));
                }
            }
            ResumeDocumentSection::Experience { entries } => {
                body.push_str("\\section*{Experience}\n");
                render_entries(&mut body, entries);
            }
            ResumeDocumentSection::Projects { entries } => {
                body.push_str("\\section*{Projects}\n");
                render_entries(&mut body, entries);
            }
            ResumeDocumentSection::Skills { skills, confidence } => {
                body.push_str("\\section*{Skills}\n");
                let rendered: Vec<String> = skills.iter().map(|s| confidence_suffix(s, confidence)).collect();
                body.push_str(&format!("{}\\\\\n", rendered.join(", ")));
            }
            ResumeDocumentSection::Certifications { entries } => {
                body.push_str("\\section*{Certifications}\n");
                for c in entries {
                    body.push_str(&format!("{}{}\\\\\n", latex_escape(&c.name), c.year.map(|y| format!(" ({})", y)).unwrap_or_default()));
                }
            }
            ResumeDocumentSection::Achievements { entries } => {
                body.push_str("\\section*{Achievements}\n");
                for a in entries {
                    body.push_str(&format!("{}\\\\\n", latex_escape(&a.title)));
                }
            }
            ResumeDocumentSection::ExternalProfiles { entries } => {
                body.push_str("\\section*{Profiles}\n");
                let rendered: Vec<String> =
                    entries.iter().map(|p| format!("{}: {}", latex_escape(&p.platform), latex_escape(&p.profile_url))).collect();
                body.push_str(&format!("{}\\\\\n", rendered.join(", ")));
            }
        }
    }

    format!(
        "\\documentclass[10pt]{{article}}\n\
         \\usepackage[margin=0.75in]{{geometry}}\n\
         \\pagestyle{{empty}}\n\
         \\begin{{document}}\n\
         {}\n\
         \\end{{document}}\n",
        body
    )
}

fn render_entries(body: &mut String, entries: &[crate::domain::draft::ResolvedEntry]) {
    for entry in entries {
        body.push_str(&format!(
            "\\textbf{{{}}} \\hfill {}\\\\\n",
            latex_escape(&entry.title),
            latex_escape(&entry.subtitle)
        ));
        body.push_str("\\begin{itemize}\n");
        for bullet in &entry.bullets {
            body.push_str(&format!("\\item {}\n", latex_escape(bullet)));
        }
        body.push_str("\\end{itemize}\n");
    }
}

/// Compile `document` to a PDF at `output_path`, bounded by `timeout`.
/// Any failure — missing `pdflatex`, non-zero exit, timeout — is returned
/// as an error string for the caller to log; never panics.
pub async fn render_pdf(document: &ResumeDocument, output_path: &Path, timeout: Duration) -> Result<PathBuf, String> {
    let latex_source = render_latex(document);

    let tmp_dir = tempfile_dir()?;
    let tex_path = tmp_dir.join("resume.tex");
    std::fs::write(&tex_path, &latex_source).map_err(|e| format!("failed to write LaTeX source: {}", e))?;

    let run = tokio::process::Command::new("pdflatex")
        .arg("-interaction=nonstopmode")
        .arg("-output-directory")
        .arg(&tmp_dir)
        .arg(&tex_path)
        .output();

    let output = tokio::time::timeout(timeout, run)
        .await
        .map_err(|_| "pdflatex timed out".to_string())?
        .map_err(|e| format!("failed to spawn pdflatex (is it installed?): {}", e))?;

    if !output.status.success() {
        return Err(format!(
            "pdflatex exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    let compiled_pdf = tmp_dir.join("resume.pdf");
    if !compiled_pdf.exists() {
        return Err("pdflatex reported success but no PDF was produced".to_string());
    }

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("failed to create output directory: {}", e))?;
    }
    std::fs::copy(&compiled_pdf, output_path).map_err(|e| format!("failed to copy compiled PDF: {}", e))?;
    let _ = std::fs::remove_dir_all(&tmp_dir);

    Ok(output_path.to_path_buf())
}

fn tempfile_dir() -> Result<PathBuf, String> {
    let dir = std::env::temp_dir().join(format!("resume-forge-pdf-{}", uuid_like()));
    std::fs::create_dir_all(&dir).map_err(|e| format!("failed to create scratch directory: {}", e))?;
    Ok(dir)
}

/// A cheap unique-enough suffix for the scratch directory name, without
/// pulling in a UUID crate for a single throwaway path component.
fn uuid_like() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    format!("{:x}-{:x}", std::process::id(), nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draft::PersonalInfo;
    use std::collections::HashMap;

    #[test]
    fn latex_escape_handles_special_characters() {
        assert_eq!(latex_escape("100% & $5"), "100\\% \\& \\$5");
    }

    #[test]
    fn render_latex_includes_personal_info_and_document_wrapper() {
        let document = ResumeDocument {
            job_title: "Backend Engineer".to_string(),
            sections: vec![ResumeDocumentSection::PersonalInfo {
                info: PersonalInfo { full_name: "Jane Doe".to_string(), email: Some("jane@example.com".to_string()), phone_number: None },
            }],
            keyword_coverage: HashMap::new(),
        };
        let source = render_latex(&document);
        assert!(source.contains("\\documentclass"));
        assert!(source.contains("Jane Doe"));
        assert!(source.contains("\\end{document}"));
    }
}
