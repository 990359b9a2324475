//! Narrow repository over `resumes` + `resume_sections` — versioning,
//! atomic persistence of a generation result, and read access for the
//! `GET /api/resumes` surface.

use crate::domain::draft::{ResumeRecord, ResumeSectionRow};
use crate::errors::PipelineError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub id: i64,
    pub profile_id: i64,
    pub jd_id: i64,
    pub job_title: String,
    pub version: i64,
    pub file_path: String,
    pub pdf_path: Option<String>,
    pub docx_path: Option<String>,
    pub created_at: String,
    pub sections: Vec<ResumeSectionRow>,
}

/// Insert the resume record and its sections as one atomic unit: the
/// version number is computed inside the same transaction as the insert
/// so I7 (strict monotonicity per `(profile_id, job_title)`) holds even
/// under concurrent generation requests for the same pair.
pub fn insert_with_sections(
    conn: &mut Connection,
    profile_id: i64,
    jd_id: i64,
    job_title: &str,
    file_path: &str,
    pdf_path: Option<&str>,
    docx_path: Option<&str>,
    sections: &[ResumeSectionRow],
) -> Result<ResumeRecord, PipelineError> {
    let tx = conn.transaction()?;
    let now = chrono::Utc::now().to_rfc3339();

    let existing_count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM resumes WHERE profile_id = ? AND job_title = ?",
        params![profile_id, job_title],
        |row| row.get(0),
    )?;
    let version = existing_count + 1;

    tx.execute(
        "INSERT INTO resumes (profile_id, jd_id, job_title, version, file_path, pdf_path, docx_path, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![profile_id, jd_id, job_title, version, file_path, pdf_path, docx_path, now],
    )?;
    let resume_id = tx.last_insert_rowid();

    for (idx, section) in sections.iter().enumerate() {
        tx.execute(
            "INSERT INTO resume_sections (resume_id, section_type, content_blob, confidence_flags, order_index) VALUES (?, ?, ?, ?, ?)",
            params![
                resume_id,
                section.section_type,
                serde_json::to_string(&section.content_blob).unwrap_or_else(|_| "null".to_string()),
                section.confidence_flags.as_ref().map(|v| serde_json::to_string(v).unwrap_or_else(|_| "null".to_string())),
                idx as i64,
            ],
        )?;
    }

    tx.commit()?;

    Ok(ResumeRecord {
        id: resume_id,
        profile_id,
        jd_id,
        job_title: job_title.to_string(),
        version,
        file_path: file_path.to_string(),
        pdf_path: pdf_path.map(str::to_string),
        docx_path: docx_path.map(str::to_string),
        created_at: now,
    })
}

pub fn get(conn: &Connection, resume_id: i64) -> Result<Option<ResumeSummary>, PipelineError> {
    let record = conn
        .query_row(
            "SELECT id, profile_id, jd_id, job_title, version, file_path, pdf_path, docx_path, created_at FROM resumes WHERE id = ?",
            params![resume_id],
            |row| {
                Ok(ResumeRecord {
                    id: row.get(0)?,
                    profile_id: row.get(1)?,
                    jd_id: row.get(2)?,
                    job_title: row.get(3)?,
                    version: row.get(4)?,
                    file_path: row.get(5)?,
                    pdf_path: row.get(6)?,
                    docx_path: row.get(7)?,
                    created_at: row.get(8)?,
                })
            },
        )
        .optional()?;

    let Some(record) = record else { return Ok(None) };
    let sections = load_sections(conn, resume_id)?;

    Ok(Some(ResumeSummary {
        id: record.id,
        profile_id: record.profile_id,
        jd_id: record.jd_id,
        job_title: record.job_title,
        version: record.version,
        file_path: record.file_path,
        pdf_path: record.pdf_path,
        docx_path: record.docx_path,
        created_at: record.created_at,
        sections,
    }))
}

pub fn list_by_profile(conn: &Connection, profile_id: i64) -> Result<Vec<ResumeSummary>, PipelineError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM resumes WHERE profile_id = ? ORDER BY job_title, version DESC",
    )?;
    let ids: Vec<i64> = stmt
        .query_map(params![profile_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut summaries = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(summary) = get(conn, id)? {
            summaries.push(summary);
        }
    }
    Ok(summaries)
}

fn load_sections(conn: &Connection, resume_id: i64) -> Result<Vec<ResumeSectionRow>, PipelineError> {
    let mut stmt = conn.prepare(
        "SELECT section_type, content_blob, confidence_flags FROM resume_sections WHERE resume_id = ? ORDER BY order_index",
    )?;
    let rows = stmt.query_map(params![resume_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut sections = Vec::new();
    for row in rows {
        let (section_type, content_blob, confidence_flags) = row?;
        sections.push(ResumeSectionRow {
            section_type,
            content_blob: serde_json::from_str(&content_blob).unwrap_or(serde_json::Value::Null),
            confidence_flags: confidence_flags.and_then(|raw| serde_json::from_str(&raw).ok()),
        });
    }
    Ok(sections)
}
