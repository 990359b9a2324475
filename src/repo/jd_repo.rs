//! Narrow repository over `jd_analyses` rows — one persisted interpretation
//! (C1 output) per `POST /api/jd/analyze` or `POST /api/resumes/generate`
//! call, independent of any one resume so a retried generation can reuse it.

use crate::domain::jd::{ExperienceLevel, JdData};
use crate::errors::PipelineError;
use rusqlite::{params, Connection, OptionalExtension};

fn join_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn split_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn experience_level_str(level: ExperienceLevel) -> &'static str {
    match level {
        ExperienceLevel::Entry => "entry",
        ExperienceLevel::Mid => "mid",
        ExperienceLevel::Senior => "senior",
    }
}

fn parse_experience_level(raw: &str) -> ExperienceLevel {
    match raw {
        "entry" => ExperienceLevel::Entry,
        "senior" => ExperienceLevel::Senior,
        _ => ExperienceLevel::Mid,
    }
}

pub struct JdAnalysisRecord {
    pub id: i64,
    pub jd_data: JdData,
    pub jd_vector: Vec<f32>,
    pub created_at: String,
}

/// Persist a JD interpretation result together with its embedding vector.
/// Returns the new row id and its `created_at` timestamp.
pub fn create(
    conn: &Connection,
    raw_text: &str,
    jd_data: &JdData,
    jd_vector: &[f32],
) -> Result<(i64, String), PipelineError> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO jd_analyses (raw_text, role_title, experience_level, must_have_skills, nice_to_have_skills, keywords, role_category, jd_vector, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            raw_text,
            jd_data.role_title,
            experience_level_str(jd_data.experience_level),
            join_list(&jd_data.must_have_skills),
            join_list(&jd_data.nice_to_have_skills),
            join_list(&jd_data.keywords),
            jd_data.role_category,
            serde_json::to_string(jd_vector).unwrap_or_else(|_| "[]".to_string()),
            now.clone(),
        ],
    )?;
    Ok((conn.last_insert_rowid(), now))
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<JdAnalysisRecord>, PipelineError> {
    let row = conn
        .query_row(
            "SELECT id, role_title, experience_level, must_have_skills, nice_to_have_skills, keywords, role_category, jd_vector, created_at
             FROM jd_analyses WHERE id = ?",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                ))
            },
        )
        .optional()?;

    Ok(row.map(|(id, role_title, level, must_have, nice_to_have, keywords, category, vector_raw, created_at)| {
        JdAnalysisRecord {
            id,
            jd_data: JdData {
                role_title,
                experience_level: parse_experience_level(&level),
                must_have_skills: split_list(&must_have),
                nice_to_have_skills: split_list(&nice_to_have),
                keywords: split_list(&keywords),
                role_category: category,
            },
            jd_vector: serde_json::from_str(&vector_raw).unwrap_or_default(),
            created_at,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::jd::ExperienceLevel;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::migration_001_initial_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn create_then_get_round_trips() {
        let conn = test_conn();
        let jd = JdData {
            role_title: "Senior Backend Engineer".to_string(),
            experience_level: ExperienceLevel::Senior,
            must_have_skills: vec!["Python".to_string()],
            nice_to_have_skills: vec![],
            keywords: vec!["python".to_string()],
            role_category: "backend".to_string(),
        };
        let (id, _created_at) = create(&conn, "raw jd text here that is long enough", &jd, &[0.1, 0.2]).unwrap();
        let record = get(&conn, id).unwrap().unwrap();
        assert_eq!(record.jd_data.role_title, "Senior Backend Engineer");
        assert_eq!(record.jd_data.experience_level, ExperienceLevel::Senior);
        assert_eq!(record.jd_vector, vec![0.1, 0.2]);
    }

    #[test]
    fn get_unknown_id_returns_none() {
        let conn = test_conn();
        assert!(get(&conn, 42).unwrap().is_none());
    }
}
