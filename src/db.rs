use rusqlite::{Connection, Result};
use std::path::PathBuf;

/// Get the app data directory (where the database and logs are stored)
///
/// This function returns a local directory path where all pipeline data is
/// stored. In development this is `.resume-forge` in the current directory.
///
/// **Local-first storage**: the profile/JD/resume database, logs, and the
/// encrypted-secret fallback all live on disk next to the process. No data
/// leaves the machine except the prompts sent to the configured LLM/embedding
/// backend when assisted mode is enabled.
pub fn get_app_data_dir() -> PathBuf {
    let app_data_dir = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".resume-forge");
    std::fs::create_dir_all(&app_data_dir).expect("Failed to create app data directory");
    app_data_dir
}

pub fn get_db_path() -> PathBuf {
    get_app_data_dir().join("resume-forge.db")
}

pub fn get_connection() -> Result<Connection> {
    let db_path = get_db_path();
    Connection::open(db_path)
}

pub fn init_database() -> Result<()> {
    let conn = get_connection()?;

    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;

    run_migrations(&conn)?;

    Ok(())
}

fn run_migration(conn: &Connection, name: &str, f: impl FnOnce(&Connection) -> Result<()>) -> Result<()> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM migrations WHERE name = ?")?;
    let count: i64 = stmt.query_row([name], |row| row.get(0))?;
    drop(stmt);

    if count == 0 {
        log::info!("[db] running migration: {}", name);
        f(conn)?;
        conn.execute(
            "INSERT INTO migrations (name, applied_at) VALUES (?, datetime('now'))",
            [name],
        )?;
    }
    Ok(())
}

fn run_migrations(conn: &Connection) -> Result<()> {
    run_migration(conn, "001_initial_schema", migration_001_initial_schema)?;
    run_migration(conn, "002_ai_cache", migration_002_ai_cache)?;
    run_migration(conn, "003_database_indexes", migration_003_database_indexes)?;
    Ok(())
}

/// Candidate profile aggregate and its owned entities.
pub fn migration_001_initial_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS personal_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            email TEXT,
            phone_number TEXT,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS experiences (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            company TEXT NOT NULL,
            role TEXT NOT NULL,
            start_date TEXT,
            end_date TEXT,
            section_vector TEXT,
            order_index INTEGER DEFAULT 0,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS experience_bullets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            experience_id INTEGER NOT NULL,
            text TEXT NOT NULL,
            vector TEXT,
            order_index INTEGER DEFAULT 0,
            FOREIGN KEY (experience_id) REFERENCES experiences(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            tech_stack TEXT,
            order_index INTEGER DEFAULT 0,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS project_bullets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL,
            text TEXT NOT NULL,
            vector TEXT,
            order_index INTEGER DEFAULT 0,
            FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS skills (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            category TEXT,
            priority TEXT,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS education (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            institution TEXT NOT NULL,
            degree TEXT NOT NULL,
            field_of_study TEXT,
            start_year INTEGER,
            end_year INTEGER,
            grade TEXT,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS certifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            issuing_organization TEXT,
            year INTEGER,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS achievements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS external_profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            platform TEXT NOT NULL,
            profile_url TEXT NOT NULL,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
        )",
        [],
    )?;

    // One row per JD interpretation (C1 output), independent of any one
    // resume so the same analysis can be reused if generation is retried.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS jd_analyses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            raw_text TEXT NOT NULL,
            role_title TEXT NOT NULL,
            experience_level TEXT NOT NULL,
            must_have_skills TEXT NOT NULL,
            nice_to_have_skills TEXT NOT NULL,
            keywords TEXT NOT NULL,
            role_category TEXT NOT NULL,
            jd_vector TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS resumes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id INTEGER NOT NULL,
            jd_id INTEGER NOT NULL,
            job_title TEXT NOT NULL,
            version INTEGER NOT NULL,
            file_path TEXT NOT NULL,
            pdf_path TEXT,
            docx_path TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE,
            FOREIGN KEY (jd_id) REFERENCES jd_analyses(id),
            UNIQUE(profile_id, job_title, version)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS resume_sections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resume_id INTEGER NOT NULL,
            section_type TEXT NOT NULL,
            content_blob TEXT NOT NULL,
            confidence_flags TEXT,
            order_index INTEGER DEFAULT 0,
            FOREIGN KEY (resume_id) REFERENCES resumes(id) ON DELETE CASCADE
        )",
        [],
    )?;

    Ok(())
}

fn migration_002_ai_cache(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS ai_cache (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            purpose TEXT NOT NULL,
            input_hash TEXT NOT NULL,
            model_name TEXT NOT NULL,
            request_payload TEXT NOT NULL,
            response_payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_ai_cache_purpose_input_hash
         ON ai_cache (purpose, input_hash)",
        [],
    )?;

    Ok(())
}

fn migration_003_database_indexes(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_experiences_profile_id
         ON experiences (profile_id, order_index)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_experience_bullets_experience_id
         ON experience_bullets (experience_id, order_index)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_projects_profile_id
         ON projects (profile_id, order_index)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_project_bullets_project_id
         ON project_bullets (project_id, order_index)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_skills_profile_id
         ON skills (profile_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_education_profile_id
         ON education (profile_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_certifications_profile_id
         ON certifications (profile_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_achievements_profile_id
         ON achievements (profile_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_external_profiles_profile_id
         ON external_profiles (profile_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_resumes_profile_job_title
         ON resumes (profile_id, job_title, version DESC)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_resume_sections_resume_id
         ON resume_sections (resume_id, order_index)",
        [],
    )?;

    // Index for ai_cache expiration cleanup
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_ai_cache_expires_at
         ON ai_cache (expires_at) WHERE expires_at IS NOT NULL",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_ai_cache_created_at
         ON ai_cache (created_at ASC)",
        [],
    )?;

    Ok(())
}
