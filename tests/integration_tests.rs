//! End-to-end tests against the orchestrator, exercising the scenarios the
//! pipeline is expected to handle: a strong-fit profile, a weak-fit
//! profile, an empty profile, an overloaded JD, and cardinality
//! enforcement across the full `analyze → generate` round trip.

use resume_forge::config::Config;
use resume_forge::domain::profile::{Education, PersonalInfo};
use resume_forge::orchestrator::Orchestrator;
use resume_forge::repo::profile_repo;
use rusqlite::Connection;
use std::time::Duration;

fn test_config() -> Config {
    Config {
        database_url: "local".to_string(),
        llm_api_key: None,
        llm_model: "gemini-2.0-flash".to_string(),
        embedding_model: "all-MiniLM-L6-v2".to_string(),
        embedding_dim: 16,
        max_experience_sections: 2,
        max_project_sections: 2,
        max_bullets_per_section: 3,
        max_skills: 5,
        output_dir: std::env::temp_dir().join("resume-forge-integration-output").to_string_lossy().into_owned(),
        host: "127.0.0.1".to_string(),
        port: 0,
        llm_timeout: Duration::from_secs(5),
        embedding_timeout: Duration::from_secs(5),
        pdf_timeout: Duration::from_secs(5),
    }
}

fn test_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    resume_forge::db::migration_001_initial_schema(&conn).unwrap();
    conn
}

fn seed_strong_fit_profile(conn: &Connection) -> i64 {
    let profile_id = profile_repo::create(conn).unwrap();
    profile_repo::set_personal_info(
        conn,
        profile_id,
        &PersonalInfo { full_name: "Alex Kim".to_string(), email: Some("alex@example.com".to_string()), phone_number: None },
    )
    .unwrap();
    profile_repo::add_experience(
        conn,
        profile_id,
        "DataForge",
        "Backend Engineer",
        Some("2020-01"),
        Some("Present"),
        &[
            "Built a Rust microservice handling SQL-backed billing queries".to_string(),
            "Deployed services on Kubernetes with zero-downtime rollouts".to_string(),
        ],
        0,
    )
    .unwrap();
    profile_repo::add_skill(conn, profile_id, "Rust", Some("language"), Some("high")).unwrap();
    profile_repo::add_skill(conn, profile_id, "SQL", Some("database"), Some("high")).unwrap();
    profile_repo::add_skill(conn, profile_id, "Kubernetes", Some("infrastructure"), Some("medium")).unwrap();
    profile_repo::add_education(
        conn,
        profile_id,
        &Education {
            id: 0,
            institution: "Tech University".to_string(),
            degree: "B.S. Computer Science".to_string(),
            field_of_study: None,
            start_year: Some(2016),
            end_year: Some(2020),
            grade: None,
        },
    )
    .unwrap();
    profile_id
}

#[tokio::test]
async fn strong_fit_profile_selects_matching_skills_and_experience() {
    let orchestrator = Orchestrator::new(test_config());
    let mut conn = test_conn();
    let profile_id = seed_strong_fit_profile(&conn);

    let (jd_id, jd_data, _created_at) = orchestrator
        .analyze_and_store_jd(&conn, "We need a backend engineer skilled in Rust, SQL, and Kubernetes deployments.")
        .await
        .unwrap();
    assert!(!jd_data.role_title.is_empty());

    let outcome = orchestrator.generate_resume(&mut conn, profile_id, jd_id).await.unwrap();
    assert_eq!(outcome.record.version, 1);

    let summary = resume_forge::repo::resume_repo::get(&conn, outcome.record.id).unwrap().unwrap();
    let skills_section = summary.sections.iter().find(|s| s.section_type == "skills");
    assert!(skills_section.is_some(), "a strong-fit profile should produce a non-empty skills section");
}

#[tokio::test]
async fn empty_profile_still_produces_a_valid_resume() {
    let orchestrator = Orchestrator::new(test_config());
    let mut conn = test_conn();
    let profile_id = profile_repo::create(&conn).unwrap();

    let (jd_id, _, _) = orchestrator
        .analyze_and_store_jd(&conn, "Looking for a product manager with strong communication skills.")
        .await
        .unwrap();

    let outcome = orchestrator.generate_resume(&mut conn, profile_id, jd_id).await.unwrap();
    let summary = resume_forge::repo::resume_repo::get(&conn, outcome.record.id).unwrap().unwrap();
    assert!(summary.sections.is_empty(), "an empty profile has nothing to assemble into sections");
}

#[tokio::test]
async fn overloaded_jd_still_respects_skill_cardinality_cap() {
    let orchestrator = Orchestrator::new(test_config());
    let mut conn = test_conn();
    let profile_id = profile_repo::create(&conn).unwrap();
    for (name, priority) in [
        ("Rust", "high"), ("Go", "high"), ("Python", "high"), ("Java", "medium"),
        ("C++", "medium"), ("TypeScript", "medium"), ("Kubernetes", "low"), ("Docker", "low"),
    ] {
        profile_repo::add_skill(&conn, profile_id, name, Some("language"), Some(priority)).unwrap();
    }

    let overloaded_jd = "We want someone with Rust, Go, Python, Java, C++, TypeScript, Kubernetes, Docker, \
        AWS, GCP, Azure, Terraform, Ansible, Jenkins, GitLab, Kafka, RabbitMQ, Redis, PostgreSQL, MongoDB \
        experience across every one of these twenty technologies.";
    let (jd_id, _, _) = orchestrator.analyze_and_store_jd(&conn, overloaded_jd).await.unwrap();

    let outcome = orchestrator.generate_resume(&mut conn, profile_id, jd_id).await.unwrap();
    let summary = resume_forge::repo::resume_repo::get(&conn, outcome.record.id).unwrap().unwrap();
    let skills_section = summary.sections.iter().find(|s| s.section_type == "skills").unwrap();
    let skills = skills_section.content_blob.as_array().unwrap();
    assert!(skills.len() <= 5, "skills section must respect MAX_SKILLS regardless of JD breadth");
}

#[tokio::test]
async fn regenerating_the_same_profile_and_role_produces_strictly_increasing_versions() {
    let orchestrator = Orchestrator::new(test_config());
    let mut conn = test_conn();
    let profile_id = seed_strong_fit_profile(&conn);

    let (jd_id, _, _) = orchestrator
        .analyze_and_store_jd(&conn, "We need a backend engineer skilled in Rust, SQL, and Kubernetes deployments.")
        .await
        .unwrap();

    let first = orchestrator.generate_resume(&mut conn, profile_id, jd_id).await.unwrap();
    let second = orchestrator.generate_resume(&mut conn, profile_id, jd_id).await.unwrap();
    let third = orchestrator.generate_resume(&mut conn, profile_id, jd_id).await.unwrap();

    assert_eq!(first.record.version, 1);
    assert_eq!(second.record.version, 2);
    assert_eq!(third.record.version, 3);
}
