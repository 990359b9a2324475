//! Seeds a local database with a handful of sample profiles for manual
//! testing against the HTTP surface, mirroring the teacher's
//! `populate_test_data` binary but against the profile/experience/project
//! schema instead of the old user_profile/jobs/applications tables.

use resume_forge::db;
use resume_forge::repo::profile_repo;

fn main() {
    let conn = db::get_connection().expect("failed to open database");
    db::init_database().expect("failed to run migrations");

    let profile_id = profile_repo::create(&conn).expect("failed to create profile");

    profile_repo::set_personal_info(
        &conn,
        profile_id,
        &resume_forge::domain::profile::PersonalInfo {
            full_name: "Jordan Rivera".to_string(),
            email: Some("jordan.rivera@example.com".to_string()),
            phone_number: Some("555-0100".to_string()),
        },
    )
    .expect("failed to set personal info");

    profile_repo::add_experience(
        &conn,
        profile_id,
        "NimbusData",
        "Backend Engineer",
        Some("2021-03"),
        Some("Present"),
        &[
            "Built a Rust service handling 10k requests per second for the billing pipeline".to_string(),
            "Migrated the ingestion pipeline from Python to Rust, cutting p99 latency by 40%".to_string(),
            "Designed the PostgreSQL schema for the multi-tenant reporting subsystem".to_string(),
        ],
        0,
    )
    .expect("failed to add experience");

    profile_repo::add_experience(
        &conn,
        profile_id,
        "Alderwood Systems",
        "Software Engineer",
        Some("2018-06"),
        Some("2021-02"),
        &[
            "Implemented a REST API in Python serving the internal inventory system".to_string(),
            "Wrote integration tests covering the order-fulfillment workflow".to_string(),
        ],
        1,
    )
    .expect("failed to add experience");

    profile_repo::add_project(
        &conn,
        profile_id,
        "Open-source SQL query planner",
        Some("A cost-based query planner for a toy relational database"),
        Some("Rust, SQL"),
        &["Implemented a cost-based join reordering algorithm".to_string()],
        0,
    )
    .expect("failed to add project");

    for (name, category, priority) in [
        ("Rust", Some("language"), Some("high")),
        ("Python", Some("language"), Some("medium")),
        ("PostgreSQL", Some("database"), Some("high")),
        ("Kubernetes", Some("infrastructure"), Some("medium")),
    ] {
        profile_repo::add_skill(&conn, profile_id, name, category, priority).expect("failed to add skill");
    }

    profile_repo::add_education(
        &conn,
        profile_id,
        &resume_forge::domain::profile::Education {
            id: 0,
            institution: "State University".to_string(),
            degree: "B.S. Computer Science".to_string(),
            field_of_study: Some("Computer Science".to_string()),
            start_year: Some(2014),
            end_year: Some(2018),
            grade: None,
        },
    )
    .expect("failed to add education");

    println!("Seeded profile {}", profile_id);
}
