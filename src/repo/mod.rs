//! Narrow, concrete repositories over the SQLite schema in `db.rs`.
//!
//! Replaces a reflection-heavy generic CRUD factory with one small
//! repository per aggregate root, each offering exactly the operations the
//! pipeline needs: `create`, `get`, `list_by_parent`, `update`, `delete`.

pub mod jd_repo;
pub mod profile_repo;
pub mod resume_repo;
