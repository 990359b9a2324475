//! C3 — Scoring Engine: composite relevance score for bullets and
//! sections, combining semantic similarity, skill weighting, section
//! priority, recency, and a keyword bonus over a shared weight table.

use crate::domain::draft::SectionType;
use crate::domain::jd::JdData;
use crate::embedding::cosine_similarity;

/// Constant semantic similarity used when either vector is missing.
const DEFAULT_SEMANTIC: f64 = 0.30;

pub fn section_priority(section_type: SectionType) -> f64 {
    match section_type {
        SectionType::Experience => 1.00,
        SectionType::Project => 0.85,
    }
}

/// `SKILL_IMPORTANCE` weight table: 1.5 if a must-have skill is present in
/// the bullet text, else 1.0 whether a nice-to-have skill is present or
/// neither is — the "none" and "nice_to_have" cases share the same weight.
pub fn compute_skill_importance(text: &str, jd: &JdData) -> f64 {
    let lower = text.to_lowercase();
    if jd.must_have_skills.iter().any(|s| lower.contains(&s.to_lowercase())) {
        1.5
    } else {
        1.0
    }
}

/// Recency decay from an `end_date` string (`YYYY-MM`, `YYYY`, `"Present"`,
/// empty, or missing). Malformed dates degrade to a fixed `0.8` rather than
/// erroring — recency is a soft signal, not a correctness invariant.
/// `years_ago` is a whole-year count off the year component only
/// (`max(0, current_year - year)`), matching the original scoring engine —
/// no month-precision fraction.
pub fn compute_recency_weight(end_date: Option<&str>) -> f64 {
    let end_date = match end_date {
        None => return 1.0,
        Some(s) if s.trim().is_empty() || s.eq_ignore_ascii_case("present") => return 1.0,
        Some(s) => s,
    };

    let years_ago = match parse_year(end_date) {
        Some(year) => {
            let now_year = chrono::Utc::now().format("%Y").to_string().parse::<i32>().unwrap_or(year);
            (now_year - year).max(0) as f64
        }
        None => return 0.8,
    };

    (1.0 - 0.05 * years_ago).max(0.6)
}

fn parse_year(s: &str) -> Option<i32> {
    s.split('-').next()?.parse::<i32>().ok()
}

/// `KEYWORD_BONUS`: 0.05 per distinct JD keyword matched as a
/// case-insensitive substring of `text`, capped at 0.30.
pub fn compute_keyword_bonus(text: &str, jd: &JdData) -> f64 {
    let lower = text.to_lowercase();
    let matches = jd.keywords.iter().filter(|kw| lower.contains(&kw.to_lowercase())).count();
    (matches as f64 * 0.05).min(0.30)
}

/// Round to 4 decimal places for display/persistence. Sort comparisons use
/// the raw, unrounded score; this is only applied at the boundary.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// `score_bullet`: semantic × importance × priority × recency + kw_bonus.
#[allow(clippy::too_many_arguments)]
pub fn score_bullet(
    text: &str,
    bullet_vec: Option<&[f32]>,
    jd_vec: &[f32],
    jd: &JdData,
    section_type: SectionType,
    end_date: Option<&str>,
) -> f64 {
    let semantic = match bullet_vec {
        Some(v) => cosine_similarity(v, jd_vec),
        None => DEFAULT_SEMANTIC,
    };
    let importance = compute_skill_importance(text, jd);
    let priority = section_priority(section_type);
    let recency = compute_recency_weight(end_date);
    let kw_bonus = compute_keyword_bonus(text, jd);

    round4(semantic * importance * priority * recency + kw_bonus)
}

/// `score_section`: identical to `score_bullet` but omits skill importance
/// (a bullet-level signal only).
pub fn score_section(
    text: &str,
    section_vec: Option<&[f32]>,
    jd_vec: &[f32],
    jd: &JdData,
    section_type: SectionType,
    end_date: Option<&str>,
) -> f64 {
    let semantic = match section_vec {
        Some(v) => cosine_similarity(v, jd_vec),
        None => DEFAULT_SEMANTIC,
    };
    let priority = section_priority(section_type);
    let recency = compute_recency_weight(end_date);
    let kw_bonus = compute_keyword_bonus(text, jd);

    round4(semantic * priority * recency + kw_bonus)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jd() -> JdData {
        JdData {
            role_title: "Senior Backend Engineer".to_string(),
            experience_level: crate::domain::jd::ExperienceLevel::Senior,
            must_have_skills: vec!["python".to_string(), "fastapi".to_string()],
            nice_to_have_skills: vec!["docker".to_string()],
            keywords: vec!["python".to_string(), "fastapi".to_string(), "postgresql".to_string()],
            role_category: "backend".to_string(),
        }
    }

    #[test]
    fn recency_present_is_full_weight() {
        assert_eq!(compute_recency_weight(Some("Present")), 1.0);
        assert_eq!(compute_recency_weight(None), 1.0);
        assert_eq!(compute_recency_weight(Some("")), 1.0);
    }

    #[test]
    fn recency_malformed_date_degrades_to_fixed_value() {
        assert_eq!(compute_recency_weight(Some("not-a-date")), 0.8);
    }

    #[test]
    fn recency_never_drops_below_floor() {
        assert_eq!(compute_recency_weight(Some("1990-01")), 0.6);
    }

    #[test]
    fn recency_accepts_year_only_format() {
        assert!(compute_recency_weight(Some("1990")) >= 0.6);
    }

    #[test]
    fn recency_floors_to_whole_years_off_the_year_component() {
        let now_year: i32 = chrono::Utc::now().format("%Y").to_string().parse().unwrap();
        let same_year = format!("{}-01", now_year);
        assert_eq!(compute_recency_weight(Some(&same_year)), 1.0);
    }

    #[test]
    fn skill_importance_detects_must_have_case_insensitively() {
        let jd = jd();
        assert_eq!(compute_skill_importance("Built services with Python and FastAPI", &jd), 1.5);
        assert_eq!(compute_skill_importance("Built services with Go", &jd), 1.0);
    }

    #[test]
    fn keyword_bonus_caps_at_point_three() {
        let jd = JdData {
            keywords: vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string(), "e".to_string(), "f".to_string(), "g".to_string()],
            ..jd()
        };
        let bonus = compute_keyword_bonus("a b c d e f g", &jd);
        assert_eq!(bonus, 0.30);
    }

    #[test]
    fn score_bullet_uses_default_semantic_without_vector() {
        let jd = jd();
        let jd_vec = vec![1.0, 0.0];
        let score = score_bullet("Generic bullet with no keywords", None, &jd_vec, &jd, SectionType::Experience, None);
        // 0.30 * 1.0 (no must-have) * 1.00 (experience priority) * 1.0 (recency) + 0.0 bonus
        assert_eq!(score, 0.30);
    }

    #[test]
    fn score_section_omits_skill_importance() {
        let jd = jd();
        let jd_vec = vec![1.0, 0.0];
        let score = score_section("Backend Engineer at TechCorp", None, &jd_vec, &jd, SectionType::Experience, None);
        assert_eq!(score, 0.30);
    }
}
