//! AI Response Validation
//!
//! Runtime validation for AI responses, layered on top of the serde schema
//! check every `AiProvider` implementation already performs. Deserializing
//! successfully only proves the response has the right shape; these checks
//! catch the business-rule violations serde can't (an out-of-range
//! experience level, a bullet-count mismatch).

use crate::ai::types::*;
use crate::ai::errors::AiProviderError;
use serde_json::Value;

const VALID_EXPERIENCE_LEVELS: &[&str] = &["entry", "mid", "senior"];

/// Validates a `JdAnalysisOutput` response.
pub fn validate_jd_analysis(value: &Value) -> Result<JdAnalysisOutput, AiProviderError> {
    let parsed: JdAnalysisOutput = serde_json::from_value(value.clone()).map_err(|e| {
        AiProviderError::ValidationError(format!(
            "Failed to deserialize JdAnalysisOutput: {}. Response: {}",
            e, value
        ))
    })?;

    validate_jd_analysis_rules(&parsed)?;
    Ok(parsed)
}

fn validate_jd_analysis_rules(parsed: &JdAnalysisOutput) -> Result<(), AiProviderError> {
    if parsed.role_title.trim().is_empty() {
        return Err(AiProviderError::ValidationError(
            "role_title must not be empty".to_string(),
        ));
    }

    if !VALID_EXPERIENCE_LEVELS.contains(&parsed.experience_level.to_lowercase().as_str()) {
        return Err(AiProviderError::ValidationError(format!(
            "experience_level must be one of {:?}, got '{}'",
            VALID_EXPERIENCE_LEVELS, parsed.experience_level
        )));
    }

    Ok(())
}

/// Validates a `BulletRewriteOutput` response against its originating input.
/// The count-match rule is also enforced inline by `CloudAiProvider`; this
/// entry point exists so callers validating an already-parsed `Value` (e.g.
/// from a cache) can apply the same rule without a live provider call.
pub fn validate_bullet_rewrite(
    value: &Value,
    expected_count: usize,
) -> Result<BulletRewriteOutput, AiProviderError> {
    let parsed: BulletRewriteOutput = serde_json::from_value(value.clone()).map_err(|e| {
        AiProviderError::ValidationError(format!(
            "Failed to deserialize BulletRewriteOutput: {}. Response: {}",
            e, value
        ))
    })?;

    if parsed.rewritten_bullets.len() != expected_count {
        return Err(AiProviderError::ValidationError(format!(
            "Expected {} rewritten bullets, got {}",
            expected_count,
            parsed.rewritten_bullets.len()
        )));
    }

    for (idx, bullet) in parsed.rewritten_bullets.iter().enumerate() {
        if bullet.trim().is_empty() {
            return Err(AiProviderError::ValidationError(format!(
                "Rewritten bullet {} is empty",
                idx
            )));
        }
    }

    Ok(parsed)
}

/// Validates that a JSON value is a valid object (not null, array, or primitive).
#[allow(dead_code)]
pub fn validate_json_object(value: &Value) -> Result<(), AiProviderError> {
    if !value.is_object() {
        return Err(AiProviderError::ValidationError(format!(
            "Expected JSON object, got: {}",
            value
        )));
    }
    Ok(())
}

/// Validates that required fields are present in a JSON object.
#[allow(dead_code)]
pub fn validate_required_fields(value: &Value, required_fields: &[&str]) -> Result<(), AiProviderError> {
    let obj = value
        .as_object()
        .ok_or_else(|| AiProviderError::ValidationError("Expected JSON object".to_string()))?;

    for field in required_fields {
        if !obj.contains_key(*field) {
            return Err(AiProviderError::ValidationError(format!(
                "Missing required field: {}",
                field
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_jd_analysis_valid() {
        let value = json!({
            "roleTitle": "Senior Backend Engineer",
            "experienceLevel": "senior",
            "mustHaveSkills": ["Rust", "SQL"],
            "niceToHaveSkills": ["Kubernetes"],
            "keywords": ["rust", "sql", "backend"],
            "roleCategory": "backend"
        });

        let result = validate_jd_analysis(&value);
        assert!(result.is_ok());
    }

    #[test]
    fn validate_jd_analysis_rejects_empty_title() {
        let value = json!({
            "roleTitle": "",
            "experienceLevel": "mid",
            "mustHaveSkills": [],
            "niceToHaveSkills": [],
            "keywords": [],
            "roleCategory": "general"
        });

        let result = validate_jd_analysis(&value);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("role_title"));
    }

    #[test]
    fn validate_jd_analysis_rejects_bad_experience_level() {
        let value = json!({
            "roleTitle": "Engineer",
            "experienceLevel": "expert",
            "mustHaveSkills": [],
            "niceToHaveSkills": [],
            "keywords": [],
            "roleCategory": "general"
        });

        let result = validate_jd_analysis(&value);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("experience_level"));
    }

    #[test]
    fn validate_bullet_rewrite_valid() {
        let value = json!({ "rewrittenBullets": ["Built the billing service", "Led a team of 4"] });
        let result = validate_bullet_rewrite(&value, 2);
        assert!(result.is_ok());
    }

    #[test]
    fn validate_bullet_rewrite_rejects_count_mismatch() {
        let value = json!({ "rewrittenBullets": ["Only one bullet"] });
        let result = validate_bullet_rewrite(&value, 2);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Expected 2"));
    }

    #[test]
    fn validate_bullet_rewrite_rejects_empty_bullet() {
        let value = json!({ "rewrittenBullets": ["Built the billing service", ""] });
        let result = validate_bullet_rewrite(&value, 2);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("is empty"));
    }
}
