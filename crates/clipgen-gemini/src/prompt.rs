//! Prompt construction for strategy requests.

use clipgen_models::AggregateRequest;
use validator::Validate;

use crate::error::{StrategyError, StrategyResult};

/// Longest free-text context accepted from the user.
pub const MAX_USER_PROMPT_CHARS: usize = 2000;

/// Check the request before anything is sent.
pub fn validate_request(aggregate: &AggregateRequest, user_prompt: Option<&str>) -> StrategyResult<()> {
    aggregate
        .validate()
        .map_err(|e| StrategyError::invalid_request(e.to_string()))?;

    if !aggregate.total_duration.is_finite() {
        return Err(StrategyError::invalid_request("total duration is not finite"));
    }

    if let Some(prompt) = user_prompt {
        let chars = prompt.chars().count();
        if chars > MAX_USER_PROMPT_CHARS {
            return Err(StrategyError::invalid_request(format!(
                "prompt is {} characters, limit is {}",
                chars, MAX_USER_PROMPT_CHARS
            )));
        }
    }

    Ok(())
}

/// Build the instruction sent alongside the response schema.
pub fn build_prompt(aggregate: &AggregateRequest, user_prompt: Option<&str>) -> String {
    let context = user_prompt.map(str::trim).unwrap_or_default();

    format!(
        r#"Analyze this video metadata and generate a viral highlight strategy.
Video Name: {name}
Original Duration: {original}s
Target Short Duration: {target}s
Context/Prompt: {context}

The goal is to extract the top 25% of the most engaging content.

Additional instructions:
- viralScore is a number from 0 to 100.
- highlightSegments use seconds from the start of the video and together should last about {target}s.
- Write hashtags with a leading '#'."#,
        name = aggregate.name,
        original = aggregate.total_duration,
        target = aggregate.target_duration(),
        context = context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(duration: f64) -> AggregateRequest {
        AggregateRequest {
            name: "vlog.mp4".to_string(),
            size: 10_000,
            mime_type: "video/mp4".to_string(),
            total_duration: duration,
        }
    }

    #[test]
    fn test_prompt_embeds_durations() {
        let prompt = build_prompt(&aggregate(240.0), Some("  cooking show  "));
        assert!(prompt.contains("Video Name: vlog.mp4"));
        assert!(prompt.contains("Original Duration: 240s"));
        assert!(prompt.contains("Target Short Duration: 60s"));
        assert!(prompt.contains("Context/Prompt: cooking show\n"));
        assert!(prompt.contains("top 25%"));
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_prompt(&aggregate(122.0), None);
        assert!(prompt.contains("Target Short Duration: 30.5s"));
        assert!(prompt.contains("Context/Prompt: \n"));
    }

    #[test]
    fn test_validate_request() {
        assert!(validate_request(&aggregate(120.0), Some("short")).is_ok());

        let long = "x".repeat(MAX_USER_PROMPT_CHARS + 1);
        assert!(matches!(
            validate_request(&aggregate(120.0), Some(&long)),
            Err(StrategyError::InvalidRequest(_))
        ));

        assert!(validate_request(&aggregate(-1.0), None).is_err());
        assert!(validate_request(&aggregate(f64::INFINITY), None).is_err());
    }
}
