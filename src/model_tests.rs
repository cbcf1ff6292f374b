//! Unit tests for the core data model and its wire names.

#[cfg(test)]
mod model_tests {
    use crate::model::*;

    #[test]
    fn test_terminal_states() {
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Failed.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());

        assert!(!RequestStatus::Received.is_terminal());
        assert!(!RequestStatus::Validated.is_terminal());
        assert!(!RequestStatus::Queued.is_terminal());
        assert!(!RequestStatus::Processing.is_terminal());
    }

    #[test]
    fn test_status_wire_spelling() {
        assert_eq!(
            serde_json::to_value(RequestStatus::Processing).unwrap(),
            "processing"
        );
        let status: RequestStatus = serde_json::from_value("cancelled".into()).unwrap();
        assert_eq!(status, RequestStatus::Cancelled);
    }

    #[test]
    fn test_research_depth_kebab_case() {
        let depth: ResearchDepth = serde_json::from_value("deep-dive".into()).unwrap();
        assert_eq!(depth, ResearchDepth::DeepDive);
    }

    #[test]
    fn test_submission_input_deserializes_camel_case() {
        let json = r#"{
            "id": "r1",
            "userId": "u1",
            "priority": "normal",
            "parameters": {
                "researchDepth": "standard",
                "maximumIdeas": 5,
                "includeESGFactors": true
            },
            "callback": { "url": "https://example.com/hook" }
        }"#;
        let input: SubmissionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.user_id, "u1");
        assert_eq!(input.parameters.maximum_ideas, 5);
        assert!(input.parameters.include_esg_factors);
        assert!(!input.parameters.include_backtesting);
        assert!(input.parameters.custom_criteria.is_empty());
        assert_eq!(input.callback.unwrap().url, "https://example.com/hook");
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = GenerationResult {
            request_id: "r1".to_string(),
            status: RequestStatus::Completed,
            investment_ideas: Vec::new(),
            processing_metrics: ProcessingMetrics::default(),
            metadata: ResultMetadata::default(),
            quality_score: 0.9,
            confidence_score: 0.8,
            generated_at: chrono::Utc::now(),
            expires_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["requestId"], "r1");
        assert!(json["processingMetrics"]["resourcesUsed"]["estimatedCost"].is_number());
        assert!(json.get("request_id").is_none());
    }

    #[test]
    fn test_idea_optional_fields_default() {
        let json = r#"{
            "id": "i1",
            "symbol": "AAPL",
            "direction": "long",
            "thesis": "services growth",
            "confidence": 0.7
        }"#;
        let idea: InvestmentIdea = serde_json::from_str(json).unwrap();
        assert!(idea.risk_level.is_none());
        assert!(idea.sources.is_empty());
    }
}
