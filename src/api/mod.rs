//! Wire payloads for chat-bison style `generateMessage` endpoints.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone)]
pub struct PromptMessage {
    pub author: String,
    pub content: String,
}

#[derive(Serialize, Clone, Default)]
pub struct MessagePrompt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub messages: Vec<PromptMessage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMessageRequest {
    pub prompt: MessagePrompt,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub candidate_count: u32,
}

#[derive(Deserialize)]
pub struct MessageCandidate {
    #[serde(default)]
    pub author: Option<String>,
    pub content: String,
}

#[derive(Deserialize, Default)]
pub struct GenerateMessageResponse {
    #[serde(default)]
    pub candidates: Vec<MessageCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_with_camel_case_keys() {
        let request = GenerateMessageRequest {
            prompt: MessagePrompt {
                context: Some("You are Airi.".to_string()),
                messages: vec![PromptMessage {
                    author: "user".to_string(),
                    content: "Hi".to_string(),
                }],
            },
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            candidate_count: 1,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["topK"], 40);
        assert_eq!(value["candidateCount"], 1);
        assert_eq!(value["prompt"]["context"], "You are Airi.");
        assert_eq!(value["prompt"]["messages"][0]["author"], "user");

        // Sampling parameters are f64 end to end, so the serialized values
        // are exact, not single-precision approximations.
        assert_eq!(value["temperature"], 0.7);
        assert_eq!(value["topP"], 0.95);
    }

    #[test]
    fn empty_context_is_omitted() {
        let request = GenerateMessageRequest {
            prompt: MessagePrompt::default(),
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            candidate_count: 1,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value["prompt"].get("context").is_none());
    }

    #[test]
    fn responses_tolerate_missing_candidates() {
        let response: GenerateMessageResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());

        let response: GenerateMessageResponse =
            serde_json::from_str(r#"{"candidates":[{"content":"Hello"}]}"#).unwrap();
        assert_eq!(response.candidates[0].content, "Hello");
        assert!(response.candidates[0].author.is_none());
    }
}
