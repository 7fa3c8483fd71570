use serde::{Deserialize, Serialize};

// Chat completion models
#[derive(Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// Error envelope
#[derive(Deserialize, Debug)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
pub struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_roles_and_content() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo-0613".to_string(),
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: "be Stefan".to_string(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo-0613");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "be Stefan");
    }

    #[test]
    fn response_with_content_parses() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.choices[0].message.content.as_deref(), Some("hello"));
    }

    #[test]
    fn missing_content_parses_as_none() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(body.choices[0].message.content, None);
    }

    #[test]
    fn error_envelope_parses_the_message() {
        let body: ApiErrorResponse =
            serde_json::from_str(r#"{"error":{"message":"quota exceeded","type":"billing"}}"#)
                .unwrap();
        assert_eq!(body.error.unwrap().message, "quota exceeded");
    }
}
