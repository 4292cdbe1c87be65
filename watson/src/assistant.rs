//! Assistant service.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{Error, Result},
    http::{HttpClient, ServiceEndpoint},
};

/// Assistant service.
pub struct AssistantService {
    http: Arc<HttpClient>,
    endpoint: ServiceEndpoint,
}

impl AssistantService {
    pub(crate) fn new(http: Arc<HttpClient>, endpoint: ServiceEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// Sends user input to a workspace and returns the dialog response.
    ///
    /// Pass the returned `context` back in the next request to continue the
    /// conversation.
    pub async fn message(&self, workspace_id: &str, req: &MessageRequest) -> Result<MessageResponse> {
        if workspace_id.is_empty() {
            return Err(Error::Config("workspace_id must be non-empty".to_string()));
        }
        let path = format!("/v1/workspaces/{}/message", workspace_id);
        let request = self.http.request(Method::POST, &self.endpoint, &path);
        self.http.post_json(request, req).await
    }

    /// Lists workspaces.
    pub async fn list_workspaces(&self) -> Result<WorkspaceCollection> {
        let request = self.http.request(Method::GET, &self.endpoint, "/v1/workspaces");
        self.http.send_json(request).await
    }
}

/// Message request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<MessageInput>,
    /// Conversation state from the previous response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_intents: Option<bool>,
}

impl MessageRequest {
    /// Creates a request with text input.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            input: Some(MessageInput { text: text.into() }),
            ..Default::default()
        }
    }

    /// Sets the conversation context.
    pub fn context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// User input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageInput {
    pub text: String,
}

/// Dialog response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub input: Option<MessageInput>,
    #[serde(default)]
    pub intents: Vec<RuntimeIntent>,
    #[serde(default)]
    pub entities: Vec<Value>,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub output: OutputData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A recognized intent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeIntent {
    pub intent: String,
    pub confidence: f64,
}

/// Dialog output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputData {
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub generic: Vec<Value>,
    #[serde(default)]
    pub nodes_visited: Vec<String>,
}

/// Workspaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceCollection {
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Value>,
}

/// A workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub workspace_id: String,
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_request_json() {
        let req = MessageRequest::text("hello").context(serde_json::json!({"conversation_id": "c1"}));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"input": {"text": "hello"}, "context": {"conversation_id": "c1"}})
        );
    }

    #[test]
    fn test_message_response() {
        let res: MessageResponse = serde_json::from_str(
            r#"{"input":{"text":"hi"},"intents":[{"intent":"greeting","confidence":0.97}],
                "entities":[],"context":{"conversation_id":"c1"},
                "output":{"text":["Hello!"],"nodes_visited":["node_1"]},"user_id":"u"}"#,
        )
        .unwrap();
        assert_eq!(res.intents[0].intent, "greeting");
        assert_eq!(res.output.text, vec!["Hello!"]);
        assert_eq!(res.context["conversation_id"], "c1");
        assert!(res.extra.contains_key("user_id"));
    }
}
