//! OpenAI-compatible chat completions with function tools.

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
	System,
	User,
	Assistant,
	Tool,
}
impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::System => "system",
			Self::User => "user",
			Self::Assistant => "assistant",
			Self::Tool => "tool",
		}
	}
}

/// A function invocation requested by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCall {
	pub id: String,
	pub name: String,
	/// Raw JSON text as emitted by the model. Not guaranteed to parse.
	pub arguments: String,
}

/// One turn of the conversation sent to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
	/// Function name, set on tool turns.
	pub name: Option<String>,
	/// Set on tool turns; pairs the result with the assistant's request.
	pub tool_call_id: Option<String>,
	/// Set on assistant turns that requested tools.
	pub tool_calls: Vec<ToolCall>,
}
impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self::plain(Role::System, content.into())
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self::plain(Role::User, content.into())
	}

	pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
		Self { tool_calls, ..Self::plain(Role::Assistant, content.into()) }
	}

	pub fn tool(
		tool_call_id: impl Into<String>,
		name: impl Into<String>,
		content: impl Into<String>,
	) -> Self {
		Self {
			name: Some(name.into()),
			tool_call_id: Some(tool_call_id.into()),
			..Self::plain(Role::Tool, content.into())
		}
	}

	fn plain(role: Role, content: String) -> Self {
		Self { role, content, name: None, tool_call_id: None, tool_calls: Vec::new() }
	}

	fn to_wire(&self) -> Value {
		let mut wire = json!({ "role": self.role.as_str(), "content": self.content });

		if let Some(name) = &self.name {
			wire["name"] = Value::String(name.clone());
		}
		if let Some(tool_call_id) = &self.tool_call_id {
			wire["tool_call_id"] = Value::String(tool_call_id.clone());
		}
		if !self.tool_calls.is_empty() {
			if self.content.is_empty() {
				wire["content"] = Value::Null;
			}

			wire["tool_calls"] = self
				.tool_calls
				.iter()
				.map(|call| {
					json!({
						"id": call.id,
						"type": "function",
						"function": { "name": call.name, "arguments": call.arguments },
					})
				})
				.collect();
		}

		wire
	}
}

/// A function the model may call, described by a JSON schema.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSpec {
	pub name: String,
	pub description: String,
	pub parameters: Value,
}
impl ToolSpec {
	fn to_wire(&self) -> Value {
		json!({
			"type": "function",
			"function": {
				"name": self.name,
				"description": self.description,
				"parameters": self.parameters,
			},
		})
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolChoice {
	/// The model decides whether to call a tool.
	#[default]
	Auto,
	/// The model must answer with text.
	None,
}
impl ToolChoice {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Auto => "auto",
			Self::None => "none",
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatRequest {
	pub messages: Vec<ChatMessage>,
	/// Tools advertised for this round. Empty means no tools are offered.
	pub tools: Vec<ToolSpec>,
	pub tool_choice: ToolChoice,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatCompletion {
	pub text: Option<String>,
	pub tool_calls: Vec<ToolCall>,
}

pub async fn complete(
	cfg: &librarian_config::LlmProviderConfig,
	request: &ChatRequest,
) -> Result<ChatCompletion> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = request_body(cfg, request);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chat_response(json)
}

fn request_body(cfg: &librarian_config::LlmProviderConfig, request: &ChatRequest) -> Value {
	let mut body = json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": request.messages.iter().map(ChatMessage::to_wire).collect::<Vec<_>>(),
	});

	if !request.tools.is_empty() {
		body["tools"] = request.tools.iter().map(ToolSpec::to_wire).collect();
		body["tool_choice"] = Value::String(request.tool_choice.as_str().to_string());
	}

	body
}

fn parse_chat_response(json: Value) -> Result<ChatCompletion> {
	let message = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing choices[0].message.".to_string(),
		})?;
	let text = message
		.get("content")
		.and_then(|c| c.as_str())
		.filter(|c| !c.trim().is_empty())
		.map(ToString::to_string);
	let mut tool_calls = Vec::new();

	if let Some(calls) = message.get("tool_calls").and_then(|v| v.as_array()) {
		for call in calls {
			tool_calls.push(parse_tool_call(call)?);
		}
	}

	Ok(ChatCompletion { text, tool_calls })
}

fn parse_tool_call(call: &Value) -> Result<ToolCall> {
	let id = call.get("id").and_then(|v| v.as_str()).ok_or_else(|| Error::InvalidResponse {
		message: "Tool call is missing an id.".to_string(),
	})?;
	let function = call.get("function").ok_or_else(|| Error::InvalidResponse {
		message: "Tool call is missing a function.".to_string(),
	})?;
	let name =
		function.get("name").and_then(|v| v.as_str()).ok_or_else(|| Error::InvalidResponse {
			message: "Tool call function is missing a name.".to_string(),
		})?;
	// Some providers send arguments as an object instead of a JSON string.
	let arguments = match function.get("arguments") {
		Some(Value::String(raw)) => raw.clone(),
		Some(Value::Null) | None => String::new(),
		Some(other) => other.to_string(),
	};

	Ok(ToolCall { id: id.to_string(), name: name.to_string(), arguments })
}
