//! Functions the model may call, resolved through a closed set of variants.

use serde::Deserialize;
use serde_json::json;

use librarian_providers::chat::{ToolCall, ToolSpec};

use crate::LookupTool;

pub const LOOKUP_DETAIL: &str = "lookupDetail";

#[derive(Debug, Deserialize)]
struct LookupDetailArgs {
	title: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LibraryTool {
	LookupDetail { title: String },
}
impl LibraryTool {
	/// Maps a model-requested call to a known tool. Unknown names resolve to `None`.
	///
	/// Arguments that fail to parse become an empty title, which the lookup answers with
	/// its invalid-title sentinel.
	pub fn resolve(call: &ToolCall) -> Option<Self> {
		match call.name.as_str() {
			LOOKUP_DETAIL => Some(Self::LookupDetail { title: parse_title(call) }),
			_ => None,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::LookupDetail { .. } => LOOKUP_DETAIL,
		}
	}

	pub fn argument(&self) -> &str {
		match self {
			Self::LookupDetail { title } => title,
		}
	}

	pub fn invoke(&self, lookup: &LookupTool) -> String {
		match self {
			Self::LookupDetail { title } => lookup.lookup_detail(title),
		}
	}
}

/// Schemas advertised on the first model round.
pub fn advertised() -> Vec<ToolSpec> {
	vec![ToolSpec {
		name: LOOKUP_DETAIL.to_string(),
		description: "Returns the detailed summary for an exact book title.".to_string(),
		parameters: json!({
			"type": "object",
			"properties": {
				"title": { "type": "string", "description": "The exact book title." }
			},
			"required": ["title"],
		}),
	}]
}

fn parse_title(call: &ToolCall) -> String {
	match serde_json::from_str::<LookupDetailArgs>(&call.arguments) {
		Ok(args) => args.title,
		Err(err) => {
			tracing::warn!(
				call_id = %call.id,
				error = %err,
				"Malformed tool arguments; treating title as empty."
			);

			String::new()
		},
	}
}
