//! Two-round, tool-assisted answer composition.
//!
//! The first model round sees the candidates and may request lookups. Requested lookups
//! run locally and their results are appended; the second round sees them without any
//! tools advertised, so tool use is capped at one round and two model calls.

use std::fmt::Write as _;

use librarian_providers::chat::{ChatCompletion, ChatMessage, ChatRequest, ToolCall, ToolChoice};

use crate::{Candidate, Capability, Error, LibrarianService, Result, tools::LibraryTool};

pub const SYSTEM_PROMPT: &str = "\
You are a librarian assistant. You answer questions about books and the user's reading interests. \
A list of candidate books (title and short summary) that may fit has already been provided below. \
Pick exactly one book that best matches what the user wants and briefly explain why. \
Then always call the `lookupDetail` tool with the exact title you recommend to fetch its detailed summary. \
Once you receive the tool result, combine everything into one clear final answer. \
If the user asks for something offensive or inappropriate, politely decline.";
pub const NO_CANDIDATES: &str = "(no results from the retriever)";

/// One executed tool call and the string fed back to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolInvocation {
	pub call_id: String,
	pub function: String,
	pub title: String,
	pub result: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
	pub answer: String,
	/// Every turn sent or received, ending with the final assistant answer.
	pub turns: Vec<ChatMessage>,
	pub lookups: Vec<ToolInvocation>,
	pub model_calls: u32,
}

#[derive(Debug)]
enum State {
	Compose,
	FirstCall { turns: Vec<ChatMessage> },
	SecondCall { turns: Vec<ChatMessage>, lookups: Vec<ToolInvocation> },
	Done(Conversation),
}

impl LibrarianService {
	pub async fn converse(&self, question: &str, candidates: &[Candidate]) -> Result<Conversation> {
		let mut state = State::Compose;
		let mut model_calls = 0_u32;

		loop {
			state = match state {
				State::Compose => State::FirstCall { turns: compose_turns(question, candidates) },
				State::FirstCall { turns } => {
					let request = ChatRequest {
						messages: turns,
						tools: crate::tools::advertised(),
						tool_choice: ToolChoice::Auto,
					};
					let completion = self.reason(&request).await?;

					model_calls += 1;

					tracing::debug!(
						tool_calls = completion.tool_calls.len(),
						has_text = completion.text.is_some(),
						"First model round finished."
					);

					self.after_first_call(request.messages, completion, model_calls)?
				},
				State::SecondCall { turns, lookups } => {
					let request = ChatRequest {
						messages: turns,
						tools: Vec::new(),
						tool_choice: ToolChoice::None,
					};
					let completion = self.reason(&request).await?;

					model_calls += 1;

					let answer = completion.text.ok_or_else(|| {
						Error::malformed(Capability::Reasoning, "Second round returned no text.")
					})?;

					State::Done(finish(request.messages, answer, lookups, model_calls))
				},
				State::Done(conversation) => return Ok(conversation),
			};
		}
	}

	/// Runs every known tool call from the first round and decides the next state.
	fn after_first_call(
		&self,
		mut turns: Vec<ChatMessage>,
		completion: ChatCompletion,
		model_calls: u32,
	) -> Result<State> {
		let ChatCompletion { text, tool_calls } = completion;
		let mut accepted: Vec<(ToolCall, LibraryTool)> = Vec::with_capacity(tool_calls.len());

		for call in tool_calls {
			match LibraryTool::resolve(&call) {
				Some(tool) => accepted.push((call, tool)),
				None => {
					tracing::warn!(
						call_id = %call.id,
						function = %call.name,
						"Skipping unknown tool requested by the model."
					);
				},
			}
		}

		if accepted.is_empty() {
			let answer = text.ok_or_else(|| {
				Error::malformed(
					Capability::Reasoning,
					"First round returned neither text nor a usable tool call.",
				)
			})?;

			return Ok(State::Done(finish(turns, answer, Vec::new(), model_calls)));
		}

		let lookups = accepted
			.iter()
			.map(|(call, tool)| ToolInvocation {
				call_id: call.id.clone(),
				function: tool.name().to_string(),
				title: tool.argument().to_string(),
				result: tool.invoke(self.lookup()),
			})
			.collect::<Vec<_>>();
		let calls = accepted.into_iter().map(|(call, _)| call).collect();

		turns.push(ChatMessage::assistant(text.unwrap_or_default(), calls));

		for lookup in &lookups {
			turns.push(ChatMessage::tool(&lookup.call_id, &lookup.function, &lookup.result));
		}

		Ok(State::SecondCall { turns, lookups })
	}
}

/// System instruction, the raw question, then the candidates as plain-text context.
pub fn compose_turns(question: &str, candidates: &[Candidate]) -> Vec<ChatMessage> {
	vec![
		ChatMessage::system(SYSTEM_PROMPT),
		ChatMessage::user(question),
		ChatMessage::system(format_candidates(candidates)),
	]
}

pub fn format_candidates(candidates: &[Candidate]) -> String {
	let mut block = format!("Retriever candidates (top {}):\n", candidates.len());

	if candidates.is_empty() {
		block.push_str(NO_CANDIDATES);

		return block;
	}

	for (rank, candidate) in candidates.iter().enumerate() {
		if rank > 0 {
			block.push('\n');
		}

		let _ = write!(
			block,
			"{}. {} -> {} (distance={:.4})",
			rank + 1,
			candidate.title,
			candidate.summary,
			candidate.distance
		);
	}

	block
}

fn finish(
	mut turns: Vec<ChatMessage>,
	answer: String,
	lookups: Vec<ToolInvocation>,
	model_calls: u32,
) -> Conversation {
	turns.push(ChatMessage::assistant(answer.clone(), Vec::new()));

	Conversation { answer, turns, lookups, model_calls }
}
