use crate::{Candidate, Error, LibrarianService, Result, ToolInvocation};

#[derive(Clone, Debug)]
pub struct AskRequest {
	pub question: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AskOutcome {
	/// The input guard rejected the question; no model was called.
	Refused,
	/// The model answered in its first round without a lookup.
	Direct,
	/// The answer was composed after one round of lookups.
	ToolAssisted,
}

#[derive(Clone, Debug)]
pub struct AskResponse {
	pub answer: String,
	pub outcome: AskOutcome,
	pub candidates: Vec<Candidate>,
	pub lookups: Vec<ToolInvocation>,
	pub model_calls: u32,
}

impl LibrarianService {
	/// Guard, retrieve, then converse.
	pub async fn ask(&self, req: AskRequest) -> Result<AskResponse> {
		let question = req.question.trim();

		if question.is_empty() {
			return Err(Error::InvalidRequest { message: "question must be non-empty.".to_string() });
		}
		if self.guard().check(question) {
			tracing::info!("Question rejected by the input guard.");

			return Ok(AskResponse {
				answer: self.cfg.guard.refusal_message.clone(),
				outcome: AskOutcome::Refused,
				candidates: Vec::new(),
				lookups: Vec::new(),
				model_calls: 0,
			});
		}

		let candidates = self.retrieve(question, self.cfg.retrieval.top_k).await?;
		let conversation = self.converse(question, &candidates).await?;
		let outcome = if conversation.lookups.is_empty() {
			AskOutcome::Direct
		} else {
			AskOutcome::ToolAssisted
		};

		tracing::info!(
			candidates = candidates.len(),
			lookups = conversation.lookups.len(),
			model_calls = conversation.model_calls,
			"Question answered."
		);

		Ok(AskResponse {
			answer: conversation.answer,
			outcome,
			candidates,
			lookups: conversation.lookups,
			model_calls: conversation.model_calls,
		})
	}
}
