//! Language-model selection of the single best candidate.
//!
//! The model is asked to answer as `Name :- Synopsis`. Replies are free text, so parsing is a
//! heuristic with an explicit no-match outcome:
//!
//! 1. The reply is split into paragraphs on blank lines (`\n\n`), dropping whitespace-only ones.
//!    Models tend to restate the question before answering, so when there is more than one
//!    paragraph the second one is taken as the answer block; otherwise the only one is.
//! 2. The answer block is split on the first `:-`. The trimmed text before it is the name.
//! 3. The name must equal some candidate's `metadata.name` exactly (case-sensitive).
//!
//! Any step failing yields a [`Selection`] that promotes nothing; the raw reply is logged for
//! prompt tuning.

use std::sync::Arc;

use serde::{Serialize, Serializer, ser::SerializeMap};

use anifind_config::LlmProviderConfig;

use crate::{Candidate, ChatProvider, Error, Result};

const PARAGRAPH_BREAK: &str = "\n\n";
const ANSWER_SEPARATOR: &str = ":-";

/// Outcome of the ranking stage. Only [`Selection::Chosen`] reorders the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
	/// The model named a retrieved candidate.
	Chosen { name: String },
	/// The reply parsed, but the name matches no candidate.
	Unmatched { name: String },
	/// The reply did not follow the `Name :- Synopsis` format.
	Unparsable,
	/// Ranking did not run: disabled, nothing to rank, or degraded after a provider failure.
	Skipped,
}
impl Selection {
	pub fn chosen(&self) -> Option<&str> {
		match self {
			Self::Chosen { name } => Some(name),
			_ => None,
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::Chosen { .. } => "chosen",
			Self::Unmatched { .. } => "unmatched",
			Self::Unparsable => "unparsable",
			Self::Skipped => "skipped",
		}
	}
}

pub struct Selector {
	cfg: LlmProviderConfig,
	chat: Arc<dyn ChatProvider>,
}
impl Selector {
	pub fn new(cfg: LlmProviderConfig, chat: Arc<dyn ChatProvider>) -> Self {
		Self { cfg, chat }
	}

	/// Sends exactly one chat request. Fails only when the provider call itself fails.
	pub async fn select(&self, query: &str, candidates: &[Candidate]) -> Result<Selection> {
		if candidates.is_empty() {
			return Ok(Selection::Skipped);
		}

		let prompt = build_prompt(query, candidates);
		let reply = self.chat.complete(&self.cfg, &prompt).await.map_err(|err| {
			let raw = err.raw_payload().map(str::to_string);

			tracing::warn!(
				provider = %self.cfg.provider_id,
				error = %err,
				raw = raw.as_deref().unwrap_or_default(),
				"Selection provider call failed."
			);

			Error::Selection { message: err.to_string(), raw }
		})?;

		Ok(match_reply(&reply, candidates))
	}
}

/// Builds the single-turn prompt: the query plus a `name → [synopsis]` map in retrieval order.
pub fn build_prompt(query: &str, candidates: &[Candidate]) -> String {
	let summary = serde_json::to_string(&CandidateSummary(candidates))
		.unwrap_or_else(|_| String::from("{}"));

	format!(
		"A user is looking for an anime and described it as:\n\"{query}\"\n\n\
		 Here are the candidate anime, each mapped to a list holding its synopsis:\n{summary}\n\n\
		 Pick the one candidate that most closely matches the description. Reply with its name \
		 exactly as written above and its synopsis, in this format:\nName :- Synopsis"
	)
}

/// Extracts the answer name from a reply; `None` when the reply is not in `Name :- ...` form.
pub fn parse_reply(reply: &str) -> Option<String> {
	let normalized = reply.replace("\r\n", "\n");
	let mut paragraphs =
		normalized.split(PARAGRAPH_BREAK).filter(|paragraph| !paragraph.trim().is_empty());
	let first = paragraphs.next()?;
	let answer = paragraphs.next().unwrap_or(first);
	let (name, _) = answer.split_once(ANSWER_SEPARATOR)?;
	let name = name.trim();

	if name.is_empty() { None } else { Some(name.to_string()) }
}

fn match_reply(reply: &str, candidates: &[Candidate]) -> Selection {
	let Some(name) = parse_reply(reply) else {
		tracing::warn!(reply, "Selection reply is not in `Name :- Synopsis` form.");

		return Selection::Unparsable;
	};

	if candidates.iter().any(|candidate| candidate.name() == name) {
		Selection::Chosen { name }
	} else {
		tracing::warn!(reply, name, "Selection reply names no retrieved candidate.");

		Selection::Unmatched { name }
	}
}

// Serializes as `{"<name>": ["<synopsis>"], ...}`, keeping retrieval order and the first
// occurrence of a repeated name.
struct CandidateSummary<'a>(&'a [Candidate]);
impl Serialize for CandidateSummary<'_> {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seen = std::collections::HashSet::new();
		let mut map = serializer.serialize_map(None)?;

		for candidate in self.0 {
			if seen.insert(candidate.name()) {
				map.serialize_entry(candidate.name(), &[candidate.synopsis.as_str()])?;
			}
		}

		map.end()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;
	use crate::CandidateMetadata;

	fn candidate(name: &str, synopsis: &str) -> Candidate {
		Candidate {
			id: name.to_lowercase(),
			score: 0.5,
			metadata: CandidateMetadata {
				name: name.to_string(),
				genres: Vec::new(),
				stored: Map::new(),
			},
			synopsis: synopsis.to_string(),
		}
	}

	#[test]
	fn parses_single_paragraph_reply() {
		assert_eq!(
			parse_reply("Gundam :- A story about giant robots."),
			Some("Gundam".to_string())
		);
	}

	#[test]
	fn takes_second_paragraph_after_preamble() {
		let reply = "Based on the query, the closest match is:\n\nEvangelion :- Teenagers pilot \
		             giant mechs.\n\nHope this helps!";

		assert_eq!(parse_reply(reply), Some("Evangelion".to_string()));
	}

	#[test]
	fn handles_crlf_paragraphs() {
		assert_eq!(parse_reply("Sure.\r\n\r\n  Gundam  :- Robots."), Some("Gundam".to_string()));
	}

	#[test]
	fn ignores_trailing_and_repeated_blank_lines() {
		assert_eq!(
			parse_reply("Gundam :- A story about giant robots.\n\n"),
			Some("Gundam".to_string())
		);
		assert_eq!(
			parse_reply("Here is my pick.\n\n\n\nEvangelion :- Teenagers pilot giant mechs.\n\n  \n"),
			Some("Evangelion".to_string())
		);
	}

	#[test]
	fn preamble_without_separator_in_answer_is_unparsable() {
		assert_eq!(parse_reply("Gundam :- Robots.\n\nI picked it because of robots."), None);
	}

	#[test]
	fn missing_separator_or_name_is_unparsable() {
		assert_eq!(parse_reply("Gundam - Robots."), None);
		assert_eq!(parse_reply("  :- Robots."), None);
		assert_eq!(parse_reply(""), None);
	}

	#[test]
	fn splits_on_first_separator_only() {
		assert_eq!(parse_reply("Re:Zero :- Time loops :- and more."), Some("Re:Zero".to_string()));
	}

	#[test]
	fn match_is_exact_and_case_sensitive() {
		let candidates = vec![candidate("Gundam", "Robots."), candidate("Evangelion", "EVA.")];

		assert_eq!(
			match_reply("Gundam :- Robots.", &candidates),
			Selection::Chosen { name: "Gundam".to_string() }
		);
		assert_eq!(
			match_reply("gundam :- Robots.", &candidates),
			Selection::Unmatched { name: "gundam".to_string() }
		);
		assert_eq!(match_reply("no idea", &candidates), Selection::Unparsable);
	}

	#[test]
	fn prompt_embeds_query_and_ordered_summary() {
		let candidates = vec![
			candidate("Zeta", "Second war."),
			candidate("Akira", "Neo-Tokyo."),
			candidate("Zeta", "Duplicate."),
		];
		let prompt = build_prompt("mecha anime with giant robots", &candidates);

		assert!(prompt.contains("\"mecha anime with giant robots\""));
		assert!(prompt.contains(r#"{"Zeta":["Second war."],"Akira":["Neo-Tokyo."]}"#));
		assert!(prompt.ends_with("Name :- Synopsis"));
	}
}
