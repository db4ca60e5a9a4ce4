//! Walks one page of rules, keeping track of which levels matched.

use mime::Mime;
use tracing::{debug, trace};
use crate::error::{Error, MatchError, OffsetError};
use super::check::{MatchFn, MatchOutcome};
use super::{offset, render, Kind, Rule};

/// Evaluation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
	/// Stop at the next level 0 rule once a level 0 cascade produced text,
	/// instead of walking the whole page.
	pub first_match: bool,
}

/// Result of evaluating one page against one buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
	/// Descriptions of all matched rules, joined.
	pub description: Vec<u8>,
	/// MIME type of the deepest matched rule that had one.
	pub mime: Option<Mime>,
	/// A level 0 rule matched and contributed text.
	pub matched: bool,
}

/// State threaded from one rule to the next.
#[derive(Debug, Default)]
struct LevelState {
	/// Most recent rule at each level matched
	last: Vec<bool>,
	/// Some rule at each level matched since the level was opened or cleared
	any: Vec<bool>,
	cursor: usize,
	description: Vec<u8>,
	found: bool,
	mime: Option<(u32, Mime)>,
}

fn flag(flags: &[bool], level: usize) -> bool {
	flags.get(level).cloned().unwrap_or(false)
}

/// Missing entries read as false, so clearing one never grows `flags`.
fn set_flag(flags: &mut Vec<bool>, level: usize, value: bool) {
	if flags.len() <= level {
		if !value {
			return;
		}
		flags.resize(level + 1, false);
	}
	flags[level] = value;
}

impl LevelState {
	/// A rule at `level` starts a fresh group for its children.
	fn open(&mut self, level: usize) {
		self.last.truncate(level.saturating_add(1));
		self.any.truncate(level.saturating_add(1));
	}

	fn miss(mut self, level: usize) -> LevelState {
		set_flag(&mut self.last, level, false);
		self
	}

	fn clear(mut self, level: usize) -> LevelState {
		set_flag(&mut self.last, level, false);
		set_flag(&mut self.any, level, false);
		self
	}

	/// Appends rendered text, returning whether anything was added.
	/// A leading backspace glues the text to what came before.
	fn append(&mut self, text: &[u8]) -> bool {
		let (glue, text) = match text.split_first() {
			Some((&0x08, rest)) => (true, rest),
			_ => (false, text),
		};
		if text.is_empty() {
			return false;
		}
		if !glue && !self.description.is_empty() {
			self.description.push(b' ');
		}
		self.description.extend_from_slice(text);
		true
	}

	fn hit(mut self, rule: &Rule, position: usize, outcome: MatchOutcome) -> LevelState {
		let level = rule.level as usize;
		set_flag(&mut self.last, level, true);
		set_flag(&mut self.any, level, true);

		if rule.kind != Kind::Default {
			self.cursor = position.saturating_add(outcome.consumed);
		}

		let text = render::render(&rule.description, &outcome.value);
		if self.append(&text) && level == 0 {
			self.found = true;
		}

		if let Some(ref mime) = rule.mime {
			let deeper = match self.mime {
				Some((l, _)) => rule.level > l,
				None => true,
			};
			if deeper {
				self.mime = Some((rule.level, mime.clone()));
			}
		}
		self
	}

	fn step(
		mut self,
		index: usize,
		rule: &Rule,
		buffer: &[u8],
		matchfn: MatchFn
	) -> Result<LevelState, Error> {
		let level = rule.level as usize;
		self.open(level);

		// Only evaluate if the parent level matched
		if level > 0 && !flag(&self.last, level - 1) {
			trace!(index, level, "parent did not match, skipping");
			return Ok(self.miss(level));
		}

		let position = match offset::resolve(&rule.offset, buffer, self.cursor) {
			Ok(p) => p,
			Err(OffsetError::UnsupportedWidth(width)) => {
				return Err(Error::UnsupportedWidth { index: index, width: width });
			}
			Err(e) => {
				debug!(index, level, error = %e, "offset did not resolve");
				return Ok(self.miss(level));
			}
		};

		// Default only runs when nothing on its level matched yet
		if rule.kind == Kind::Default && flag(&self.any, level) {
			trace!(index, level, "level already matched, default skipped");
			return Ok(self.miss(level));
		}

		let outcome = matchfn(&rule.kind, buffer, position).map_err(|e| match e {
			MatchError::UnsupportedWidth(width) => Error::UnsupportedWidth { index: index, width: width },
		})?;

		if rule.kind == Kind::Clear {
			trace!(index, level, "level cleared");
			return Ok(self.clear(level));
		}

		match outcome {
			Some(hit) => {
				trace!(index, level, position, family = ?rule.kind.family(), "matched");
				Ok(self.hit(rule, position, hit))
			}
			None => {
				trace!(index, level, position, family = ?rule.kind.family(), "no match");
				Ok(self.miss(level))
			}
		}
	}

	fn finish(self) -> Outcome {
		Outcome {
			description: self.description,
			mime: self.mime.map(|(_, m)| m),
			matched: self.found,
		}
	}
}

/// Evaluates `rules`, in order, against `buffer`.
///
/// Local failures (out of bounds reads, bad arithmetic, failed tests) only
/// make the offending rule not match. Malformed rules abort with an error.
pub fn evaluate(
	rules: &[Rule],
	buffer: &[u8],
	options: &Options,
	matchfn: MatchFn
) -> Result<Outcome, Error> {
	let mut state = LevelState::default();

	for (index, rule) in rules.iter().enumerate() {
		if options.first_match && state.found && rule.level == 0 {
			trace!(index, "first match found, stopping");
			break;
		}
		state = state.step(index, rule, buffer, matchfn)?;
	}

	Ok(state.finish())
}
