use std::{error, fmt};

use crate::lexer::UNTERMINATED_STRING;
use crate::span::RsiSpan;
use crate::utils::{Dual, format_arg_range};

#[derive(Debug, Clone, PartialEq)]
pub enum RsiErrorType {
	/// not a real failure, the input stopped in the middle of an expression
	EndOfInput,

	// reader
	Lexical(String),
	UnexpectedCloseParen,
	UnexpectedDot,
	MalformedDot(&'static str),
	InvalidNumber(String),
	NestingTooDeep(usize),

	// evaluator
	UnboundSymbol(String),
	NotAProcedure(String),
	NotAPair(String),
	NotANumber(String),
	ArityMismatch(Dual, usize),
	MalformedSpecialForm(&'static str, String),
	RecursionTooDeep(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiError(pub RsiErrorType, pub RsiSpan);

impl RsiError {
	pub fn new(kind: RsiErrorType) -> Self {
		RsiError(kind, None)
	}

	pub fn kind(&self) -> &RsiErrorType {
		&self.0
	}

	pub fn is_end_of_input(&self) -> bool {
		self.0 == RsiErrorType::EndOfInput
	}

	/// more text could still complete the input, an open list or an open string
	pub fn is_incomplete(&self) -> bool {
		match &self.0 {
			RsiErrorType::EndOfInput => true,
			RsiErrorType::Lexical(msg) => msg.starts_with(UNTERMINATED_STRING),
			_ => false,
		}
	}

	pub fn malformed(form: &'static str, detail: impl Into<String>) -> Self {
		RsiError::new(RsiErrorType::MalformedSpecialForm(form, detail.into()))
	}
}

impl fmt::Display for RsiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&match &self.0 {
			RsiErrorType::EndOfInput => "End of File".to_string(),
			RsiErrorType::Lexical(text) => text.clone(),
			RsiErrorType::UnexpectedCloseParen => "Unexpected `)`".to_string(),
			RsiErrorType::UnexpectedDot => "Unexpected `.` outside of a list".to_string(),
			RsiErrorType::MalformedDot(text) => format!("Malformed dotted list: {}", text),
			RsiErrorType::InvalidNumber(text) => format!("Invalid number `{}`", text),
			RsiErrorType::NestingTooDeep(max) => format!("Expression too deeply nested (max depth: {})", max),
			RsiErrorType::UnboundSymbol(name) => format!("Undefined symbol: {}", name),
			RsiErrorType::NotAProcedure(text) => format!("Not a procedure: {}", text),
			RsiErrorType::NotAPair(text) => format!("Not a pair: {}", text),
			RsiErrorType::NotANumber(text) => format!("Not a number: {}", text),
			RsiErrorType::ArityMismatch(dual, got) => format!("Argument count mismatch: expected {}, got {}", format_arg_range(*dual), got),
			RsiErrorType::MalformedSpecialForm(form, detail) => format!("Malformed `{}`: {}", form, detail),
			RsiErrorType::RecursionTooDeep(max) => format!("Evaluation depth limit exceeded (max: {})", max),
		})?;
		match &self.1 {
			Some(span) => write!(f, " (at {})", span),
			None => Ok(()),
		}
	}
}

impl error::Error for RsiError {}

pub type RsiResult<T> = Result<T, RsiError>;
