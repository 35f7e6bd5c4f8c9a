use crate::MAX_PARSE_DEPTH;
use crate::error::{RsiError, RsiErrorType, RsiResult};
use crate::lexer::{RsiLexer, RsiToken, RsiTokenValue};
use crate::span::{RsiSpan, merge_span};
use crate::symbol::intern;
use crate::value::RsiValue;

/// what a single read produced, `)` and `.` only mean something to an enclosing list
enum Read {
	Value(RsiValue),
	Close(RsiSpan),
	Dot(RsiSpan),
}

/// builds one expression at a time from a token stream
pub struct RsiReader<'a> {
	lexer: RsiLexer<'a>,
	/// open lists and quotes around the item being read
	depth: usize,
}

impl<'a> RsiReader<'a> {
	pub fn new(data: &'a str) -> Self {
		Self { lexer: RsiLexer::new(data), depth: 0 }
	}

	/// next token that isn't whitespace or a comment
	fn next_token(&mut self) -> RsiToken {
		loop {
			let token = self.lexer.next_token();
			log::trace!("scan: {}", token);
			match token.0 {
				RsiTokenValue::Whitespace(_) | RsiTokenValue::Comment(_) => {},
				_ => return token,
			}
		}
	}

	/// the next expression; `EndOfInput` when the input ran out, even between expressions
	pub fn read(&mut self) -> RsiResult<RsiValue> {
		self.read_next()?.ok_or_else(|| RsiError::new(RsiErrorType::EndOfInput))
	}

	/// like `read`, but a clean end between expressions is `None` rather than an error
	pub fn read_next(&mut self) -> RsiResult<Option<RsiValue>> {
		self.depth = 0;
		let token = self.next_token();
		if token.0 == RsiTokenValue::Eof {
			return Ok(None)
		}
		match self.read_token(token)? {
			Read::Value(v) => Ok(Some(v)),
			Read::Close(span) => Err(RsiError(RsiErrorType::UnexpectedCloseParen, span)),
			Read::Dot(span) => Err(RsiError(RsiErrorType::UnexpectedDot, span)),
		}
	}

	fn read_item(&mut self) -> RsiResult<Read> {
		let token = self.next_token();
		self.read_token(token)
	}

	/// runs `f` one level deeper, failing instead once `MAX_PARSE_DEPTH` is reached
	fn nested<T>(&mut self, span: RsiSpan, f: impl FnOnce(&mut Self) -> RsiResult<T>) -> RsiResult<T> {
		if self.depth >= MAX_PARSE_DEPTH {
			return Err(RsiError(RsiErrorType::NestingTooDeep(MAX_PARSE_DEPTH), span))
		}
		self.depth += 1;
		let res = f(self);
		self.depth -= 1;
		res
	}

	fn read_token(&mut self, token: RsiToken) -> RsiResult<Read> {
		let span = token.1;
		Ok(Read::Value(match token.0 {
			RsiTokenValue::Eof => return Err(RsiError(RsiErrorType::EndOfInput, span)),
			RsiTokenValue::LeftParen => self.nested(span, |r| r.read_list(span))?,
			RsiTokenValue::RightParen => return Ok(Read::Close(span)),
			RsiTokenValue::Dot => return Ok(Read::Dot(span)),
			RsiTokenValue::Quote => match self.nested(span, Self::read_item)? {
				Read::Value(v) => RsiValue::list(vec![RsiValue::Symbol(intern("quote")), v]),
				Read::Close(span) => return Err(RsiError(RsiErrorType::UnexpectedCloseParen, span)),
				Read::Dot(span) => return Err(RsiError(RsiErrorType::UnexpectedDot, span)),
			},
			RsiTokenValue::Symbol(name) => RsiValue::Symbol(intern(&name)),
			RsiTokenValue::Number(text) => match parse_number(&text) {
				Some(v) => v,
				None => return Err(RsiError(RsiErrorType::InvalidNumber(text), span)),
			},
			RsiTokenValue::String(text) => RsiValue::string(&text),
			RsiTokenValue::True => RsiValue::Bool(true),
			RsiTokenValue::False => RsiValue::Bool(false),
			RsiTokenValue::Illegal(msg) => return Err(RsiError(RsiErrorType::Lexical(msg), span)),
			// next_token never hands these out
			RsiTokenValue::Whitespace(_) | RsiTokenValue::Comment(_) => return self.read_item(),
		}))
	}

	fn read_list(&mut self, start: RsiSpan) -> RsiResult<RsiValue> {
		let mut items = vec![];
		loop {
			match self.read_item()? {
				Read::Value(v) => items.push(v),
				Read::Close(end) => {
					log::trace!("list of {} read at {:?}", items.len(), merge_span(start, end));
					return Ok(RsiValue::list(items))
				},
				Read::Dot(dot) => {
					let tail = match self.read_item()? {
						Read::Value(v) => v,
						Read::Close(_) => return Err(RsiError(RsiErrorType::MalformedDot("nothing follows ."), dot)),
						Read::Dot(span) => return Err(RsiError(RsiErrorType::UnexpectedDot, span)),
					};
					return match self.read_item()? {
						Read::Close(_) => Ok(RsiValue::list_with_tail(items, tail)),
						Read::Value(_) | Read::Dot(_) => Err(RsiError(RsiErrorType::MalformedDot("more than one object follows ."), dot)),
					}
				},
			}
		}
	}
}

/// ieee double, `_` may separate digits
fn parse_number(text: &str) -> Option<RsiValue> {
	let cleaned: String = text.chars().filter(|c| *c != '_').collect();
	cleaned.parse::<f64>().ok().map(RsiValue::Number)
}

/// every complete expression in `data`, nothing is evaluated
pub fn read_all(data: &str) -> RsiResult<Vec<RsiValue>> {
	let mut reader = RsiReader::new(data);
	let mut out = vec![];
	while let Some(v) = reader.read_next()? {
		out.push(v);
	}
	Ok(out)
}
