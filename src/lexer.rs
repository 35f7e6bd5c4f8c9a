use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::span::{RsiInSpan, RsiSpan};

/// start of the message for a string that runs off the end of the input
pub const UNTERMINATED_STRING: &str = "unterminated string";

#[derive(Debug, Clone, PartialEq)]
pub enum RsiTokenValue {
	Eof,
	Whitespace(String),
	LeftParen,
	RightParen,
	Quote,
	Dot,
	Symbol(String),
	Number(String),
	String(String),
	True,
	False,
	Comment(String),
	/// carries a message describing what went wrong
	Illegal(String),
}

impl RsiTokenValue {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Eof           => "EOF",
			Self::Whitespace(_) => "WS",
			Self::LeftParen     => "LEFT_PAREN",
			Self::RightParen    => "RIGHT_PAREN",
			Self::Quote         => "QUOTE",
			Self::Dot           => "DOT",
			Self::Symbol(_)     => "SYMBOL",
			Self::Number(_)     => "NUMBER",
			Self::String(_)     => "STRING",
			Self::True          => "TRUE",
			Self::False         => "FALSE",
			Self::Comment(_)    => "COMMENT",
			Self::Illegal(_)    => "ILLEGAL",
		}
	}
	pub fn text(&self) -> &str {
		match self {
			Self::Eof        => "",
			Self::LeftParen  => "(",
			Self::RightParen => ")",
			Self::Quote      => "'",
			Self::Dot        => ".",
			Self::True       => "t",
			Self::False      => "f",
			Self::Whitespace(v) | Self::Symbol(v) | Self::Number(v)
			| Self::String(v) | Self::Comment(v) | Self::Illegal(v) => v,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiToken(pub RsiTokenValue, pub RsiSpan);

impl fmt::Display for RsiToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {:?}", self.0.name(), self.0.text())
	}
}

enum CharType {
	Whitespace,
	Paren(bool), // true: (  false: )
	Quote,
	StringQuote,
	Comment,
	Hash,
	Other(char),
}

fn char_type(c: char) -> CharType {
	match c {
		c if c.is_whitespace() => CharType::Whitespace,
		'(' => CharType::Paren(true),
		')' => CharType::Paren(false),
		'\'' => CharType::Quote,
		'"' => CharType::StringQuote,
		';' => CharType::Comment,
		'#' => CharType::Hash,
		c => CharType::Other(c),
	}
}

/// characters allowed inside symbol and number text
fn is_symbol_char(c: char) -> bool {
	match c {
		'(' | ')' | '\'' | '"' | ';' => false,
		c => !c.is_whitespace() && !c.is_control(),
	}
}

fn is_delimiter(c: Option<&char>) -> bool {
	match c {
		None => true,
		Some(c) => !is_symbol_char(*c),
	}
}

/// lazily splits a source buffer into tokens, one at a time
pub struct RsiLexer<'a> {
	chars: Peekable<Chars<'a>>,
	pos: usize,
	line: usize,
	col: usize,
	done: bool,
}

impl<'a> RsiLexer<'a> {
	pub fn new(data: &'a str) -> Self {
		Self {
			chars: data.chars().peekable(),
			pos: 0,
			line: 1,
			col: 1,
			done: false,
		}
	}

	fn here(&self) -> RsiInSpan {
		RsiInSpan(self.pos, self.line, self.col, 1)
	}

	fn bump(&mut self) -> Option<(RsiInSpan, char)> {
		let ch = self.chars.next()?;
		let span = self.here();
		self.pos += 1;
		match ch {
			'\n' => { self.col = 1; self.line += 1; },
			_ => { self.col += 1; }
		}
		Some((span, ch))
	}

	fn peek(&mut self) -> Option<&char> {
		self.chars.peek()
	}

	fn token(&self, value: RsiTokenValue, start: RsiInSpan) -> RsiToken {
		RsiToken(value, Some(start.with_len(self.pos - start.0)))
	}

	/// consume while `pred` holds, appending to `buf`
	fn take_while(&mut self, buf: &mut String, pred: impl Fn(char) -> bool) {
		while let Some(&ch) = self.peek() {
			if !pred(ch) {
				break
			}
			buf.push(ch);
			self.bump();
		}
	}

	/// the next token; keeps returning EOF once the input is used up
	pub fn next_token(&mut self) -> RsiToken {
		let (start, ch) = match self.bump() {
			Some(v) => v,
			None => return RsiToken(RsiTokenValue::Eof, Some(self.here().with_len(0))),
		};
		match char_type(ch) {
			CharType::Whitespace => {
				let mut res = String::from(ch);
				self.take_while(&mut res, char::is_whitespace);
				self.token(RsiTokenValue::Whitespace(res), start)
			},
			CharType::Paren(true) => self.token(RsiTokenValue::LeftParen, start),
			CharType::Paren(false) => self.token(RsiTokenValue::RightParen, start),
			CharType::Quote => self.token(RsiTokenValue::Quote, start),
			CharType::Comment => {
				// runs until eol or eof, the newline belongs to the comment
				let mut res = String::from(ch);
				while let Some((_, ch)) = self.bump() {
					res.push(ch);
					if ch == '\n' {
						break
					}
				}
				self.token(RsiTokenValue::Comment(res), start)
			},
			CharType::StringQuote => self.scan_string(start),
			CharType::Hash => {
				let mut res = String::new();
				self.take_while(&mut res, is_symbol_char);
				match res.as_str() {
					"t" => self.token(RsiTokenValue::True, start),
					"f" => self.token(RsiTokenValue::False, start),
					_ => self.token(RsiTokenValue::Illegal(format!("unsupported hash code #{}", res)), start),
				}
			},
			CharType::Other(ch) => {
				let numeric = match ch {
					'0'..='9' => true,
					'-' | '+' => matches!(self.peek(), Some(c) if c.is_ascii_digit() || *c == '.'),
					'.' => {
						if is_delimiter(self.peek()) {
							return self.token(RsiTokenValue::Dot, start)
						}
						matches!(self.peek(), Some(c) if c.is_ascii_digit())
					},
					_ => false,
				};
				if !is_symbol_char(ch) {
					return self.token(RsiTokenValue::Illegal(format!("unexpected character {:?}", ch)), start)
				}
				let mut res = String::from(ch);
				self.take_while(&mut res, is_symbol_char);
				if numeric {
					self.token(RsiTokenValue::Number(res), start)
				} else {
					self.token(RsiTokenValue::Symbol(res), start)
				}
			},
		}
	}

	fn scan_string(&mut self, start: RsiInSpan) -> RsiToken {
		let unterminated = |res: &str| RsiTokenValue::Illegal(format!("{}: {:?}", UNTERMINATED_STRING, res));
		let mut res = String::new();
		// a bad escape doesn't stop the scan, the rest of the string is still consumed
		let mut bad_escape = None;
		loop {
			let ch = match self.bump() {
				None => return self.token(unterminated(&res), start),
				Some((_, ch)) => ch,
			};
			match ch {
				'"' => break,
				// shorthands: \n \t \r \a \e \0
				// codes:      \xHH \{code}
				// literals:   \#
				'\\' => match self.bump().map(|v| v.1) {
					None => return self.token(unterminated(&res), start),
					Some('n') => res.push('\n'),
					Some('t') => res.push('\t'),
					Some('r') => res.push('\r'),
					Some('a') => res.push('\x07'),
					Some('e') => res.push('\x1b'),
					Some('0') => res.push('\x00'),
					Some('x') => {
						let mut t = String::new();
						for _ in 0..2 {
							match self.bump() {
								None => return self.token(unterminated(&res), start),
								Some((_, ch)) => t.push(ch),
							}
						}
						let mut buf = [0u8; 1];
						match hex::decode_to_slice(&t, &mut buf) {
							Ok(()) => res.push(char::from(buf[0])),
							Err(_) => { bad_escape.get_or_insert(format!("\\x{}", t)); },
						}
					},
					Some('{') => {
						let mut esc = String::new();
						loop {
							match self.bump() {
								None => return self.token(unterminated(&res), start),
								Some((_, '}')) => break,
								Some((_, ch)) => esc.push(ch),
							}
						}
						match decode_scalar(&esc) {
							Some(ch) => res.push(ch),
							None => { bad_escape.get_or_insert(format!("\\{{{}}}", esc)); },
						}
					},
					Some(tc) => res.push(tc),
				},
				ch => res.push(ch),
			}
		}
		match bad_escape {
			Some(esc) => self.token(RsiTokenValue::Illegal(format!("invalid escape sequence {}", esc)), start),
			None => self.token(RsiTokenValue::String(res), start),
		}
	}
}

/// up to eight hex digits naming a unicode scalar value
fn decode_scalar(esc: &str) -> Option<char> {
	if esc.is_empty() || esc.len() > 8 {
		return None
	}
	// pad so it's four bytes in size
	let mut padded = String::with_capacity(8);
	for _ in esc.len()..8 {
		padded.push('0');
	}
	padded.push_str(esc);
	let mut buf = [0u8; 4];
	hex::decode_to_slice(&padded, &mut buf).ok()?;
	char::from_u32(u32::from_be_bytes(buf))
}

impl<'a> Iterator for RsiLexer<'a> {
	type Item = RsiToken;

	/// yields every token including a final EOF, then stops
	fn next(&mut self) -> Option<RsiToken> {
		if self.done {
			return None
		}
		let token = self.next_token();
		if token.0 == RsiTokenValue::Eof {
			self.done = true;
		}
		Some(token)
	}
}
