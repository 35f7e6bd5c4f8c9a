//! rsi, a small scheme interpreter
//!
//! text goes through the lexer and reader into [`RsiValue`] trees, which [`eval`]
//! runs against an [`RsiEnv`] chain rooted at [`default_env`]

pub mod builtin;
pub mod config;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parse;
pub mod scope;
pub mod span;
pub mod symbol;
pub mod value;
mod utils;

pub use builtin::default_env;
pub use config::{ConfigError, RsiConfig};
pub use error::{RsiError, RsiErrorType, RsiResult};
pub use eval::eval;
pub use parse::{RsiReader, read_all};
pub use scope::RsiEnv;
pub use symbol::{Symbol, intern};
pub use value::RsiValue;

/// deepest list or quote nesting the reader accepts
pub const MAX_PARSE_DEPTH: usize = 10_000;

/// deepest chain of non-tail evaluations, tail calls don't count
pub const MAX_EVAL_DEPTH: usize = 30_000;

/// stack for a thread that should reach `MAX_EVAL_DEPTH` without overflowing
pub const STACK_SIZE: usize = 512 * 1024 * 1024;

/// reads and evaluates every expression in `text`
///
/// expressions run as soon as they are read. the value of the last one that
/// finished comes back alongside whatever stopped the run, so when the text ends in
/// the middle of an expression the earlier ones have already taken effect and the
/// failure is `EndOfInput`. the value is `None` when nothing was evaluated.
pub fn read_eval(text: &str, env: &RsiEnv) -> (Option<RsiValue>, RsiResult<()>) {
	let mut reader = RsiReader::new(text);
	let mut last = None;
	loop {
		let exp = match reader.read_next() {
			Ok(Some(exp)) => exp,
			Ok(None) => return (last, Ok(())),
			Err(err) => return (last, Err(err)),
		};
		match eval(&exp, env) {
			Ok(v) => last = Some(v),
			Err(err) => return (last, Err(err)),
		}
	}
}
