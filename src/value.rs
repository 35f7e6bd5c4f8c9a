use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::error::{RsiError, RsiErrorType, RsiResult};
use crate::scope::RsiEnv;
use crate::symbol::Symbol;

/// host function called with the already evaluated arguments
pub type RsiNativeFn = fn(&[RsiValue]) -> RsiResult<RsiValue>;

#[derive(Clone, Copy)]
pub struct RsiNative {
	pub name: &'static str,
	pub func: RsiNativeFn,
}

/// lambda data
pub struct RsiClosure {
	pub params: Vec<Symbol>,
	/// implicit `begin`, may be empty
	pub body: Vec<RsiValue>,
	pub env: RsiEnv,
}

impl fmt::Debug for RsiClosure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RsiClosure").field("params", &self.params).field("body", &self.body).finish()
	}
}

/// a cons cell
pub struct RsiPair {
	pub head: RsiValue,
	pub tail: RsiValue,
}

// unlink long tails one cell at a time instead of recursing down the list
impl Drop for RsiPair {
	fn drop(&mut self) {
		let mut tail = mem::replace(&mut self.tail, RsiValue::Nil);
		while let RsiValue::Pair(pair) = tail {
			match Rc::try_unwrap(pair) {
				Ok(mut pair) => tail = mem::replace(&mut pair.tail, RsiValue::Nil),
				Err(_) => break,
			}
		}
	}
}

#[derive(Clone)]
pub enum RsiValue {
	Symbol(Symbol),
	Number(f64),
	String(Rc<str>),
	Bool(bool),
	Pair(Rc<RsiPair>),
	/// the empty list
	Nil,
	Native(RsiNative),
	Closure(Rc<RsiClosure>),
}

impl RsiValue {
	pub fn cons(head: RsiValue, tail: RsiValue) -> Self {
		RsiValue::Pair(Rc::new(RsiPair { head, tail }))
	}

	pub fn string(text: &str) -> Self {
		RsiValue::String(Rc::from(text))
	}

	/// proper list built right to left
	pub fn list(items: Vec<RsiValue>) -> Self {
		Self::list_with_tail(items, RsiValue::Nil)
	}

	pub fn list_with_tail(items: Vec<RsiValue>, tail: RsiValue) -> Self {
		items.into_iter().rev().fold(tail, |acc, v| RsiValue::cons(v, acc))
	}

	pub fn is_nil(&self) -> bool {
		matches!(self, RsiValue::Nil)
	}

	pub fn is_pair(&self) -> bool {
		matches!(self, RsiValue::Pair(_))
	}

	/// only `#f` and zero are false
	pub fn is_truthy(&self) -> bool {
		match self {
			RsiValue::Bool(v) => *v,
			RsiValue::Number(v) => *v != 0.0,
			_ => true,
		}
	}

	pub fn as_pair(&self) -> RsiResult<&RsiPair> {
		match self {
			RsiValue::Pair(pair) => Ok(pair),
			other => Err(RsiError::new(RsiErrorType::NotAPair(other.to_string()))),
		}
	}

	pub fn as_number(&self) -> RsiResult<f64> {
		match self {
			RsiValue::Number(v) => Ok(*v),
			other => Err(RsiError::new(RsiErrorType::NotANumber(other.to_string()))),
		}
	}

	pub fn as_symbol(&self) -> Option<&Symbol> {
		match self {
			RsiValue::Symbol(sym) => Some(sym),
			_ => None,
		}
	}

	pub fn head(&self) -> RsiResult<&RsiValue> {
		Ok(&self.as_pair()?.head)
	}

	pub fn tail(&self) -> RsiResult<&RsiValue> {
		Ok(&self.as_pair()?.tail)
	}

	pub fn iter(&self) -> RsiListIter {
		RsiListIter { rest: self.clone() }
	}

	/// elements of a proper list, `None` for anything improper
	pub fn to_vec(&self) -> Option<Vec<RsiValue>> {
		let mut iter = self.iter();
		let out = iter.by_ref().collect();
		if iter.rest().is_nil() {
			Some(out)
		} else {
			None
		}
	}

	/// length of a proper list, `None` for anything improper
	pub fn list_len(&self) -> Option<usize> {
		let mut iter = self.iter();
		let len = iter.by_ref().count();
		if iter.rest().is_nil() {
			Some(len)
		} else {
			None
		}
	}
}

/// walks the heads of a chain of pairs
pub struct RsiListIter {
	rest: RsiValue,
}

impl RsiListIter {
	/// whatever ended the chain, `Nil` for a proper list
	pub fn rest(&self) -> &RsiValue {
		&self.rest
	}
}

impl Iterator for RsiListIter {
	type Item = RsiValue;
	fn next(&mut self) -> Option<RsiValue> {
		let (head, tail) = match &self.rest {
			RsiValue::Pair(pair) => (pair.head.clone(), pair.tail.clone()),
			_ => return None,
		};
		self.rest = tail;
		Some(head)
	}
}

/// structural equality, what `equal?` uses
impl PartialEq for RsiValue {
	fn eq(&self, other: &Self) -> bool {
		let (mut a, mut b) = (self, other);
		loop {
			match (a, b) {
				(RsiValue::Pair(x), RsiValue::Pair(y)) => {
					if Rc::ptr_eq(x, y) {
						return true
					}
					if x.head != y.head {
						return false
					}
					a = &x.tail;
					b = &y.tail;
				},
				(RsiValue::Symbol(x), RsiValue::Symbol(y)) => return x == y,
				(RsiValue::Number(x), RsiValue::Number(y)) => return x == y,
				(RsiValue::String(x), RsiValue::String(y)) => return x == y,
				(RsiValue::Bool(x), RsiValue::Bool(y)) => return x == y,
				(RsiValue::Nil, RsiValue::Nil) => return true,
				(RsiValue::Native(x), RsiValue::Native(y)) => return x.name == y.name,
				(RsiValue::Closure(x), RsiValue::Closure(y)) => return Rc::ptr_eq(x, y),
				_ => return false,
			}
		}
	}
}

impl fmt::Display for RsiValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RsiValue::Symbol(v) => write!(f, "{}", v),
			RsiValue::Number(v) => write!(f, "{}", v),
			RsiValue::String(v) => write!(f, "{:?}", v),
			RsiValue::Bool(v) => f.write_str(if *v {"#t"} else {"#f"}),
			RsiValue::Nil => f.write_str("()"),
			RsiValue::Native(v) => write!(f, "<native {}>", v.name),
			RsiValue::Closure(data) => write!(f, "<lambda ({})>", data.params.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")),
			RsiValue::Pair(pair) => {
				f.write_str("(")?;
				let mut pair = pair;
				loop {
					write!(f, "{}", pair.head)?;
					match &pair.tail {
						RsiValue::Nil => break,
						RsiValue::Pair(next) => {
							f.write_str(" ")?;
							pair = next;
						},
						other => {
							write!(f, " . {}", other)?;
							break
						},
					}
				}
				f.write_str(")")
			},
		}
	}
}

impl fmt::Debug for RsiValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self)
	}
}
