//! the default global environment
//!
//! arithmetic folds left over f64, comparisons chain pairwise and stop at the
//! first pair that fails

use std::f64::consts::PI;
use std::ops::RangeBounds;

use crate::error::{RsiError, RsiErrorType, RsiResult};
use crate::scope::RsiEnv;
use crate::utils::range_to_dual;
use crate::value::{RsiNative, RsiValue};

fn check_arity(args: &[RsiValue], range: impl RangeBounds<usize>) -> RsiResult<()> {
	if range.contains(&args.len()) {
		Ok(())
	} else {
		Err(RsiError::new(RsiErrorType::ArityMismatch(range_to_dual(range), args.len())))
	}
}

fn numbers(args: &[RsiValue]) -> RsiResult<Vec<f64>> {
	args.iter().map(RsiValue::as_number).collect()
}

/// `(op)` is `identity`, otherwise a left fold
macro_rules! fold_numbers {
	($identity:expr, |$a:ident, $b:ident| $body:expr) => {
		|args| Ok(RsiValue::Number(numbers(args)?.into_iter().fold($identity, |$a, $b| $body)))
	};
}

/// one operand applies `unary`, more fold the rest into the first
macro_rules! reduce_numbers {
	(|$x:ident| $unary:expr, |$a:ident, $b:ident| $body:expr) => {
		|args| match numbers(args)?.split_first() {
			Some((&$x, [])) => Ok(RsiValue::Number($unary)),
			Some((&first, rest)) => Ok(RsiValue::Number(rest.iter().fold(first, |$a, &$b| $body))),
			None => Err(RsiError::new(RsiErrorType::ArityMismatch(range_to_dual(1..), 0))),
		}
	};
}

/// `(op a b c …)` holds when every adjacent pair does
macro_rules! ensure_tonicity {
	(|$a:ident, $b:ident| $cmp:expr) => {
		|args| {
			check_arity(args, 1..)?;
			let mut prev = args[0].as_number()?;
			for arg in &args[1..] {
				let next = arg.as_number()?;
				let ($a, $b) = (prev, next);
				if !($cmp) {
					return Ok(RsiValue::Bool(false))
				}
				prev = next;
			}
			Ok(RsiValue::Bool(true))
		}
	};
}

pub fn default_env() -> RsiEnv {
	let env = RsiEnv::new_frame(None);
	macro_rules! insert {
		($name:expr, $func:expr) => {
			env.bind_name($name, RsiValue::Native(RsiNative { name: $name, func: $func }))
		};
	}

	insert!("+", fold_numbers!(0.0, |a, b| a + b));
	insert!("*", fold_numbers!(1.0, |a, b| a * b));
	insert!("-", reduce_numbers!(|x| -x, |a, b| a - b));
	insert!("/", reduce_numbers!(|x| 1.0 / x, |a, b| a / b));

	insert!("<",  ensure_tonicity!(|a, b| a < b));
	insert!("<=", ensure_tonicity!(|a, b| a <= b));
	insert!(">",  ensure_tonicity!(|a, b| a > b));
	insert!(">=", ensure_tonicity!(|a, b| a >= b));
	insert!("=",  ensure_tonicity!(|a, b| a == b));

	insert!("number?", |args| {
		check_arity(args, 1..=1)?;
		Ok(RsiValue::Bool(matches!(args[0], RsiValue::Number(_))))
	});
	insert!("pair?", |args| {
		check_arity(args, 1..=1)?;
		Ok(RsiValue::Bool(args[0].is_pair()))
	});
	insert!("null?", |args| {
		check_arity(args, 1..=1)?;
		Ok(RsiValue::Bool(args[0].is_nil()))
	});
	insert!("equal?", |args| {
		check_arity(args, 2..=2)?;
		Ok(RsiValue::Bool(args[0] == args[1]))
	});

	insert!("cons", |args| {
		check_arity(args, 2..=2)?;
		Ok(RsiValue::cons(args[0].clone(), args[1].clone()))
	});
	insert!("car", |args| {
		check_arity(args, 1..=1)?;
		Ok(args[0].head()?.clone())
	});
	insert!("cdr", |args| {
		check_arity(args, 1..=1)?;
		Ok(args[0].tail()?.clone())
	});

	env.bind_name("pi", RsiValue::Number(PI));
	env.bind_name("nil", RsiValue::Nil);
	env
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::symbol::intern;

	fn call(name: &str, args: Vec<RsiValue>) -> RsiResult<RsiValue> {
		match default_env().lookup(&intern(name))? {
			RsiValue::Native(native) => (native.func)(&args),
			other => panic!("{} is not native: {}", name, other),
		}
	}

	fn nums(values: &[f64]) -> Vec<RsiValue> {
		values.iter().map(|v| RsiValue::Number(*v)).collect()
	}

	#[test]
	fn arithmetic() {
		assert_eq!(call("+", nums(&[30.0, 40.0])).unwrap(), RsiValue::Number(70.0));
		assert_eq!(call("+", vec![]).unwrap(), RsiValue::Number(0.0));
		assert_eq!(call("*", vec![]).unwrap(), RsiValue::Number(1.0));
		assert_eq!(call("*", nums(&[2.0, 3.0, 4.0])).unwrap(), RsiValue::Number(24.0));
		assert_eq!(call("-", nums(&[10.0, 1.0, 2.0])).unwrap(), RsiValue::Number(7.0));
		assert_eq!(call("-", nums(&[5.0])).unwrap(), RsiValue::Number(-5.0));
		assert_eq!(call("/", nums(&[12.0, 2.0, 3.0])).unwrap(), RsiValue::Number(2.0));
		assert_eq!(call("/", nums(&[4.0])).unwrap(), RsiValue::Number(0.25));
	}

	#[test]
	fn arithmetic_failures() {
		let err = call("-", vec![]).unwrap_err();
		assert_eq!(err.kind(), &RsiErrorType::ArityMismatch((Some(1), None), 0));
		assert_eq!(err.to_string(), "Argument count mismatch: expected at least 1 argument, got 0");
		assert!(matches!(call("/", vec![]).unwrap_err().kind(), RsiErrorType::ArityMismatch(..)));
		let err = call("+", vec![RsiValue::Number(1.0), RsiValue::string("a")]).unwrap_err();
		assert_eq!(err.kind(), &RsiErrorType::NotANumber("\"a\"".to_string()));
	}

	#[test]
	fn comparisons_chain() {
		assert_eq!(call("<", nums(&[1.0, 2.0, 3.0])).unwrap(), RsiValue::Bool(true));
		assert_eq!(call("<", nums(&[1.0, 3.0, 2.0])).unwrap(), RsiValue::Bool(false));
		assert_eq!(call("<=", nums(&[1.0, 1.0, 2.0])).unwrap(), RsiValue::Bool(true));
		assert_eq!(call(">", nums(&[3.0, 2.0, 1.0])).unwrap(), RsiValue::Bool(true));
		assert_eq!(call(">=", nums(&[3.0, 3.0, 4.0])).unwrap(), RsiValue::Bool(false));
		assert_eq!(call("=", nums(&[2.0, 2.0, 2.0])).unwrap(), RsiValue::Bool(true));
		assert_eq!(call("=", nums(&[7.0])).unwrap(), RsiValue::Bool(true));
		assert!(matches!(call("=", vec![]).unwrap_err().kind(), RsiErrorType::ArityMismatch(..)));
	}

	#[test]
	fn comparisons_stop_at_first_failure() {
		// the string after the failing pair is never inspected
		let args = vec![RsiValue::Number(2.0), RsiValue::Number(1.0), RsiValue::string("x")];
		assert_eq!(call("<", args).unwrap(), RsiValue::Bool(false));
		let args = vec![RsiValue::Number(1.0), RsiValue::string("x")];
		assert!(matches!(call("<", args).unwrap_err().kind(), RsiErrorType::NotANumber(_)));
	}

	#[test]
	fn predicates() {
		assert_eq!(call("number?", nums(&[1.0])).unwrap(), RsiValue::Bool(true));
		assert_eq!(call("number?", vec![RsiValue::string("1")]).unwrap(), RsiValue::Bool(false));
		assert_eq!(call("null?", vec![RsiValue::Nil]).unwrap(), RsiValue::Bool(true));
		assert_eq!(call("null?", nums(&[0.0])).unwrap(), RsiValue::Bool(false));
		let pair = RsiValue::cons(RsiValue::Number(1.0), RsiValue::Nil);
		assert_eq!(call("pair?", vec![pair.clone()]).unwrap(), RsiValue::Bool(true));
		assert_eq!(call("pair?", vec![RsiValue::Nil]).unwrap(), RsiValue::Bool(false));
		let same = RsiValue::list(nums(&[1.0, 2.0]));
		assert_eq!(call("equal?", vec![same.clone(), RsiValue::list(nums(&[1.0, 2.0]))]).unwrap(), RsiValue::Bool(true));
		assert_eq!(call("equal?", vec![same, pair]).unwrap(), RsiValue::Bool(false));
		assert!(matches!(call("null?", vec![]).unwrap_err().kind(), RsiErrorType::ArityMismatch(..)));
	}

	#[test]
	fn pairs() {
		let pair = call("cons", nums(&[1.0, 2.0])).unwrap();
		assert_eq!(pair.to_string(), "(1 . 2)");
		assert_eq!(call("car", vec![pair.clone()]).unwrap(), RsiValue::Number(1.0));
		assert_eq!(call("cdr", vec![pair]).unwrap(), RsiValue::Number(2.0));
		assert_eq!(call("car", vec![RsiValue::Nil]).unwrap_err().kind(), &RsiErrorType::NotAPair("()".to_string()));
		assert!(matches!(call("cdr", nums(&[3.0])).unwrap_err().kind(), RsiErrorType::NotAPair(_)));
	}

	#[test]
	fn constants() {
		let env = default_env();
		assert_eq!(env.lookup(&intern("pi")).unwrap(), RsiValue::Number(PI));
		assert_eq!(env.lookup(&intern("nil")).unwrap(), RsiValue::Nil);
	}
}
