use std::process;
use std::rc::Rc;

use crate::MAX_EVAL_DEPTH;
use crate::error::{RsiError, RsiErrorType, RsiResult};
use crate::scope::RsiEnv;
use crate::symbol::{Symbol, intern, symbols};
use crate::value::{RsiClosure, RsiValue};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Form {
	Quote, Define, Set, If, Begin, Lambda, Let, Quit, Vars,
}

impl Form {
	fn from_symbol(sym: &Symbol) -> Option<Self> {
		// symbols are already folded to upper case
		Some(match sym.name() {
			"QUOTE"  => Form::Quote,
			"DEFINE" => Form::Define,
			"SET!"   => Form::Set,
			"IF"     => Form::If,
			"BEGIN"  => Form::Begin,
			"LAMBDA" => Form::Lambda,
			"LET"    => Form::Let,
			"QUIT"   => Form::Quit,
			":VARS"  => Form::Vars,
			_ => return None,
		})
	}
}

/// elements of a proper list, or a malformed `form` failure
fn proper(list: &RsiValue, form: &'static str) -> RsiResult<Vec<RsiValue>> {
	list.to_vec().ok_or_else(|| RsiError::malformed(form, format!("{} is not a proper list", list)))
}

/// evaluates all but the last expression, handing the last one back for the caller's loop
fn body_tail(body: &[RsiValue], env: &RsiEnv, depth: usize) -> RsiResult<Option<RsiValue>> {
	match body.split_last() {
		Some((last, rest)) => {
			for exp in rest {
				eval_at(exp, env, depth + 1)?;
			}
			Ok(Some(last.clone()))
		},
		None => Ok(None),
	}
}

fn eval_args(args: &RsiValue, env: &RsiEnv, depth: usize) -> RsiResult<Vec<RsiValue>> {
	let mut iter = args.iter();
	let mut res = vec![];
	for x in iter.by_ref() {
		res.push(eval_at(&x, env, depth + 1)?);
	}
	match iter.rest() {
		RsiValue::Nil => Ok(res),
		other => Err(RsiError::new(RsiErrorType::NotAPair(other.to_string()))),
	}
}

fn make_closure(params: &RsiValue, body: &RsiValue, env: &RsiEnv, form: &'static str) -> RsiResult<RsiValue> {
	let mut names = vec![];
	let mut iter = params.iter();
	for p in iter.by_ref() {
		match p {
			RsiValue::Symbol(sym) => names.push(sym),
			other => return Err(RsiError::malformed(form, format!("parameter {} is not a symbol", other))),
		}
	}
	if !iter.rest().is_nil() {
		return Err(RsiError::malformed(form, format!("parameter list {} is not a proper list", params)))
	}
	Ok(RsiValue::Closure(Rc::new(RsiClosure {
		params: names,
		body: proper(body, form)?,
		env: env.clone(),
	})))
}

// (define name expr) or (define (name params…) body…)
fn define(args: &RsiValue, env: &RsiEnv, depth: usize) -> RsiResult<()> {
	let (target, rest) = match args {
		RsiValue::Pair(pair) => (&pair.head, &pair.tail),
		_ => return Err(RsiError::malformed("define", "missing name")),
	};
	match target {
		RsiValue::Symbol(name) => {
			let rest = proper(rest, "define")?;
			if rest.len() != 1 {
				return Err(RsiError::malformed("define", format!("expected a single value for {}, got {}", name, rest.len())))
			}
			let value = eval_at(&rest[0], env, depth + 1)?;
			env.bind(name.clone(), value);
		},
		RsiValue::Pair(signature) => {
			let name = signature.head.as_symbol()
				.ok_or_else(|| RsiError::malformed("define", format!("procedure name {} is not a symbol", signature.head)))?;
			let value = make_closure(&signature.tail, rest, env, "define")?;
			env.bind(name.clone(), value);
		},
		other => return Err(RsiError::malformed("define", format!("can't define {}", other))),
	}
	Ok(())
}

fn set(args: &RsiValue, env: &RsiEnv, depth: usize) -> RsiResult<RsiValue> {
	let parts = proper(args, "set!")?;
	let (name, exp) = match parts.as_slice() {
		[RsiValue::Symbol(name), exp] => (name, exp),
		[other, _] => return Err(RsiError::malformed("set!", format!("target {} is not a symbol", other))),
		_ => return Err(RsiError::malformed("set!", format!("expected a target and a value, got {} parts", parts.len()))),
	};
	let value = eval_at(exp, env, depth + 1)?;
	let frame = env.find_frame(name);
	if !frame.contains_local(name) {
		log::debug!("set! of unbound {} binds it globally", name);
	}
	frame.bind(name.clone(), value.clone());
	Ok(value)
}

// (let ((n1 v1) (n2 v2) …) body…)  =>  ((lambda (n1 n2 …) body…) v1 v2 …)
fn desugar_let(args: &RsiValue) -> RsiResult<RsiValue> {
	let parts = proper(args, "let")?;
	let (bindings, body) = parts.split_first()
		.ok_or_else(|| RsiError::malformed("let", "missing binding list"))?;
	let mut names = vec![];
	let mut values = vec![];
	for binding in proper(bindings, "let")? {
		match &binding {
			RsiValue::Pair(_) => match proper(&binding, "let")?.as_slice() {
				[name @ RsiValue::Symbol(_), value] => {
					names.push(name.clone());
					values.push(value.clone());
				},
				_ => return Err(RsiError::malformed("let", format!("binding {} needs a name and a value", binding))),
			},
			RsiValue::Nil => return Err(RsiError::malformed("let", "empty binding")),
			other => return Err(RsiError::malformed("let", format!("binding {} is not a list", other))),
		}
	}
	let lambda = RsiValue::list_with_tail(
		vec![RsiValue::Symbol(intern("lambda")), RsiValue::list(names)],
		RsiValue::list(body.to_vec()),
	);
	Ok(RsiValue::cons(lambda, RsiValue::list(values)))
}

/// evaluates `exp` in `env`
///
/// tail positions (`if` branches, the last expression of `begin`, closure bodies)
/// replace the current expression and environment instead of recursing, so tail
/// calls run in constant stack space. the other nested evaluations count towards
/// `MAX_EVAL_DEPTH`, past which evaluation fails instead of overflowing the stack
pub fn eval(exp: &RsiValue, env: &RsiEnv) -> RsiResult<RsiValue> {
	eval_at(exp, env, 0)
}

fn eval_at(exp: &RsiValue, env: &RsiEnv, depth: usize) -> RsiResult<RsiValue> {
	if depth >= MAX_EVAL_DEPTH {
		return Err(RsiError::new(RsiErrorType::RecursionTooDeep(MAX_EVAL_DEPTH)))
	}
	let mut exp = exp.clone();
	let mut env = env.clone();
	loop {
		log::debug!("eval: {}", exp);
		let pair = match &exp {
			RsiValue::Symbol(sym) => return env.lookup(sym),
			RsiValue::Pair(pair) => pair.clone(),
			other => return Ok(other.clone()),
		};
		let args = &pair.tail;
		if let Some(form) = pair.head.as_symbol().and_then(Form::from_symbol) {
			match form {
				Form::Quote => return match proper(args, "quote")?.as_slice() {
					[quoted] => Ok(quoted.clone()),
					other => Err(RsiError::malformed("quote", format!("expected one expression, got {}", other.len()))),
				},
				Form::Define => {
					define(args, &env, depth)?;
					return Ok(RsiValue::Symbol(intern("ok")))
				},
				Form::Set => return set(args, &env, depth),
				Form::If => {
					let parts = proper(args, "if")?;
					let (test, consequent, alternative) = match parts.as_slice() {
						[test, consequent] => (test, consequent, None),
						[test, consequent, alternative] => (test, consequent, Some(alternative)),
						_ => return Err(RsiError::malformed("if", format!("expected a test and one or two branches, got {} parts", parts.len()))),
					};
					exp = if eval_at(test, &env, depth + 1)?.is_truthy() {
						consequent.clone()
					} else {
						match alternative {
							Some(v) => v.clone(),
							None => return Ok(RsiValue::Nil),
						}
					};
				},
				Form::Begin => match body_tail(&proper(args, "begin")?, &env, depth)? {
					Some(last) => exp = last,
					None => return Ok(RsiValue::Nil),
				},
				Form::Lambda => {
					let (params, body) = match args {
						RsiValue::Pair(pair) => (&pair.head, &pair.tail),
						_ => return Err(RsiError::malformed("lambda", "missing parameter list")),
					};
					return make_closure(params, body, &env, "lambda")
				},
				Form::Let => exp = desugar_let(args)?,
				Form::Quit => {
					log::info!("quit");
					process::exit(0)
				},
				Form::Vars => {
					for (k, v) in env.bindings() {
						log::info!("{}: {}", k, v);
					}
					log::info!("{} symbols interned", symbols().len());
					return Ok(RsiValue::Nil)
				},
			}
			continue
		}

		log::debug!("procedure call {}", exp);
		let procedure = eval_at(&pair.head, &env, depth + 1)?;
		let arg_vals = eval_args(args, &env, depth)?;
		match procedure {
			RsiValue::Native(native) => return (native.func)(&arg_vals),
			RsiValue::Closure(closure) => {
				let frame = RsiEnv::extend(&closure.params, arg_vals, &closure.env)?;
				match body_tail(&closure.body, &frame, depth)? {
					Some(last) => {
						exp = last;
						env = frame;
					},
					None => return Ok(RsiValue::Nil),
				}
			},
			other => return Err(RsiError::new(RsiErrorType::NotAProcedure(other.to_string()))),
		}
	}
}
