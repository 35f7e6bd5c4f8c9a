use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{RsiError, RsiErrorType, RsiResult};
use crate::symbol::{Symbol, intern};
use crate::value::RsiValue;

/// one frame of bindings plus the frame it was created in
pub struct RsiScope {
	data: RefCell<HashMap<Symbol, RsiValue>>,
	parent: Option<RsiEnv>,
}

/// shared handle to a frame, closures keep their defining frame alive through it
#[derive(Clone)]
pub struct RsiEnv(Rc<RsiScope>);

impl RsiEnv {
	/// an empty frame chained to `parent`, `None` makes a global frame
	pub fn new_frame(parent: Option<&RsiEnv>) -> Self {
		RsiEnv(Rc::new(RsiScope {
			data: RefCell::new(HashMap::new()),
			parent: parent.cloned(),
		}))
	}

	/// a frame binding each parameter to the argument in the same position
	pub fn extend(params: &[Symbol], args: Vec<RsiValue>, parent: &RsiEnv) -> RsiResult<Self> {
		if params.len() != args.len() {
			return Err(RsiError::new(RsiErrorType::ArityMismatch((Some(params.len()), Some(params.len())), args.len())))
		}
		let data = params.iter().cloned().zip(args).collect();
		Ok(RsiEnv(Rc::new(RsiScope {
			data: RefCell::new(data),
			parent: Some(parent.clone()),
		})))
	}

	pub fn parent(&self) -> Option<&RsiEnv> {
		self.0.parent.as_ref()
	}

	/// introduces or overwrites a binding in this frame only
	pub fn bind(&self, sym: Symbol, value: RsiValue) {
		self.0.data.borrow_mut().insert(sym, value);
	}

	pub fn bind_name(&self, name: &str, value: RsiValue) {
		self.bind(intern(name), value);
	}

	fn get_local(&self, sym: &Symbol) -> Option<RsiValue> {
		self.0.data.borrow().get(sym).cloned()
	}

	pub fn contains_local(&self, sym: &Symbol) -> bool {
		self.0.data.borrow().contains_key(sym)
	}

	pub fn lookup(&self, sym: &Symbol) -> RsiResult<RsiValue> {
		let mut scope = self;
		loop {
			if let Some(v) = scope.get_local(sym) {
				return Ok(v)
			}
			match scope.parent() {
				Some(parent) => scope = parent,
				None => return Err(RsiError::new(RsiErrorType::UnboundSymbol(sym.to_string()))),
			}
		}
	}

	/// innermost frame binding `sym`, or the global frame when nothing does
	pub fn find_frame(&self, sym: &Symbol) -> RsiEnv {
		let mut scope = self;
		loop {
			if scope.contains_local(sym) {
				return scope.clone()
			}
			match scope.parent() {
				Some(parent) => scope = parent,
				None => return scope.clone(),
			}
		}
	}

	/// bindings of this frame only, sorted by name
	pub fn bindings(&self) -> Vec<(Symbol, RsiValue)> {
		let mut out: Vec<_> = self.0.data
			.borrow()
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect();
		out.sort_by(|a, b| a.0.name().cmp(b.0.name()));
		out
	}

	pub fn ptr_eq(&self, other: &RsiEnv) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for RsiEnv {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// values can hold closures pointing back at this frame, only names are printed
		let mut tuple = f.debug_tuple("RsiEnv");
		for (k, _) in self.bindings() {
			tuple.field(&k.name());
		}
		tuple.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_walks_outward() {
		let global = RsiEnv::new_frame(None);
		global.bind_name("x", RsiValue::Number(1.0));
		global.bind_name("y", RsiValue::Number(2.0));
		let inner = RsiEnv::new_frame(Some(&global));
		inner.bind_name("x", RsiValue::Number(10.0));
		assert_eq!(inner.lookup(&intern("x")).unwrap(), RsiValue::Number(10.0));
		assert_eq!(inner.lookup(&intern("y")).unwrap(), RsiValue::Number(2.0));
		assert_eq!(global.lookup(&intern("x")).unwrap(), RsiValue::Number(1.0));
	}

	#[test]
	fn unbound_names_the_symbol() {
		let env = RsiEnv::new_frame(None);
		let err = env.lookup(&intern("nope")).unwrap_err();
		assert_eq!(err.kind(), &RsiErrorType::UnboundSymbol("NOPE".to_string()));
	}

	#[test]
	fn bind_only_touches_current_frame() {
		let global = RsiEnv::new_frame(None);
		global.bind_name("x", RsiValue::Number(1.0));
		let inner = RsiEnv::new_frame(Some(&global));
		inner.bind_name("x", RsiValue::Number(2.0));
		assert_eq!(global.lookup(&intern("x")).unwrap(), RsiValue::Number(1.0));
	}

	#[test]
	fn find_frame_falls_back_to_global() {
		let global = RsiEnv::new_frame(None);
		let middle = RsiEnv::new_frame(Some(&global));
		middle.bind_name("m", RsiValue::Nil);
		let inner = RsiEnv::new_frame(Some(&middle));
		assert!(inner.find_frame(&intern("m")).ptr_eq(&middle));
		assert!(inner.find_frame(&intern("unbound-anywhere")).ptr_eq(&global));
	}

	#[test]
	fn extend_pairs_positionally() {
		let global = RsiEnv::new_frame(None);
		let params = vec![intern("a"), intern("b")];
		let env = RsiEnv::extend(&params, vec![RsiValue::Number(1.0), RsiValue::Number(2.0)], &global).unwrap();
		assert_eq!(env.lookup(&intern("b")).unwrap(), RsiValue::Number(2.0));
		assert!(env.parent().unwrap().ptr_eq(&global));

		let err = RsiEnv::extend(&params, vec![RsiValue::Number(1.0)], &global).unwrap_err();
		assert_eq!(err.kind(), &RsiErrorType::ArityMismatch((Some(2), Some(2)), 1));
	}
}
