//! symbol interning map
//!
//! every name is folded to upper case before lookup, so `abc` and `ABC` are the
//! same symbol. symbols live as long as the process, the table never forgets one.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

/// a canonical symbol, compared and hashed by identity
#[derive(Clone)]
pub struct Symbol(Arc<str>);

impl Symbol {
	pub fn name(&self) -> &str {
		&self.0
	}
}

impl PartialEq for Symbol {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}
impl Eq for Symbol {}

impl Hash for Symbol {
	fn hash<H: Hasher>(&self, state: &mut H) {
		(Arc::as_ptr(&self.0) as *const u8 as usize).hash(state)
	}
}

impl fmt::Debug for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Symbol({})", self.0)
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

pub struct SymbolTable {
	data: Mutex<HashMap<String, Symbol>>,
}

impl fmt::Debug for SymbolTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut tuple = f.debug_tuple("SymbolTable");
		if let Ok(data) = self.data.lock() {
			for k in data.keys() {
				tuple.field(k);
			}
		}
		tuple.finish()
	}
}

impl SymbolTable {
	pub fn new() -> Self {
		Self {
			data: Mutex::new(HashMap::with_capacity(1024)),
		}
	}
	pub fn intern(&self, name: &str) -> Symbol {
		let name = name.to_uppercase();
		// the map is append-only, a poisoned lock still holds a consistent table
		let mut data = match self.data.lock() {
			Ok(v) => v,
			Err(poisoned) => poisoned.into_inner(),
		};
		match data.get(&name) {
			Some(sym) => sym.clone(),
			None => {
				let sym = Symbol(Arc::from(name.as_str()));
				data.insert(name, sym.clone());
				sym
			},
		}
	}
	pub fn len(&self) -> usize {
		match self.data.lock() {
			Ok(v) => v.len(),
			Err(poisoned) => poisoned.into_inner().len(),
		}
	}
}

impl Default for SymbolTable {
	fn default() -> Self {
		Self::new()
	}
}

/// the process-wide table, created on first use
pub fn symbols() -> &'static SymbolTable {
	static TABLE: OnceLock<SymbolTable> = OnceLock::new();
	TABLE.get_or_init(SymbolTable::new)
}

pub fn intern(name: &str) -> Symbol {
	symbols().intern(name)
}
