//! Name -> value mapping, plus the read-only built-in table consulted on a
//! miss. `UNDEFINED` is never stored: a miss against both tables is reported
//! to the caller as `None`, and the caller decides (by pass number) whether
//! that is a deferred forward reference or a hard "undefined symbol" error.

use crate::strtab::StrTable;
use crate::value::*;

pub struct SymbolTable {
    table: StrTable<Value>,
}

impl SymbolTable {
    pub fn new(case_sensitive: bool) -> Self {
        SymbolTable { table: StrTable::new(case_sensitive) }
    }

    /// Defines `name` on pass 1. Returns `false` if already defined (the
    /// caller reports `DuplicateLabel`).
    pub fn define(&mut self, name: &str, value: Value) -> bool {
        if self.table.contains(name) {
            return false;
        }
        self.table.insert(name, value);
        true
    }

    /// Updates `name`'s value on passes after the first. Returns `true` if
    /// the value differs from what was stored (the caller sets
    /// `pass_needed`).
    pub fn update(&mut self, name: &str, value: Value) -> bool {
        match self.table.get_mut(name) {
            Some(slot) => {
                let changed = *slot != value;
                *slot = value;
                changed
            }
            None => {
                self.table.insert(name, value);
                true
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.table.get(name).copied().or_else(|| builtin(name, &self.table))
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    pub fn case_sensitive(&self) -> bool {
        self.table.case_sensitive()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.table.iter().map(|(n, v)| (n, *v))
    }

    /// Overwrites `CURRENT_PASS`, the one built-in that the driver mutates
    /// as passes proceed (everything else in the built-in table is static).
    pub fn set_current_pass(&mut self, pass: Value) {
        self.table.insert("CURRENT_PASS", pass);
    }
}

/// The read-only built-in table, consulted only when the user table misses.
/// `CURRENT_PASS` starts at 1 but is shadowed into the real table by
/// `set_current_pass` once the driver begins a pass, so this branch only
/// fires before that first write.
fn builtin(name: &str, table: &StrTable<Value>) -> Option<Value> {
    let key = if table.case_sensitive() { name.to_owned() } else { name.to_uppercase() };
    Some(match key.as_str() {
        "CURRENT_PASS" => 1,
        "FALSE" => 0,
        "TRUE" => 1,
        "MATH_E" => 2,
        "MATH_PI" => 3,
        "MATH_TAU" => 6,
        "INT8_MIN" => INT8_MIN,
        "INT8_MAX" => INT8_MAX,
        "UINT8_MIN" => UINT8_MIN,
        "UINT8_MAX" => UINT8_MAX,
        "INT16_MIN" => INT16_MIN,
        "INT16_MAX" => INT16_MAX,
        "UINT16_MIN" => UINT16_MIN,
        "UINT16_MAX" => UINT16_MAX,
        "INT24_MIN" => INT24_MIN,
        "INT24_MAX" => INT24_MAX,
        "UINT24_MIN" => UINT24_MIN,
        "UINT24_MAX" => UINT24_MAX,
        "INT32_MIN" => INT32_MIN,
        "INT32_MAX" => INT32_MAX,
        "UINT32_MIN" => UINT32_MIN,
        "UINT32_MAX" => UINT32_MAX,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_then_redefine_fails() {
        let mut t = SymbolTable::new(false);
        assert!(t.define("foo", 1));
        assert!(!t.define("foo", 2));
        assert_eq!(t.lookup("foo"), Some(1));
    }

    #[test]
    fn update_reports_change() {
        let mut t = SymbolTable::new(false);
        t.define("foo", 1);
        assert!(!t.update("foo", 1));
        assert!(t.update("foo", 2));
        assert_eq!(t.lookup("foo"), Some(2));
    }

    #[test]
    fn falls_back_to_builtins() {
        let t = SymbolTable::new(false);
        assert_eq!(t.lookup("true"), Some(1));
        assert_eq!(t.lookup("UINT8_MAX"), Some(255));
        assert_eq!(t.lookup("nope"), None);
    }

    #[test]
    fn user_symbol_shadows_builtin() {
        let mut t = SymbolTable::new(false);
        t.define("TRUE", 42);
        assert_eq!(t.lookup("true"), Some(42));
    }
}
