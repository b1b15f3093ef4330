//! Atom interning.
//!
//! Append-only string table: an atom's identity is its table index, so atom
//! equality reduces to index equality. Entries are never removed during the
//! life of the process.

use crate::value::AtomRef;
use std::collections::HashMap;

#[derive(Default)]
pub(crate) struct AtomTable {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl AtomTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn intern(&mut self, name: &str) -> AtomRef {
        if let Some(&ix) = self.index.get(name) {
            return AtomRef(ix);
        }
        let ix = u32::try_from(self.names.len()).expect("atom table overflow");
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), ix);
        AtomRef(ix)
    }

    pub(crate) fn name(&self, atom: AtomRef) -> &str {
        &self.names[atom.0 as usize]
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_identity() {
        let mut t = AtomTable::new();
        let a = t.intern("foo");
        let b = t.intern("foo");
        let c = t.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(t.name(a), "foo");
        assert_eq!(t.name(c), "bar");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_empty_name_interns() {
        let mut t = AtomTable::new();
        let a = t.intern("");
        assert_eq!(t.name(a), "");
        assert_eq!(a, t.intern(""));
    }
}
