//! Tagged value representation.
//!
//! A `Value` is one machine word in spirit: a discriminated reference to a
//! heap cell, an interned atom, a small integer, or a raw function
//! reference. The arena-index encoding stays behind this module and the
//! heap; callers only ever pattern-match the variants.
//!
//! Key design principles:
//! - `Value` is `Copy`; cells own structure, values are just references.
//! - Atom equality is interning identity, number equality is value equality,
//!   everything else is whole-value identity.
//! - An actor and a plain pair share the cell arena; the `Actor` variant is
//!   the "this cell is addressable and receives messages" view of a cell.

use crate::actor::{Config, Event};
use crate::heap::Heap;

/// Behavior code reference. Applied to `(config, event)` when a message is
/// delivered to an actor whose `first` slot carries it.
pub type Beh = fn(&mut Config, &Event);

/// Binary host operation. These travel inside `foldl`-style messages, so
/// they need a `Value`-level representation alongside behaviors.
pub type BinFn = fn(&Heap, Value, Value) -> Value;

/// A raw function reference. Two calling conventions share one tag, the way
/// the original design packed any code address into a tagged word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Func {
    /// An actor behavior.
    Beh(Beh),
    /// A binary operation over values.
    Bin(BinFn),
}

/// Index of a cell in the heap arena. Only the heap constructs these.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellRef(pub(crate) u32);

/// Identity of an interned atom. Two atoms with equal byte content share
/// the same `AtomRef` for the life of the process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AtomRef(pub(crate) u32);

/// The uniform value word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Value {
    /// The distinguished empty-list sentinel. Never collected.
    Nil,
    /// Host-level truth singletons. These are not the Kernel booleans
    /// (which are actors); they are the raw values behaviors compare with.
    True,
    False,
    /// A pair cell.
    Cell(CellRef),
    /// An actor, or an opaque two-slot object, backed by a cell.
    Actor(CellRef),
    /// An interned atom.
    Atom(AtomRef),
    /// A machine-word integer. `Int(-1)` doubles as the end-of-input
    /// indicator at the character level.
    Int(i64),
    /// A raw function reference.
    Func(Func),
}

impl Value {
    pub fn is_cell(self) -> bool {
        matches!(self, Value::Cell(_))
    }

    pub fn is_actor(self) -> bool {
        matches!(self, Value::Actor(_))
    }

    pub fn is_atom(self) -> bool {
        matches!(self, Value::Atom(_))
    }

    pub fn is_number(self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_func(self) -> bool {
        matches!(self, Value::Func(_))
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Behavior reference, if this is a `Func(Beh(_))`.
    pub fn as_beh(self) -> Option<Beh> {
        match self {
            Value::Func(Func::Beh(b)) => Some(b),
            _ => None,
        }
    }

    /// Binary operation reference, if this is a `Func(Bin(_))`.
    pub fn as_bin(self) -> Option<BinFn> {
        match self {
            Value::Func(Func::Bin(f)) => Some(f),
            _ => None,
        }
    }
}

/// Shorthand for wrapping a behavior as a value.
pub fn beh_ref(beh: Beh) -> Value {
    Value::Func(Func::Beh(beh))
}

/// Shorthand for wrapping a binary host operation as a value.
pub fn bin_ref(f: BinFn) -> Value {
    Value::Func(Func::Bin(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_small() {
        // Two words: discriminant + widest payload (i64 / fn pointer).
        assert!(std::mem::size_of::<Value>() <= 16);
    }

    #[test]
    fn test_singletons_are_distinct() {
        assert_ne!(Value::Nil, Value::True);
        assert_ne!(Value::Nil, Value::False);
        assert_ne!(Value::True, Value::False);
        assert_ne!(Value::False, Value::Int(0));
    }

    #[test]
    fn test_number_identity() {
        assert_eq!(Value::Int(42), Value::Int(42));
        assert_ne!(Value::Int(42), Value::Int(-42));
    }
}
