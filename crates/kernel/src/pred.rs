//! Host equality predicates.
//!
//! `eq` is operational identity: actors with the same behavior compare by
//! state, except the mutable and sealed kinds (cons, environment, brand,
//! sealed), which stay distinct no matter what their states hold. `eq_now`
//! additionally descends through pair contents, so structurally equal
//! lists compare true even when built from distinct cells.
//!
//! Cyclic mutable pairs make `eq_now` diverge; the Kernel surface
//! (`equal?`) inherits that, matching the observed original behavior.

use crate::brand::{brand_type, sealed_type};
use crate::ctx;
use crate::env::env_type;
use crate::pair::{cons_type, cons_value};
use abe_core::{beh_ref, Heap, Value};

/// Operational equivalence.
pub fn eq(heap: &Heap, x: Value, y: Value) -> bool {
    if x == y {
        return true;
    }
    if x == Value::Nil || y == Value::Nil {
        return false;
    }
    if x.is_actor() && y.is_actor() {
        let bx = heap.first(x);
        if bx == heap.first(y) {
            if bx == beh_ref(cons_type)
                || bx == beh_ref(env_type)
                || bx == beh_ref(brand_type)
                || bx == beh_ref(sealed_type)
            {
                // mutable and sealed kinds only compare by identity
                return false;
            }
            return eq(heap, heap.rest(x), heap.rest(y));
        }
        return false;
    }
    if x.is_cell() && y.is_cell() {
        return eq(heap, heap.first(x), heap.first(y)) && eq(heap, heap.rest(x), heap.rest(y));
    }
    false
}

/// Same value now, even if mutable.
pub fn eq_now(heap: &Heap, x: Value, y: Value) -> bool {
    if eq(heap, x, y) {
        return true;
    }
    let px = cons_value(heap, x);
    let py = cons_value(heap, y);
    if px.is_cell() && py.is_cell() {
        return eq_now(heap, heap.first(px), heap.first(py))
            && eq_now(heap, heap.rest(px), heap.rest(py));
    }
    false
}

/// `eq` as a message-borne binary operation.
pub fn eq_rel(heap: &Heap, x: Value, y: Value) -> Value {
    host_bool(eq(heap, x, y))
}

/// `eq_now` as a message-borne binary operation.
pub fn eq_now_rel(heap: &Heap, x: Value, y: Value) -> Value {
    host_bool(eq_now(heap, x, y))
}

/// Short-circuit AND over Kernel booleans: `#t` passes the right operand
/// through, anything else stays `#f`.
pub fn boolean_and(_heap: &Heap, p: Value, q: Value) -> Value {
    if p == ctx::a_true() { q } else { ctx::a_false() }
}

pub(crate) fn host_bool(flag: bool) -> Value {
    if flag { Value::True } else { Value::False }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::number_type;
    use abe_core::Config;

    #[test]
    fn test_eq_numbers_by_value() {
        let mut cfg = Config::new(8);
        let a = cfg.actor(number_type, Value::Int(5));
        let b = cfg.actor(number_type, Value::Int(5));
        let c = cfg.actor(number_type, Value::Int(6));
        assert!(eq(&cfg.heap, a, a));
        assert!(eq(&cfg.heap, a, b));
        assert!(!eq(&cfg.heap, a, c));
    }

    #[test]
    fn test_eq_mutable_cons_by_identity_only() {
        let mut cfg = Config::new(8);
        let s1 = cfg.heap.cons(Value::Int(1), Value::Int(2));
        let s2 = cfg.heap.cons(Value::Int(1), Value::Int(2));
        let a = cfg.actor(cons_type, s1);
        let b = cfg.actor(cons_type, s2);
        assert!(eq(&cfg.heap, a, a));
        assert!(!eq(&cfg.heap, a, b));
        // but the same states compare equal when the type is immutable
        let c = cfg.actor(crate::pair::pair_type, s1);
        let d = cfg.actor(crate::pair::pair_type, s2);
        assert!(eq(&cfg.heap, c, d));
    }

    #[test]
    fn test_eq_now_descends_into_pairs() {
        let mut cfg = Config::new(8);
        let n1 = cfg.actor(number_type, Value::Int(1));
        let n2 = cfg.actor(number_type, Value::Int(1));
        let s1 = cfg.heap.cons(n1, Value::Int(0));
        let s2 = cfg.heap.cons(n2, Value::Int(0));
        let a = cfg.actor(cons_type, s1);
        let b = cfg.actor(cons_type, s2);
        assert!(!eq(&cfg.heap, a, b));
        assert!(eq_now(&cfg.heap, a, b));
    }
}
