//! Numeric and relational combiners, and the type predicates.
//!
//! The n-ary relations reduce to a sliding window of binary comparisons
//! joined by AND with early exit; the folds are plain left folds with an
//! identity element. Arithmetic wraps, following machine-word
//! two's-complement semantics.

use crate::ctx::{a_false, a_true};
use crate::data::{get_number, number_value};
use crate::pair::cons_value;
use crate::plumbing::{ensure, throw_at};
use crate::pred::host_bool;
use abe_core::{bin_ref, Config, Event, Heap, Value};

use crate::comb::oper_type;

// caller guarantees numbers via ENSURE before applying these
fn int_of(v: Value) -> i64 {
    v.as_int().unwrap_or(0)
}

pub fn num_eq_rel(_heap: &Heap, p: Value, q: Value) -> Value {
    host_bool(int_of(p) == int_of(q))
}

pub fn num_lt_rel(_heap: &Heap, p: Value, q: Value) -> Value {
    host_bool(int_of(p) < int_of(q))
}

pub fn num_le_rel(_heap: &Heap, p: Value, q: Value) -> Value {
    host_bool(int_of(p) <= int_of(q))
}

pub fn num_ge_rel(_heap: &Heap, p: Value, q: Value) -> Value {
    host_bool(int_of(p) >= int_of(q))
}

pub fn num_gt_rel(_heap: &Heap, p: Value, q: Value) -> Value {
    host_bool(int_of(p) > int_of(q))
}

pub fn num_plus_op(_heap: &Heap, p: Value, q: Value) -> Value {
    Value::Int(int_of(p).wrapping_add(int_of(q)))
}

pub fn num_times_op(_heap: &Heap, p: Value, q: Value) -> Value {
    Value::Int(int_of(p).wrapping_mul(int_of(q)))
}

/// Type predicate: fold `type_eq` over the operand list with AND.
/// State is the type reference (a behavior ref, or a brand actor).
pub fn type_pred_oper(cfg: &mut Config, ev: &Event) {
    let type_ref = ev.state;
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let opnds = cfg.heap.first(cfg.heap.rest(req));
        let a_foldl = cfg.heap.atom("foldl");
        let a_type_eq = cfg.heap.atom("type_eq");
        let sub_req = cfg.heap.cons(a_type_eq, type_ref);
        let chain = cfg.heap.cons(bin_ref(crate::pred::boolean_and), sub_req);
        let chain = cfg.heap.cons(a_true(), chain);
        let freq = cfg.heap.cons(a_foldl, chain);
        let fmsg = cfg.heap.cons(cust, freq);
        cfg.send(opnds, fmsg);
    } else {
        oper_type(cfg, ev);
    }
}

/// N-ary relation over arbitrary values; state is the binary relation.
pub fn obj_rel_oper(cfg: &mut Config, ev: &Event) {
    let rel = ev.state;
    let msg = ev.message;
    ensure!(cfg, rel.is_func());
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let Some(op) = rel.as_bin() else {
            throw_at(cfg, file!(), line!());
            return;
        };
        let mut opnds = cons_value(&cfg.heap, cfg.heap.first(cfg.heap.rest(req)));
        let mut result = a_true();
        while opnds.is_cell() {
            let p = cons_value(&cfg.heap, cfg.heap.rest(opnds));
            if !p.is_cell() {
                break;
            }
            let left = cfg.heap.first(opnds);
            ensure!(cfg, left.is_actor());
            let right = cfg.heap.first(p);
            ensure!(cfg, right.is_actor());
            if op(&cfg.heap, left, right) == Value::False {
                result = a_false();
                break;
            }
            opnds = p;
        }
        cfg.send(cust, result);
    } else {
        oper_type(cfg, ev);
    }
}

/// N-ary numeric relation; operands must all be Kernel numbers.
pub fn num_rel_oper(cfg: &mut Config, ev: &Event) {
    let rel = ev.state;
    let msg = ev.message;
    ensure!(cfg, rel.is_func());
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let Some(op) = rel.as_bin() else {
            throw_at(cfg, file!(), line!());
            return;
        };
        let mut opnds = cons_value(&cfg.heap, cfg.heap.first(cfg.heap.rest(req)));
        let mut result = a_true();
        while opnds.is_cell() {
            let p = cons_value(&cfg.heap, cfg.heap.rest(opnds));
            if !p.is_cell() {
                break;
            }
            let left = number_value(&cfg.heap, cfg.heap.first(opnds));
            ensure!(cfg, left.is_number());
            let right = number_value(&cfg.heap, cfg.heap.first(p));
            ensure!(cfg, right.is_number());
            if op(&cfg.heap, left, right) == Value::False {
                result = a_false();
                break;
            }
            opnds = p;
        }
        cfg.send(cust, result);
    } else {
        oper_type(cfg, ev);
    }
}

/// N-ary left fold with an identity element. State is `(zero . oplus)`.
pub fn num_foldl_oper(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let mut zero = cfg.heap.first(state);
    ensure!(cfg, zero.is_number());
    let oplus = cfg.heap.rest(state);
    ensure!(cfg, oplus.is_func());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let Some(op) = oplus.as_bin() else {
            throw_at(cfg, file!(), line!());
            return;
        };
        let mut opnds = cons_value(&cfg.heap, cfg.heap.first(cfg.heap.rest(req)));
        while opnds.is_cell() {
            let one = number_value(&cfg.heap, cfg.heap.first(opnds));
            ensure!(cfg, one.is_number());
            zero = op(&cfg.heap, zero, one);
            opnds = cons_value(&cfg.heap, cfg.heap.rest(opnds));
        }
        let number = get_number(cfg, zero);
        cfg.send(cust, number);
    } else {
        oper_type(cfg, ev);
    }
}
