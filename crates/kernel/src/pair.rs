//! Pair types: the mutable cons cell and its immutable twin.
//!
//! `cons_type` carries the whole list protocol (evaluation of a
//! combination, structural match, tuple snapshot, map/foldl traversal,
//! printing). `pair_type` intercepts only mutation and `copy_immutable`,
//! delegating everything else, so both answer `pair?`.

use crate::ctx::{self, a_inert, a_true};
use crate::data::null_type;
use crate::io::with_sink;
use crate::plumbing::{ensure, fork_beh, throw, throw_at};
use abe_core::{beh_ref, Config, Event, Heap, Value};

/// Raw `(left . right)` state of a pair-like actor; `Nil` for the empty
/// list, `False` for anything that is not pair-like.
pub fn cons_value(heap: &Heap, pair: Value) -> Value {
    if !pair.is_actor() {
        return Value::False;
    }
    let beh = heap.first(pair);
    if beh == beh_ref(cons_type) || beh == beh_ref(pair_type) {
        heap.rest(pair)
    } else if beh == beh_ref(null_type) {
        Value::Nil
    } else {
        Value::False
    }
}

/// Snapshot a Kernel list as a raw cell list. `False` propagates out of
/// improper or non-list structure.
pub fn as_tuple(cfg: &mut Config, list: Value) -> Value {
    let list = cons_value(&cfg.heap, list);
    if !list.is_cell() {
        return list;
    }
    let head = cfg.heap.first(list);
    let tail = cfg.heap.rest(list);
    let rest = as_tuple(cfg, tail);
    if rest == Value::False {
        return rest;
    }
    cfg.heap.cons(head, rest)
}

/// Once the head of a combination evaluated to a combiner, combine it
/// with the stored operands. State is `(cust . (opnds . env))`.
pub fn pair_comb_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    let comb = ev.message;

    let a_comb = cfg.heap.atom("comb");
    let rest = cfg.heap.rest(state);
    let req = cfg.heap.cons(a_comb, rest);
    let msg = cfg.heap.cons(cust, req);
    cfg.send(comb, msg);
}

/// Join a computed tail tuple under the stored head. State `(cust . left)`.
pub fn pair_tuple_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let left = cfg.heap.rest(state);
    let tuple = ev.message;
    let reply = cfg.heap.cons(left, tuple);
    cfg.send(cust, reply);
}

/// A pair ptree matched when both halves replied `#inert`.
pub fn pair_match_beh(cfg: &mut Config, ev: &Event) {
    let cust = ev.state;
    ensure!(cfg, cust.is_actor());
    let msg = ev.message;
    if msg.is_cell()
        && cfg.heap.first(msg) == a_inert()
        && cfg.heap.rest(msg) == a_inert()
    {
        cfg.send(cust, a_inert());
    }
}

/// Wrap copied halves as an immutable pair.
pub fn pair_copy_beh(cfg: &mut Config, ev: &Event) {
    let cust = ev.state;
    ensure!(cfg, cust.is_actor());
    let head_tail = ev.message;
    if head_tail.is_cell() {
        let pair = cfg.actor(pair_type, head_tail);
        cfg.send(cust, pair);
    }
}

/// Wrap mapped halves as a mutable pair.
pub fn pair_map_beh(cfg: &mut Config, ev: &Event) {
    let cust = ev.state;
    ensure!(cfg, cust.is_actor());
    let head_tail = ev.message;
    if head_tail.is_cell() {
        let pair = cfg.actor(cons_type, head_tail);
        cfg.send(cust, pair);
    }
}

/// Fold one element in, then continue down the spine. State is
/// `(cust . (right . (zero . (oplus . req'))))`.
pub fn pair_foldl_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let s1 = cfg.heap.rest(state);
    ensure!(cfg, s1.is_cell());
    let right = cfg.heap.first(s1);
    let s2 = cfg.heap.rest(s1);
    ensure!(cfg, s2.is_cell());
    let zero = cfg.heap.first(s2);
    let s3 = cfg.heap.rest(s2);
    ensure!(cfg, s3.is_cell());
    let oplus = cfg.heap.first(s3);
    let req_ = cfg.heap.rest(s3);
    let one = ev.message;

    let Some(op) = oplus.as_bin() else {
        throw_at(cfg, file!(), line!());
        return;
    };
    let value = op(&cfg.heap, zero, one);
    let a_foldl = cfg.heap.atom("foldl");
    let chain = cfg.heap.cons(oplus, req_);
    let chain = cfg.heap.cons(value, chain);
    let req = cfg.heap.cons(a_foldl, chain);
    let msg = cfg.heap.cons(cust, req);
    cfg.send(right, msg);
}

/// Head printed; hand the spine to the tail. State `(cust . right)`.
pub fn pair_write_tail_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let right = cfg.heap.rest(state);
    ensure!(cfg, right.is_actor());
    let ok = ev.message;

    if ok == a_true() {
        let a_write_tail = cfg.heap.atom("write_tail");
        let req = cfg.heap.cons(a_write_tail, Value::Int(' ' as i64));
        let msg = cfg.heap.cons(cust, req);
        cfg.send(right, msg);
    } else {
        cfg.send(cust, ok);
    }
}

/// Mutable cons cell.
pub fn cons_type(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let left = cfg.heap.first(state);
    let right = cfg.heap.rest(state);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_eval = cfg.heap.atom("eval");
    let a_as_pair = cfg.heap.atom("as_pair");
    let a_as_tuple = cfg.heap.atom("as_tuple");
    let a_match = cfg.heap.atom("match");
    let a_left_match = cfg.heap.atom("left_match");
    let a_right_match = cfg.heap.atom("right_match");
    let a_copy = cfg.heap.atom("copy_immutable");
    let a_map = cfg.heap.atom("map");
    let a_foldl = cfg.heap.atom("foldl");
    let a_set_car = cfg.heap.atom("set_car");
    let a_set_cdr = cfg.heap.atom("set_cdr");
    let a_write = cfg.heap.atom("write");
    let a_write_tail = cfg.heap.atom("write_tail");

    let head = if req.is_cell() {
        cfg.heap.first(req)
    } else {
        Value::Nil
    };

    if req.is_cell() && head == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(pair_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req.is_cell() && head == a_eval {
        let env = cfg.heap.rest(req);
        let opnds_env = cfg.heap.cons(right, env);
        let state = cfg.heap.cons(cust, opnds_env);
        let k_comb = cfg.actor(pair_comb_beh, state);
        let req = cfg.heap.cons(a_eval, env);
        let msg = cfg.heap.cons(k_comb, req);
        cfg.send(left, msg);
    } else if req == a_as_pair {
        cfg.send(cust, state);
    } else if req == a_as_tuple {
        let state = cfg.heap.cons(cust, left);
        let k_tuple = cfg.actor(pair_tuple_beh, state);
        let msg = cfg.heap.cons(k_tuple, a_as_tuple);
        cfg.send(right, msg);
    } else if req.is_cell() && head == a_match && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let value = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);
        let k_pair = cfg.actor(pair_match_beh, cust);
        let both = cfg.heap.cons(value, value);
        let fork_state = cfg.heap.cons(k_pair, both);
        let fork = cfg.actor(fork_beh, fork_state);
        let l_env = cfg.heap.cons(left, env);
        let l_req = cfg.heap.cons(a_left_match, l_env);
        let r_env = cfg.heap.cons(right, env);
        let r_req = cfg.heap.cons(a_right_match, r_env);
        let msg = cfg.heap.cons(l_req, r_req);
        cfg.send(fork, msg);
    } else if req.is_cell() && head == a_left_match && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let ptree = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);
        let v_env = cfg.heap.cons(left, env);
        let m_req = cfg.heap.cons(a_match, v_env);
        let msg = cfg.heap.cons(cust, m_req);
        cfg.send(ptree, msg);
    } else if req.is_cell() && head == a_right_match && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let ptree = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);
        let v_env = cfg.heap.cons(right, env);
        let m_req = cfg.heap.cons(a_match, v_env);
        let msg = cfg.heap.cons(cust, m_req);
        cfg.send(ptree, msg);
    } else if req == a_copy {
        let k_pair = cfg.actor(pair_copy_beh, cust);
        let halves = cfg.heap.cons(left, right);
        let fork_state = cfg.heap.cons(k_pair, halves);
        let fork = cfg.actor(fork_beh, fork_state);
        let msg = cfg.heap.cons(req, req);
        cfg.send(fork, msg);
    } else if req.is_cell() && head == a_map {
        let req_ = cfg.heap.rest(req);
        let k_pair = cfg.actor(pair_map_beh, cust);
        let halves = cfg.heap.cons(left, right);
        let fork_state = cfg.heap.cons(k_pair, halves);
        let fork = cfg.actor(fork_beh, fork_state);
        let msg = cfg.heap.cons(req_, req);
        cfg.send(fork, msg);
    } else if req.is_cell()
        && head == a_foldl
        && cfg.heap.rest(req).is_cell()
        && cfg.heap.rest(cfg.heap.rest(req)).is_cell()
    {
        let params = cfg.heap.rest(req); // (zero . (oplus . req'))
        let req_ = cfg.heap.rest(cfg.heap.rest(params));
        let spine = cfg.heap.cons(right, params);
        let state = cfg.heap.cons(cust, spine);
        let k_one = cfg.actor(pair_foldl_beh, state);
        let msg = cfg.heap.cons(k_one, req_);
        cfg.send(left, msg);
    } else if req.is_cell() && head == a_set_car {
        let a = cfg.heap.rest(req);
        let state = cfg.heap.cons(a, right);
        cfg.become_(cons_type, state);
        cfg.send(cust, a_inert());
    } else if req.is_cell() && head == a_set_cdr {
        let d = cfg.heap.rest(req);
        let state = cfg.heap.cons(left, d);
        cfg.become_(cons_type, state);
        cfg.send(cust, a_inert());
    } else if req == a_write {
        let req = cfg.heap.cons(a_write_tail, Value::Int('(' as i64));
        let msg = cfg.heap.cons(cust, req);
        cfg.send(ev.target, msg);
    } else if req.is_cell() && head == a_write_tail {
        let prefix = cfg.heap.rest(req);
        let ok = match prefix.as_int() {
            Some(c) => with_sink(|sink| sink.put(c)),
            None => false,
        };
        if ok {
            let state = cfg.heap.cons(cust, right);
            let k_write = cfg.actor(pair_write_tail_beh, state);
            let msg = cfg.heap.cons(k_write, a_write);
            cfg.send(left, msg);
        } else {
            cfg.send(cust, ctx::a_false());
        }
    } else {
        let tag = cfg.heap.atom("Not-Understood");
        let detail = cfg.heap.cons(ev.target, req);
        let msg = cfg.heap.cons(tag, detail);
        throw(cfg, msg);
    }
}

/// Immutable pair: mutation throws, copying is identity, the rest is
/// `cons_type` behavior.
pub fn pair_type(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_set_car = cfg.heap.atom("set_car");
    let a_set_cdr = cfg.heap.atom("set_cdr");
    let a_copy = cfg.heap.atom("copy_immutable");

    let head = if req.is_cell() {
        cfg.heap.first(req)
    } else {
        Value::Nil
    };

    if req.is_cell() && (head == a_set_car || head == a_set_cdr) {
        let tag = cfg.heap.atom("Immutable");
        let msg = cfg.heap.cons(tag, ev.target);
        throw(cfg, msg);
    } else if req == a_copy {
        cfg.send(cust, ev.target);
    } else {
        cons_type(cfg, ev);
    }
}
