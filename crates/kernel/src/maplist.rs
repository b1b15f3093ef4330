//! The n-ary `map` applicative.
//!
//! `(map f list1 list2 ...)` walks the lists in lockstep: a chain of head
//! actors yields one argument tuple per step, the combiner is applied to
//! each tuple, and the results are consed up as they arrive. The walking
//! actor alternates between "waiting for a tuple" and "waiting for the
//! combined head" via BECOME.

use crate::ctx::a_nil;
use crate::pair::{cons_type, pair_map_beh};
use crate::plumbing::{ensure, fork_beh};
use abe_core::{Config, Event, Value};

/// The mapped tail arrived; cons the stored head onto it. State is
/// `(cust . head)`.
pub fn map_next_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let head = cfg.heap.rest(state);
    ensure!(cfg, head.is_actor());
    let tail = ev.message;
    ensure!(cfg, tail.is_actor());

    if tail == a_nil() {
        cfg.send(cust, a_nil());
    } else {
        let pair_state = cfg.heap.cons(head, tail);
        let pair = cfg.actor(cons_type, pair_state);
        cfg.send(cust, pair);
    }
}

/// One list unpacked to `(head . rest)`: emit the head towards the
/// customer chain and step this lane forward. State is `(cust . next)`.
pub fn map_pair_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let next = cfg.heap.rest(state);
    let pair = ev.message;

    if pair.is_cell() {
        let head = cfg.heap.first(pair);
        let list = cfg.heap.rest(pair);
        if next == Value::Nil {
            let nil = a_nil();
            let pair_state = cfg.heap.cons(head, nil);
            let out = cfg.actor(cons_type, pair_state);
            cfg.send(cust, out);
        } else {
            let k_state = cfg.heap.cons(cust, head);
            let k_next = cfg.actor(map_next_beh, k_state);
            cfg.send(next, k_next);
        }
        let head_state = cfg.heap.cons(list, next);
        cfg.become_(map_head_beh, head_state);
    } else {
        cfg.send(cust, a_nil());
    }
}

/// A lane over one operand list. A customer arriving means "give me your
/// next element". State is `(list . next)`.
pub fn map_head_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let list = cfg.heap.first(state);
    ensure!(cfg, list.is_actor());
    let next = cfg.heap.rest(state);
    let cust = ev.message;
    ensure!(cfg, cust.is_actor());

    let a_as_pair = cfg.heap.atom("as_pair");
    let msg = cfg.heap.cons(ev.target, a_as_pair);
    cfg.send(list, msg);
    let pair_state = cfg.heap.cons(cust, next);
    cfg.become_(map_pair_beh, pair_state);
}

/// Result head under construction; ask the lanes for the next tuple.
/// State is `(comb . env)`, message `(cust . heads)`.
pub fn map_tail_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let comb = cfg.heap.first(state);
    let env = cfg.heap.rest(state);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    let heads = cfg.heap.rest(msg);
    ensure!(cfg, heads.is_actor());

    cfg.send(heads, ev.target);
    let cust_env = cfg.heap.cons(cust, env);
    let tail = cfg.heap.cons(heads, cust_env);
    let comb_state = cfg.heap.cons(comb, tail);
    cfg.become_(map_comb_beh, comb_state);
}

/// An argument tuple arrived: apply the combiner and fork so the result
/// head and the rest of the walk proceed together. State is
/// `(comb . (heads . (cust . env)))`.
pub fn map_comb_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let comb = cfg.heap.first(state);
    ensure!(cfg, comb.is_actor());
    let s1 = cfg.heap.rest(state);
    ensure!(cfg, s1.is_cell());
    let heads = cfg.heap.first(s1);
    ensure!(cfg, heads.is_actor());
    let s2 = cfg.heap.rest(s1);
    ensure!(cfg, s2.is_cell());
    let cust = cfg.heap.first(s2);
    ensure!(cfg, cust.is_actor());
    let env = cfg.heap.rest(s2);
    ensure!(cfg, env.is_actor());
    let args = ev.message;
    ensure!(cfg, args.is_actor());

    if args == a_nil() {
        cfg.send(cust, a_nil());
    } else {
        let k_pair = cfg.actor(pair_map_beh, cust);
        let pair = cfg.heap.cons(comb, ev.target);
        let fork_state = cfg.heap.cons(k_pair, pair);
        let fork = cfg.actor(fork_beh, fork_state);
        let a_comb = cfg.heap.atom("comb");
        let args_env = cfg.heap.cons(args, env);
        let comb_req = cfg.heap.cons(a_comb, args_env);
        let fmsg = cfg.heap.cons(comb_req, heads);
        cfg.send(fork, fmsg);
        let tail_state = cfg.heap.cons(comb, env);
        cfg.become_(map_tail_beh, tail_state);
    }
}

/// The unwrapped combiner arrived; start the walk. State is
/// `(heads . (cust . env))`.
pub fn map_unwrap_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let heads = cfg.heap.first(state);
    ensure!(cfg, heads.is_actor());
    ensure!(cfg, ev.message.is_actor());

    cfg.send(heads, ev.target);
    let comb_state = cfg.heap.cons(ev.message, state);
    cfg.become_(map_comb_beh, comb_state);
}

/// Build the lane chain, one `map_head_beh` actor per operand list.
fn mk_heads(cfg: &mut Config, lists: Value) -> Value {
    if !lists.is_cell() {
        return Value::Nil;
    }
    let head = cfg.heap.first(lists);
    let rest = cfg.heap.rest(lists);
    let next = mk_heads(cfg, rest);
    let state = cfg.heap.cons(head, next);
    cfg.actor(map_head_beh, state)
}

/// `(map f . lists)` with at least one list.
pub fn map_args_beh(cfg: &mut Config, ev: &Event) {
    let cust_env = ev.state;
    ensure!(cfg, cust_env.is_cell());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let appl = cfg.heap.first(msg);
    ensure!(cfg, appl.is_actor());
    let lists = cfg.heap.rest(msg);
    ensure!(cfg, lists.is_cell());

    let a_unwrap = cfg.heap.atom("unwrap");
    let umsg = cfg.heap.cons(ev.target, a_unwrap);
    cfg.send(appl, umsg);
    let heads = mk_heads(cfg, lists);
    let state = cfg.heap.cons(heads, cust_env);
    cfg.become_(map_unwrap_beh, state);
}
