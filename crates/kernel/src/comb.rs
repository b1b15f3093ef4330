//! Combiners: operatives, applicatives, and the special-form operatives
//! the ground environment binds.
//!
//! An applicative evaluates its operand list (via the list `map` request)
//! and hands the tuple to the operative it wraps. Operatives see operands
//! unevaluated; `$vau` and `$lambda` close over `(ptree, body, env)` and
//! run their bodies as a left fold of `eval` with "keep the last value".

use crate::ctx::{self, a_inert, a_nil, a_sink};
use crate::data::object_type;
use crate::env::{env_type, match_ptree};
use crate::io::with_sink;
use crate::pair::{as_tuple, cons_type, cons_value, pair_comb_beh, pair_type};
use crate::plumbing::{command_beh, ensure, throw_at};
use abe_core::{beh_ref, bin_ref, Config, Event, Heap, Value};

/// `\(x, y).y` -- the fold step that keeps only the last result.
pub(crate) fn pair_tail(_heap: &Heap, _x: Value, y: Value) -> Value {
    y
}

/// Base combiner type.
pub fn oper_type(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_write = cfg.heap.atom("write");

    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(oper_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req == a_write {
        let ok = with_sink(|sink| sink.put_str("#operative"));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        object_type(cfg, ev);
    }
}

/// Operands evaluated; combine the wrapped operative with the tuple.
/// State is `(cust . (comb . env))`.
pub fn appl_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let inner = cfg.heap.rest(state);
    ensure!(cfg, inner.is_cell());
    let comb = cfg.heap.first(inner);
    let env = cfg.heap.rest(inner);
    let args = ev.message;

    let a_comb = cfg.heap.atom("comb");
    let args_env = cfg.heap.cons(args, env);
    let req = cfg.heap.cons(a_comb, args_env);
    let msg = cfg.heap.cons(cust, req);
    cfg.send(comb, msg);
}

/// Applicative: a wrapper that evaluates operands first. State is the
/// underlying combiner.
pub fn appl_type(cfg: &mut Config, ev: &Event) {
    let comb = ev.state;
    ensure!(cfg, comb.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_comb = cfg.heap.atom("comb");
    let a_unwrap = cfg.heap.atom("unwrap");
    let a_write = cfg.heap.atom("write");

    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(appl_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let opnds = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);

        let comb_env = cfg.heap.cons(comb, env);
        let state = cfg.heap.cons(cust, comb_env);
        let k_args = cfg.actor(appl_args_beh, state);
        let a_map = cfg.heap.atom("map");
        let a_eval = cfg.heap.atom("eval");
        let eval_req = cfg.heap.cons(a_eval, env);
        let map_req = cfg.heap.cons(a_map, eval_req);
        let msg = cfg.heap.cons(k_args, map_req);
        cfg.send(opnds, msg);
    } else if req == a_unwrap {
        cfg.send(cust, comb);
    } else if req == a_write {
        let ok = with_sink(|sink| sink.put_str("#applicative"));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        object_type(cfg, ev);
    }
}

/// Operative whose state names a continuation behavior: snapshot the
/// (already evaluated) operand tuple and hand it over. The workhorse
/// behind most ground applicatives.
pub fn args_oper(cfg: &mut Config, ev: &Event) {
    let args_beh = ev.state;
    let msg = ev.message;
    ensure!(cfg, args_beh.is_func());
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let opnds = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);
        let Some(beh) = args_beh.as_beh() else {
            throw_at(cfg, file!(), line!());
            return;
        };
        let state = cfg.heap.cons(cust, env);
        let k_args = cfg.actor(beh, state);
        let tuple = as_tuple(cfg, opnds);
        cfg.send(k_args, tuple);
    } else {
        oper_type(cfg, ev);
    }
}

/// `(list . args)` -- the evaluated operand list itself.
pub fn list_oper(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let opnds = cfg.heap.first(cfg.heap.rest(req));
        cfg.send(cust, opnds);
    } else {
        oper_type(cfg, ev);
    }
}

/// `($sequence . body)` -- evaluate left to right, reply with the last.
pub fn sequence_oper(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let opnds = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);
        send_body_fold(cfg, cust, opnds, env);
    } else {
        oper_type(cfg, ev);
    }
}

/// `body <- (cust foldl #inert pair_tail eval env)`.
pub(crate) fn send_body_fold(cfg: &mut Config, cust: Value, body: Value, env: Value) {
    let a_foldl = cfg.heap.atom("foldl");
    let a_eval = cfg.heap.atom("eval");
    let eval_req = cfg.heap.cons(a_eval, env);
    let chain = cfg.heap.cons(bin_ref(pair_tail), eval_req);
    let chain = cfg.heap.cons(a_inert(), chain);
    let req = cfg.heap.cons(a_foldl, chain);
    let msg = cfg.heap.cons(cust, req);
    cfg.send(body, msg);
}

/// Right-hand side evaluated; match it against the ptree. State is
/// `(cust . (ptree . env))`.
pub fn define_match_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let inner = cfg.heap.rest(state);
    ensure!(cfg, inner.is_cell());
    let ptree = cfg.heap.first(inner);
    let env = cfg.heap.rest(inner);

    let value = match_ptree(cfg, ev.message, ptree, env);
    ensure!(cfg, value == a_inert());
    cfg.send(cust, value);
}

/// `($define! ptree expr)`.
pub fn define_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let env = cfg.heap.rest(state);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let ptree = cfg.heap.first(msg);
    let tail = cfg.heap.rest(msg);
    ensure!(cfg, tail.is_cell());
    let expr = cfg.heap.first(tail);
    ensure!(cfg, cfg.heap.rest(tail) == Value::Nil);

    let ptree_env = cfg.heap.cons(ptree, env);
    let k_state = cfg.heap.cons(cust, ptree_env);
    let k_value = cfg.actor(define_match_beh, k_state);
    let a_eval = cfg.heap.atom("eval");
    let req = cfg.heap.cons(a_eval, env);
    let emsg = cfg.heap.cons(k_value, req);
    cfg.send(expr, emsg);
}

/// `(eval expr env)`.
pub fn eval_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let expr = cfg.heap.first(msg);
    let tail = cfg.heap.rest(msg);
    ensure!(cfg, tail.is_cell());
    let env = cfg.heap.first(tail);
    ensure!(cfg, cfg.heap.rest(tail) == Value::Nil);

    let a_eval = cfg.heap.atom("eval");
    let req = cfg.heap.cons(a_eval, env);
    let emsg = cfg.heap.cons(cust, req);
    cfg.send(expr, emsg);
}

/// `(apply appl args env?)` -- unwrap and combine with an explicit (or
/// fresh empty) environment.
pub fn apply_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let appl = cfg.heap.first(msg);
    let tail = cfg.heap.rest(msg);
    ensure!(cfg, tail.is_cell());
    let args = cfg.heap.first(tail);
    let opt = cfg.heap.rest(tail);

    let env = if opt == Value::Nil {
        let state = cfg.heap.cons(Value::Nil, Value::Nil);
        cfg.actor(env_type, state)
    } else if opt.is_cell() && cfg.heap.rest(opt) == Value::Nil {
        cfg.heap.first(opt)
    } else {
        throw_at(cfg, file!(), line!());
        return;
    };

    let args_env = cfg.heap.cons(args, env);
    let k_state = cfg.heap.cons(cust, args_env);
    let k_comb = cfg.actor(pair_comb_beh, k_state);
    let a_unwrap = cfg.heap.atom("unwrap");
    let umsg = cfg.heap.cons(k_comb, a_unwrap);
    cfg.send(appl, umsg);
}

/// Vau closure: `(ptree . (body . static-env))`. Combination binds
/// `(opnds . dynamic-env)` against the ptree in a fresh child of the
/// static environment, then folds the body there.
pub fn vau_type(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let ptree = cfg.heap.first(state);
    let inner = cfg.heap.rest(state);
    ensure!(cfg, inner.is_cell());
    let body = cfg.heap.first(inner);
    let s_env = cfg.heap.rest(inner);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let opnds = cfg.heap.first(rest);
        let d_env = cfg.heap.rest(rest);

        let local_state = cfg.heap.cons(s_env, Value::Nil);
        let local = cfg.actor(env_type, local_state);
        let formal_state = cfg.heap.cons(opnds, d_env);
        let formal = cfg.actor(pair_type, formal_state);
        let matched = match_ptree(cfg, formal, ptree, local);
        ensure!(cfg, matched == a_inert());
        send_body_fold(cfg, cust, body, local);
    } else {
        oper_type(cfg, ev);
    }
}

/// Second half of `$vau`: the eformal and body arrived. State is
/// `(cust . (vars . env))`.
pub fn vau_evar_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let inner = cfg.heap.rest(state);
    ensure!(cfg, inner.is_cell());
    let vars = cfg.heap.first(inner);
    let env = cfg.heap.rest(inner);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let evar = cfg.heap.first(msg);
    let body = cfg.heap.rest(msg);

    let actual_state = cfg.heap.cons(vars, evar);
    let actual = cfg.actor(pair_type, actual_state);
    let body_env = cfg.heap.cons(body, env);
    let comb_state = cfg.heap.cons(actual, body_env);
    let comb = cfg.actor(vau_type, comb_state);
    cfg.send(cust, comb);
}

/// First half of `$vau`: the immutable copy of the operands arrived as
/// `(vars . rest)`. State is `(cust . env)`.
pub fn vau_vars_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let env = cfg.heap.rest(state);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let vars = cfg.heap.first(msg);
    let opnds = cfg.heap.rest(msg);

    let a_as_pair = cfg.heap.atom("as_pair");
    let amsg = cfg.heap.cons(ev.target, a_as_pair);
    cfg.send(opnds, amsg);
    let vars_env = cfg.heap.cons(vars, env);
    let next = cfg.heap.cons(cust, vars_env);
    cfg.become_(vau_evar_beh, next);
}

/// `($vau ptree eformal . body)`.
pub fn vau_oper(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let opnds = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);

        let k_state = cfg.heap.cons(cust, env);
        let k_pair = cfg.actor(vau_vars_beh, k_state);
        let a_as_pair = cfg.heap.atom("as_pair");
        let forward = cfg.heap.cons(k_pair, a_as_pair);
        let k_copy = cfg.actor(command_beh, forward);
        let a_copy = cfg.heap.atom("copy_immutable");
        let cmsg = cfg.heap.cons(k_copy, a_copy);
        cfg.send(opnds, cmsg);
    } else {
        oper_type(cfg, ev);
    }
}

/// `(wrap comb)`.
pub fn wrap_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let comb = cfg.heap.first(msg);
    ensure!(cfg, cfg.heap.rest(msg) == Value::Nil);

    let appl = cfg.actor(appl_type, comb);
    cfg.send(cust, appl);
}

/// `(unwrap appl)`.
pub fn unwrap_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let appl = cfg.heap.first(msg);
    ensure!(cfg, cfg.heap.rest(msg) == Value::Nil);

    let a_unwrap = cfg.heap.atom("unwrap");
    let umsg = cfg.heap.cons(cust, a_unwrap);
    cfg.send(appl, umsg);
}

/// Lambda closure: an operative that binds already-evaluated operands in
/// a child of its captured environment, ignoring the dynamic one.
pub fn lambda_type(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let ptree = cfg.heap.first(state);
    let inner = cfg.heap.rest(state);
    ensure!(cfg, inner.is_cell());
    let body = cfg.heap.first(inner);
    let env = cfg.heap.rest(inner);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let opnds = cfg.heap.first(cfg.heap.rest(req));
        let local_state = cfg.heap.cons(env, Value::Nil);
        let local = cfg.actor(env_type, local_state);
        let matched = match_ptree(cfg, opnds, ptree, local);
        ensure!(cfg, matched == a_inert());
        send_body_fold(cfg, cust, body, local);
    } else {
        oper_type(cfg, ev);
    }
}

/// The copied `(ptree . body)` arrived. State is `(cust . env)`.
pub fn lambda_vars_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let env = cfg.heap.rest(state);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let ptree = cfg.heap.first(msg);
    let body = cfg.heap.rest(msg);

    let body_env = cfg.heap.cons(body, env);
    let oper_state = cfg.heap.cons(ptree, body_env);
    let oper = cfg.actor(lambda_type, oper_state);
    let appl = cfg.actor(appl_type, oper);
    cfg.send(cust, appl);
}

/// `($lambda ptree . body)`.
pub fn lambda_oper(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let opnds = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);

        let k_state = cfg.heap.cons(cust, env);
        let k_pair = cfg.actor(lambda_vars_beh, k_state);
        let a_as_pair = cfg.heap.atom("as_pair");
        let forward = cfg.heap.cons(k_pair, a_as_pair);
        let k_copy = cfg.actor(command_beh, forward);
        let a_copy = cfg.heap.atom("copy_immutable");
        let cmsg = cfg.heap.cons(k_copy, a_copy);
        cfg.send(opnds, cmsg);
    } else {
        oper_type(cfg, ev);
    }
}

/// Test evaluated; let the boolean pick a branch. State is
/// `(cust . (cnsq . (altn . env)))`.
pub fn if_test_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let test = ev.message;
    ensure!(cfg, test.is_actor());

    let a_if = cfg.heap.atom("if");
    let rest = cfg.heap.rest(state);
    let req = cfg.heap.cons(a_if, rest);
    let msg = cfg.heap.cons(cust, req);
    cfg.send(test, msg);
}

/// `($if test consequent alternative)`.
pub fn if_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let env = cfg.heap.rest(state);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let test = cfg.heap.first(msg);
    let t1 = cfg.heap.rest(msg);
    ensure!(cfg, t1.is_cell());
    let cnsq = cfg.heap.first(t1);
    let t2 = cfg.heap.rest(t1);
    ensure!(cfg, t2.is_cell());
    let altn = cfg.heap.first(t2);
    ensure!(cfg, cfg.heap.rest(t2) == Value::Nil);

    let alt_env = cfg.heap.cons(altn, env);
    let branches = cfg.heap.cons(cnsq, alt_env);
    let k_state = cfg.heap.cons(cust, branches);
    let k_test = cfg.actor(if_test_beh, k_state);
    let a_eval = cfg.heap.atom("eval");
    let req = cfg.heap.cons(a_eval, env);
    let emsg = cfg.heap.cons(k_test, req);
    cfg.send(test, emsg);
}

/// `(cons a d)` -- a fresh mutable pair.
pub fn cons_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let a = cfg.heap.first(msg);
    let tail = cfg.heap.rest(msg);
    ensure!(cfg, tail.is_cell());
    let d = cfg.heap.first(tail);
    ensure!(cfg, cfg.heap.rest(tail) == Value::Nil);

    let pair_state = cfg.heap.cons(a, d);
    let pair = cfg.actor(cons_type, pair_state);
    cfg.send(cust, pair);
}

/// `(car p)` -- operand list destructured host-side.
pub fn car_oper(cfg: &mut Config, ev: &Event) {
    car_cdr_oper(cfg, ev, true);
}

/// `(cdr p)`.
pub fn cdr_oper(cfg: &mut Config, ev: &Event) {
    car_cdr_oper(cfg, ev, false);
}

fn car_cdr_oper(cfg: &mut Config, ev: &Event, head: bool) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let opnds = cfg.heap.first(cfg.heap.rest(req));
        let p = cons_value(&cfg.heap, opnds);
        ensure!(cfg, p.is_cell());
        ensure!(cfg, cfg.heap.rest(p) == a_nil());
        let arg = cfg.heap.first(p);
        let p = cons_value(&cfg.heap, arg);
        ensure!(cfg, p.is_cell());
        let picked = if head {
            cfg.heap.first(p)
        } else {
            cfg.heap.rest(p)
        };
        ensure!(cfg, picked.is_actor());
        cfg.send(cust, picked);
    } else {
        oper_type(cfg, ev);
    }
}

/// `(write v)`.
pub fn write_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let sexpr = cfg.heap.first(msg);
    ensure!(cfg, cfg.heap.rest(msg) == Value::Nil);

    let a_write = cfg.heap.atom("write");
    let wmsg = cfg.heap.cons(cust, a_write);
    cfg.send(sexpr, wmsg);
}

/// `(newline)`.
pub fn newline_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    ensure!(cfg, ev.message == Value::Nil);

    let ok = with_sink(|sink| sink.put('\n' as i64));
    cfg.send(cust, ctx::boolean(ok));
}

/// `(set-car! p a)`.
pub fn set_car_args_beh(cfg: &mut Config, ev: &Event) {
    set_slot_args(cfg, ev, "set_car");
}

/// `(set-cdr! p d)`.
pub fn set_cdr_args_beh(cfg: &mut Config, ev: &Event) {
    set_slot_args(cfg, ev, "set_cdr");
}

fn set_slot_args(cfg: &mut Config, ev: &Event, request: &str) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let p = cfg.heap.first(msg);
    let tail = cfg.heap.rest(msg);
    ensure!(cfg, tail.is_cell());
    let v = cfg.heap.first(tail);
    ensure!(cfg, cfg.heap.rest(tail) == Value::Nil);

    let tag = cfg.heap.atom(request);
    let req = cfg.heap.cons(tag, v);
    let smsg = cfg.heap.cons(cust, req);
    cfg.send(p, smsg);
}

/// `(copy-es-immutable v)`.
pub fn copy_es_immutable_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let sexpr = cfg.heap.first(msg);
    ensure!(cfg, cfg.heap.rest(msg) == Value::Nil);

    let a_copy = cfg.heap.atom("copy_immutable");
    let cmsg = cfg.heap.cons(cust, a_copy);
    cfg.send(sexpr, cmsg);
}

/// Walk the operand tuple, firing an eval-to-sink for each element.
pub fn concurrent_args_beh(cfg: &mut Config, ev: &Event) {
    let env = ev.state;
    let args = ev.message;
    if args.is_cell() {
        let first = cfg.heap.first(args);
        let rest = cfg.heap.rest(args);
        let a_eval = cfg.heap.atom("eval");
        let req = cfg.heap.cons(a_eval, env);
        let msg = cfg.heap.cons(a_sink(), req);
        cfg.send(first, msg);
        cfg.send(ev.target, rest);
    }
}

/// `($concurrent . exprs)` -- fire and forget, reply `#inert` at once.
pub fn concurrent_oper(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let opnds = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);
        let k_args = cfg.actor(concurrent_args_beh, env);
        let a_as_tuple = cfg.heap.atom("as_tuple");
        let tmsg = cfg.heap.cons(k_args, a_as_tuple);
        cfg.send(opnds, tmsg);
        cfg.send(cust, a_inert());
    } else {
        oper_type(cfg, ev);
    }
}
