//! Encapsulation: brands and sealed values.
//!
//! `(make-encapsulation-type)` mints a fresh brand actor and replies with
//! `(seal sealed? unseal)`. A sealed value only answers `type_eq` and
//! `unseal` for its own brand; different invocations live in disjoint
//! worlds because the brand's identity is the actor cell itself.

use crate::comb::{appl_type, oper_type};
use crate::ctx;
use crate::data::object_type;
use crate::io::with_sink;
use crate::num::type_pred_oper;
use crate::pair::cons_type;
use crate::plumbing::{ensure, throw_at};
use abe_core::{beh_ref, Config, Event, Value};

/// Sealed value: state is `(brand . payload)`.
pub fn sealed_type(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let brand = cfg.heap.first(state);
    let value = cfg.heap.rest(state);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_unseal = cfg.heap.atom("unseal");
    let a_write = cfg.heap.atom("write");

    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == brand;
        cfg.send(cust, ctx::boolean(hit));
    } else if req.is_cell() && cfg.heap.first(req) == a_unseal && cfg.heap.rest(req) == brand {
        cfg.send(cust, value);
    } else if req == a_write {
        let ok = with_sink(|sink| sink.put_str("#encapsulation"));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        object_type(cfg, ev);
    }
}

/// Brand: a pure factory. Any `(cust . value)` message replies with a
/// fresh sealed wrapper around `value`.
pub fn brand_type(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let value = cfg.heap.rest(msg);

    let state = cfg.heap.cons(ev.target, value);
    let sealed = cfg.actor(sealed_type, state);
    cfg.send(cust, sealed);
}

/// `(seal value)` -- route the value through the brand factory.
/// State is `(cust . brand)`.
pub fn seal_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let brand = cfg.heap.rest(state);
    ensure!(cfg, brand.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let value = cfg.heap.first(msg);
    ensure!(cfg, cfg.heap.rest(msg) == Value::Nil);

    let bmsg = cfg.heap.cons(cust, value);
    cfg.send(brand, bmsg);
}

/// `(unseal object)` -- ask the object to unseal for this brand.
/// State is `(cust . brand)`.
pub fn unseal_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let brand = cfg.heap.rest(state);
    ensure!(cfg, brand.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let object = cfg.heap.first(msg);
    ensure!(cfg, cfg.heap.rest(msg) == Value::Nil);

    let a_unseal = cfg.heap.atom("unseal");
    let req = cfg.heap.cons(a_unseal, brand);
    let umsg = cfg.heap.cons(cust, req);
    cfg.send(object, umsg);
}

/// Brand-parameterized operative. State is `(brand . args_beh)`.
pub fn brand_oper(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let brand = cfg.heap.first(state);
    let args_beh = cfg.heap.rest(state);
    ensure!(cfg, args_beh.is_func());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_comb = cfg.heap.atom("comb");
    if req.is_cell() && cfg.heap.first(req) == a_comb && cfg.heap.rest(req).is_cell() {
        let opnds = cfg.heap.first(cfg.heap.rest(req));
        let Some(beh) = args_beh.as_beh() else {
            throw_at(cfg, file!(), line!());
            return;
        };
        let k_state = cfg.heap.cons(cust, brand);
        let k_args = cfg.actor(beh, k_state);
        let a_as_tuple = cfg.heap.atom("as_tuple");
        let tmsg = cfg.heap.cons(k_args, a_as_tuple);
        cfg.send(opnds, tmsg);
    } else {
        oper_type(cfg, ev);
    }
}

/// `(make-encapsulation-type)` -- mint `(seal sealed? unseal)`.
pub fn brand_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    ensure!(cfg, ev.message == Value::Nil);

    let brand = cfg.actor(brand_type, Value::Nil);

    let seal_state = cfg.heap.cons(brand, beh_ref(seal_args_beh));
    let seal_oper = cfg.actor(brand_oper, seal_state);
    let seal = cfg.actor(appl_type, seal_oper);

    let pred_oper = cfg.actor(type_pred_oper, brand);
    let pred = cfg.actor(appl_type, pred_oper);

    let unseal_state = cfg.heap.cons(brand, beh_ref(unseal_args_beh));
    let unseal_oper = cfg.actor(brand_oper, unseal_state);
    let unseal = cfg.actor(appl_type, unseal_oper);

    let nil = ctx::a_nil();
    let tail_state = cfg.heap.cons(unseal, nil);
    let tail = cfg.actor(cons_type, tail_state);
    let mid_state = cfg.heap.cons(pred, tail);
    let mid = cfg.actor(cons_type, mid_state);
    let head_state = cfg.heap.cons(seal, mid);
    let head = cfg.actor(cons_type, head_state);
    cfg.send(cust, head);
}
