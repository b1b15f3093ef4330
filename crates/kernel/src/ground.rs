//! Ground environment construction.
//!
//! `init_kernel` creates the distinguished singletons, pins them as GC
//! roots, binds every primitive combiner into the ground map, and installs
//! the thread-local context the behaviors read. Call it exactly once per
//! configuration, before any dispatch.

use crate::brand::brand_args_beh;
use crate::comb::{
    appl_type, apply_args_beh, args_oper, car_oper, cdr_oper, concurrent_oper, cons_args_beh,
    copy_es_immutable_args_beh, define_args_beh, eval_args_beh, if_args_beh, lambda_oper,
    list_oper, newline_args_beh, oper_type, sequence_oper, set_car_args_beh, set_cdr_args_beh,
    unwrap_args_beh, vau_oper, wrap_args_beh, write_args_beh,
};
use crate::ctx::{self, Singletons};
use crate::data::{any_type, bool_type, null_type, number_type, symbol_type, unit_type};
use crate::env::{env_type, make_env_args_beh};
use crate::maplist::map_args_beh;
use crate::num::{
    num_eq_rel, num_foldl_oper, num_ge_rel, num_gt_rel, num_le_rel, num_lt_rel, num_plus_op,
    num_rel_oper, num_times_op, obj_rel_oper, type_pred_oper,
};
use crate::pair::pair_type;
use crate::plumbing::sink_beh;
use crate::pred::{eq_now_rel, eq_rel};
use abe_core::cons::map_put;
use abe_core::{beh_ref, bin_ref, Beh, Config, Value};

fn appl(cfg: &mut Config, oper: Value) -> Value {
    cfg.actor(appl_type, oper)
}

/// `appl_type` around an `args_oper` naming a continuation behavior.
fn args_appl(cfg: &mut Config, args_beh: Beh) -> Value {
    let oper = cfg.actor(args_oper, beh_ref(args_beh));
    appl(cfg, oper)
}

fn bind(cfg: &mut Config, map: Value, name: &str, value: Value) -> Value {
    let key = cfg.heap.atom(name);
    map_put(&mut cfg.heap, map, key, value)
}

/// Build the Kernel world on `cfg` and install the thread-local context.
pub fn init_kernel(cfg: &mut Config) -> Singletons {
    let intern = cfg.heap.cons(Value::Nil, Value::Nil);
    cfg.add_gc_root(intern);

    let sink = cfg.actor(sink_beh, Value::Nil);
    cfg.add_gc_root(sink);

    let inert = cfg.actor(unit_type, Value::Nil);
    cfg.add_gc_root(inert);
    let nil = cfg.actor(null_type, Value::Nil);
    cfg.add_gc_root(nil);
    let ignore = cfg.actor(any_type, Value::Nil);
    cfg.add_gc_root(ignore);
    let t = cfg.actor(bool_type, Value::True);
    cfg.add_gc_root(t);
    let f = cfg.actor(bool_type, Value::False);
    cfg.add_gc_root(f);

    let mut map = Value::Nil;

    let v = args_appl(cfg, brand_args_beh);
    map = bind(cfg, map, "make-encapsulation-type", v);

    let state = cfg.heap.cons(Value::Int(0), bin_ref(num_plus_op));
    let oper = cfg.actor(num_foldl_oper, state);
    let v = appl(cfg, oper);
    map = bind(cfg, map, "+", v);

    let state = cfg.heap.cons(Value::Int(1), bin_ref(num_times_op));
    let oper = cfg.actor(num_foldl_oper, state);
    let v = appl(cfg, oper);
    map = bind(cfg, map, "*", v);

    for (name, rel) in [
        ("=?", bin_ref(num_eq_rel)),
        ("<?", bin_ref(num_lt_rel)),
        ("<=?", bin_ref(num_le_rel)),
        (">=?", bin_ref(num_ge_rel)),
        (">?", bin_ref(num_gt_rel)),
    ] {
        let oper = cfg.actor(num_rel_oper, rel);
        let v = appl(cfg, oper);
        map = bind(cfg, map, name, v);
    }

    let v = args_appl(cfg, map_args_beh);
    map = bind(cfg, map, "map", v);

    let v = cfg.actor(concurrent_oper, Value::Nil);
    map = bind(cfg, map, "$concurrent", v);

    let v = args_appl(cfg, make_env_args_beh);
    map = bind(cfg, map, "make-environment", v);
    let v = args_appl(cfg, eval_args_beh);
    map = bind(cfg, map, "eval", v);
    let v = args_appl(cfg, apply_args_beh);
    map = bind(cfg, map, "apply", v);
    let v = args_appl(cfg, copy_es_immutable_args_beh);
    map = bind(cfg, map, "copy-es-immutable", v);
    let v = args_appl(cfg, set_car_args_beh);
    map = bind(cfg, map, "set-car!", v);
    let v = args_appl(cfg, set_cdr_args_beh);
    map = bind(cfg, map, "set-cdr!", v);
    let v = args_appl(cfg, newline_args_beh);
    map = bind(cfg, map, "newline", v);
    let v = args_appl(cfg, write_args_beh);
    map = bind(cfg, map, "write", v);
    let v = args_appl(cfg, cons_args_beh);
    map = bind(cfg, map, "cons", v);

    let oper = cfg.actor(car_oper, Value::Nil);
    let v = appl(cfg, oper);
    map = bind(cfg, map, "car", v);
    let oper = cfg.actor(cdr_oper, Value::Nil);
    let v = appl(cfg, oper);
    map = bind(cfg, map, "cdr", v);

    // $if is an operative: its operands reach it unevaluated
    let v = cfg.actor(args_oper, beh_ref(if_args_beh));
    map = bind(cfg, map, "$if", v);

    let oper = cfg.actor(obj_rel_oper, bin_ref(eq_rel));
    let v = appl(cfg, oper);
    map = bind(cfg, map, "eq?", v);
    let oper = cfg.actor(obj_rel_oper, bin_ref(eq_now_rel));
    let v = appl(cfg, oper);
    map = bind(cfg, map, "equal?", v);

    let v = cfg.actor(lambda_oper, Value::Nil);
    map = bind(cfg, map, "$lambda", v);
    let v = args_appl(cfg, unwrap_args_beh);
    map = bind(cfg, map, "unwrap", v);
    let v = args_appl(cfg, wrap_args_beh);
    map = bind(cfg, map, "wrap", v);
    let v = cfg.actor(vau_oper, Value::Nil);
    map = bind(cfg, map, "$vau", v);
    let v = cfg.actor(args_oper, beh_ref(define_args_beh));
    map = bind(cfg, map, "$define!", v);
    let v = cfg.actor(sequence_oper, Value::Nil);
    map = bind(cfg, map, "$sequence", v);
    let oper = cfg.actor(list_oper, Value::Nil);
    let v = appl(cfg, oper);
    map = bind(cfg, map, "list", v);

    for (name, type_ref) in [
        ("number?", beh_ref(number_type)),
        ("environment?", beh_ref(env_type)),
        ("operative?", beh_ref(oper_type)),
        ("applicative?", beh_ref(appl_type)),
        ("symbol?", beh_ref(symbol_type)),
        ("ignore?", beh_ref(any_type)),
        ("inert?", beh_ref(unit_type)),
        ("boolean?", beh_ref(bool_type)),
        ("pair?", beh_ref(pair_type)),
        ("null?", beh_ref(null_type)),
    ] {
        let oper = cfg.actor(type_pred_oper, type_ref);
        let v = appl(cfg, oper);
        map = bind(cfg, map, name, v);
    }

    let env_state = cfg.heap.cons(Value::Nil, map);
    let ground = cfg.actor(env_type, env_state);
    cfg.add_gc_root(ground);

    let singletons = Singletons {
        inert,
        nil,
        ignore,
        t,
        f,
        sink,
        intern,
        ground,
    };
    ctx::install(singletons);
    singletons
}
