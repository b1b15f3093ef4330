//! Environments and pattern matching.
//!
//! An environment actor wraps `(parent . map)` where the map is an
//! association list of symbol bindings. Lookup walks the parent chain by
//! forwarding the original request; binding mutates the local map.
//! `match_ptree` is the host fast path the special forms use to destructure
//! a value against a parameter tree.

use crate::ctx::{self, a_ignore, a_inert, a_nil};
use crate::data::{object_type, symbol_type};
use crate::io::with_sink;
use crate::pair::{cons_type, pair_type};
use crate::plumbing::{ensure, throw};
use abe_core::cons::{map_find, map_put, rplacd};
use abe_core::{beh_ref, Config, Event, Value};

/// Environment actor.
pub fn env_type(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let parent = cfg.heap.first(state);
    let map = cfg.heap.rest(state);
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_lookup = cfg.heap.atom("lookup");
    let a_bind = cfg.heap.atom("bind");
    let a_write = cfg.heap.atom("write");

    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(env_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req.is_cell() && cfg.heap.first(req) == a_lookup {
        let key = cfg.heap.rest(req);
        let binding = map_find(&cfg.heap, map, key);
        if binding == Value::Nil {
            if parent == Value::Nil {
                let tag = cfg.heap.atom("Undefined");
                let report = cfg.heap.cons(tag, key);
                throw(cfg, report);
            } else {
                cfg.send(parent, msg);
            }
        } else {
            let value = cfg.heap.rest(binding);
            cfg.send(cust, value);
        }
    } else if req.is_cell() && cfg.heap.first(req) == a_bind && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let key = cfg.heap.first(rest);
        let value = cfg.heap.rest(rest);
        let binding = map_find(&cfg.heap, map, key);
        if binding == Value::Nil {
            let map = map_put(&mut cfg.heap, map, key, value);
            let state = cfg.heap.cons(parent, map);
            cfg.become_(env_type, state);
        } else {
            rplacd(&mut cfg.heap, binding, value);
        }
        cfg.send(cust, a_inert());
    } else if req == a_write {
        let ok = with_sink(|sink| sink.put_str("#environment"));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        object_type(cfg, ev);
    }
}

/// Match `value` against `ptree`, binding symbols into `env` by direct
/// map mutation. Returns `#inert` on success, `Nil` on failure.
pub fn match_ptree(cfg: &mut Config, value: Value, ptree: Value, env: Value) -> Value {
    if ptree == a_ignore() {
        return a_inert();
    }
    if ptree == a_nil() && value == a_nil() {
        return a_inert();
    }
    if !ptree.is_actor() {
        return Value::Nil;
    }
    let beh = cfg.heap.first(ptree);
    if beh == beh_ref(cons_type) || beh == beh_ref(pair_type) {
        let p = cfg.heap.rest(ptree);
        if !value.is_actor() {
            return Value::Nil;
        }
        let v_beh = cfg.heap.first(value);
        if v_beh != beh_ref(cons_type) && v_beh != beh_ref(pair_type) {
            return Value::Nil;
        }
        let v = cfg.heap.rest(value);
        let (v_head, v_tail) = (cfg.heap.first(v), cfg.heap.rest(v));
        let (p_head, p_tail) = (cfg.heap.first(p), cfg.heap.rest(p));
        if match_ptree(cfg, v_head, p_head, env) == a_inert()
            && match_ptree(cfg, v_tail, p_tail, env) == a_inert()
        {
            return a_inert();
        }
        return Value::Nil;
    }
    if beh == beh_ref(symbol_type) {
        if !env.is_actor() || cfg.heap.first(env) != beh_ref(env_type) {
            return Value::Nil;
        }
        let state = cfg.heap.rest(env);
        let map = cfg.heap.rest(state);
        let key = cfg.heap.rest(ptree);
        let binding = map_find(&cfg.heap, map, key);
        if binding == Value::Nil {
            let map = map_put(&mut cfg.heap, map, key, value);
            rplacd(&mut cfg.heap, state, map);
        } else {
            rplacd(&mut cfg.heap, binding, value);
        }
        return a_inert();
    }
    Value::Nil
}

/// `(make-environment parent?)` -- a fresh empty environment, optionally
/// chained under a single parent.
pub fn make_env_args_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());

    let mut parent = ev.message;
    if parent.is_cell() {
        ensure!(cfg, cfg.heap.rest(parent) == Value::Nil);
        parent = cfg.heap.first(parent);
        ensure!(cfg, parent.is_actor());
    }
    let env_state = cfg.heap.cons(parent, Value::Nil);
    let env = cfg.actor(env_type, env_state);
    cfg.send(cust, env);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::get_symbol;
    use crate::ground::init_kernel;
    use abe_core::cons::map_get;
    use abe_core::Config;

    fn setup() -> Config {
        let mut cfg = Config::new(1000);
        init_kernel(&mut cfg);
        cfg
    }

    fn empty_env(cfg: &mut Config) -> Value {
        let state = cfg.heap.cons(Value::Nil, Value::Nil);
        cfg.actor(env_type, state)
    }

    #[test]
    fn test_match_symbol_binds() {
        let mut cfg = setup();
        let env = empty_env(&mut cfg);
        let name = cfg.heap.atom("x");
        let sym = get_symbol(&mut cfg, name);
        let value = crate::ctx::a_true();
        assert_eq!(match_ptree(&mut cfg, value, sym, env), a_inert());
        let map = cfg.heap.rest(cfg.heap.rest(env));
        assert_eq!(map_get(&cfg.heap, map, name), value);
    }

    #[test]
    fn test_match_ignore_and_nil() {
        let mut cfg = setup();
        let env = empty_env(&mut cfg);
        assert_eq!(
            match_ptree(&mut cfg, crate::ctx::a_false(), a_ignore(), env),
            a_inert()
        );
        assert_eq!(match_ptree(&mut cfg, a_nil(), a_nil(), env), a_inert());
        // () only matches ()
        assert_eq!(match_ptree(&mut cfg, crate::ctx::a_true(), a_nil(), env), Value::Nil);
    }

    #[test]
    fn test_match_pair_recurses() {
        let mut cfg = setup();
        let env = empty_env(&mut cfg);
        let ax = cfg.heap.atom("x");
        let ay = cfg.heap.atom("y");
        let x = get_symbol(&mut cfg, ax);
        let y = get_symbol(&mut cfg, ay);
        let pstate = cfg.heap.cons(x, y);
        let ptree = cfg.actor(pair_type, pstate);
        let one = crate::data::get_number(&mut cfg, Value::Int(1));
        let two = crate::data::get_number(&mut cfg, Value::Int(2));
        let vstate = cfg.heap.cons(one, two);
        let value = cfg.actor(cons_type, vstate);
        assert_eq!(match_ptree(&mut cfg, value, ptree, env), a_inert());
        let map = cfg.heap.rest(cfg.heap.rest(env));
        assert_eq!(map_get(&cfg.heap, map, ax), one);
        assert_eq!(map_get(&cfg.heap, map, ay), two);
    }

    #[test]
    fn test_match_rejects_non_pair_value() {
        let mut cfg = setup();
        let env = empty_env(&mut cfg);
        let ax = cfg.heap.atom("x");
        let x = get_symbol(&mut cfg, ax);
        let pstate = cfg.heap.cons(x, x);
        let ptree = cfg.actor(pair_type, pstate);
        assert_eq!(
            match_ptree(&mut cfg, crate::ctx::a_true(), ptree, env),
            Value::Nil
        );
    }
}
