//! Leaf Kernel types.
//!
//! Every Kernel value is an actor whose behavior discriminates its type;
//! the generic message is `(customer . request)`. Types answer what they
//! understand and delegate the rest down a static chain that bottoms out
//! in `object_type`, which throws `Not-Understood`.

use crate::ctx::{self, a_inert, a_nil, a_true};
use crate::io::with_sink;
use crate::plumbing::{ensure, throw};
use abe_core::cons::{map_get_def, map_put, rplacd};
use abe_core::{beh_ref, Config, Event, Value};

/// Render a constant for the printer: numbers in decimal, atoms by name.
pub(crate) fn printable(cfg: &Config, v: Value) -> String {
    match v {
        Value::Int(n) => n.to_string(),
        Value::Atom(a) => cfg.heap.atom_name(a).to_string(),
        other => crate::plumbing::show(cfg, other),
    }
}

/// Base type: self-evaluating, already immutable, prints as a dotted tail.
pub fn object_type(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_eval = cfg.heap.atom("eval");
    let a_copy = cfg.heap.atom("copy_immutable");
    let a_write_tail = cfg.heap.atom("write_tail");

    if req.is_cell() && cfg.heap.first(req) == a_eval {
        cfg.send(cust, ev.target);
    } else if req == a_copy {
        cfg.send(cust, ev.target);
    } else if req.is_cell()
        && cfg.heap.first(req) == a_write_tail
        && cfg.heap.rest(req) == Value::Int(' ' as i64)
    {
        let state = cfg.heap.cons(cust, ev.target);
        let k_tail = cfg.actor(dotted_tail_beh, state);
        let ok = with_sink(|sink| sink.put_str(" . "));
        cfg.send(k_tail, ctx::boolean(ok));
    } else {
        let tag = cfg.heap.atom("Not-Understood");
        let detail = cfg.heap.cons(ev.target, req);
        let msg = cfg.heap.cons(tag, detail);
        throw(cfg, msg);
    }
}

/// After " . " went out, ask the trailing value to write itself.
pub fn dotted_tail_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let last = cfg.heap.rest(state);
    let ok = ev.message;

    if ok == a_true() {
        let k_close = cfg.actor(dotted_close_beh, cust);
        let a_write = cfg.heap.atom("write");
        let msg = cfg.heap.cons(k_close, a_write);
        cfg.send(last, msg);
    } else {
        cfg.send(cust, ok);
    }
}

/// Close the dotted tail with `)`.
pub fn dotted_close_beh(cfg: &mut Config, ev: &Event) {
    let cust = ev.state;
    ensure!(cfg, cust.is_actor());
    let ok = ev.message;

    if ok == a_true() {
        let done = with_sink(|sink| sink.put(')' as i64));
        cfg.send(cust, ctx::boolean(done));
    } else {
        cfg.send(cust, ok);
    }
}

/// Immutable constant wrapper around a host value.
pub fn const_type(cfg: &mut Config, ev: &Event) {
    let value = ev.state;
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_value = cfg.heap.atom("value");
    let a_write = cfg.heap.atom("write");

    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(const_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req == a_value {
        cfg.send(cust, value);
    } else if req == a_write {
        let text = printable(cfg, value);
        let ok = with_sink(|sink| sink.put_str(&text));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        object_type(cfg, ev);
    }
}

/// `#inert`.
pub fn unit_type(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_write = cfg.heap.atom("write");

    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(unit_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req == a_write {
        let ok = with_sink(|sink| sink.put_str("#inert"));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        object_type(cfg, ev);
    }
}

/// `()` -- the empty list is also the empty argument tuple and the empty
/// ptree, so it answers the whole traversal protocol.
pub fn null_type(cfg: &mut Config, ev: &Event) {
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
    let a_copy = cfg.heap.atom("copy_immutable");
    let a_map = cfg.heap.atom("map");
    let a_foldl = cfg.heap.atom("foldl");
    let a_write = cfg.heap.atom("write");
    let a_write_tail = cfg.heap.atom("write_tail");

    let head = if req.is_cell() {
        cfg.heap.first(req)
    } else {
        Value::Nil
    };

    if req.is_cell() && head == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(null_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req.is_cell() && head == a_eval {
        cfg.send(cust, ev.target);
    } else if req == a_as_pair || req == a_as_tuple {
        cfg.send(cust, Value::Nil);
    } else if req.is_cell()
        && head == a_match
        && cfg.heap.rest(req).is_cell()
        && cfg.heap.first(cfg.heap.rest(req)) == a_nil()
    {
        cfg.send(cust, a_inert());
    } else if req == a_copy {
        cfg.send(cust, ev.target);
    } else if req.is_cell() && head == a_map {
        let inner = cfg.heap.rest(req);
        let msg = cfg.heap.cons(cust, inner);
        cfg.send(ev.target, msg);
    } else if req.is_cell() && head == a_foldl && cfg.heap.rest(req).is_cell() {
        let zero = cfg.heap.first(cfg.heap.rest(req));
        cfg.send(cust, zero);
    } else if req == a_write {
        let ok = with_sink(|sink| sink.put_str("()"));
        cfg.send(cust, ctx::boolean(ok));
    } else if req.is_cell()
        && head == a_write_tail
        && cfg.heap.rest(req) == Value::Int(' ' as i64)
    {
        let ok = with_sink(|sink| sink.put(')' as i64));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        let tag = cfg.heap.atom("Not-Understood");
        let detail = cfg.heap.cons(ev.target, req);
        let msg = cfg.heap.cons(tag, detail);
        throw(cfg, msg);
    }
}

/// `#ignore` -- matches anything, binds nothing.
pub fn any_type(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_match = cfg.heap.atom("match");
    let a_write = cfg.heap.atom("write");

    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(any_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req.is_cell() && cfg.heap.first(req) == a_match {
        cfg.send(cust, a_inert());
    } else if req == a_write {
        let ok = with_sink(|sink| sink.put_str("#ignore"));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        object_type(cfg, ev);
    }
}

/// `#t` / `#f`. Holds the host truth value and steers `$if`.
pub fn bool_type(cfg: &mut Config, ev: &Event) {
    let value = ev.state;
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_if = cfg.heap.atom("if");
    let a_write = cfg.heap.atom("write");

    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(bool_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req.is_cell()
        && cfg.heap.first(req) == a_if
        && cfg.heap.rest(req).is_cell()
        && cfg.heap.rest(cfg.heap.rest(req)).is_cell()
    {
        let rest = cfg.heap.rest(req);
        let cnsq = cfg.heap.first(rest);
        let more = cfg.heap.rest(rest);
        let altn = cfg.heap.first(more);
        let env = cfg.heap.rest(more);

        let chosen = if value == Value::True { cnsq } else { altn };
        let a_eval = cfg.heap.atom("eval");
        let req = cfg.heap.cons(a_eval, env);
        let msg = cfg.heap.cons(cust, req);
        cfg.send(chosen, msg);
    } else if req == a_write {
        let text = if value == Value::True { "#t" } else { "#f" };
        let ok = with_sink(|sink| sink.put_str(text));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        object_type(cfg, ev);
    }
}

/// Machine-word integers, delegating constant duties to `const_type`.
pub fn number_type(cfg: &mut Config, ev: &Event) {
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(number_type);
        cfg.send(cust, ctx::boolean(hit));
    } else {
        const_type(cfg, ev);
    }
}

/// Wrap a host integer as a Kernel number.
pub fn get_number(cfg: &mut Config, value: Value) -> Value {
    debug_assert!(value.is_number());
    cfg.actor(number_type, value)
}

/// Extract the host integer from a Kernel number, `False` otherwise.
pub fn number_value(heap: &abe_core::Heap, number: Value) -> Value {
    if number.is_actor() && heap.first(number) == beh_ref(number_type) {
        return heap.rest(number);
    }
    Value::False
}

/// Interned identifiers. Evaluation is an environment lookup; as a ptree
/// a symbol binds whatever it is matched against.
pub fn symbol_type(cfg: &mut Config, ev: &Event) {
    let name = ev.state;
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let cust = cfg.heap.first(msg);
    ensure!(cfg, cust.is_actor());
    let req = cfg.heap.rest(msg);

    let a_type_eq = cfg.heap.atom("type_eq");
    let a_eval = cfg.heap.atom("eval");
    let a_match = cfg.heap.atom("match");
    let a_write = cfg.heap.atom("write");

    if req.is_cell() && cfg.heap.first(req) == a_type_eq {
        let hit = cfg.heap.rest(req) == beh_ref(symbol_type);
        cfg.send(cust, ctx::boolean(hit));
    } else if req.is_cell() && cfg.heap.first(req) == a_eval {
        let env = cfg.heap.rest(req);
        let a_lookup = cfg.heap.atom("lookup");
        let req = cfg.heap.cons(a_lookup, name);
        let msg = cfg.heap.cons(cust, req);
        cfg.send(env, msg);
    } else if req.is_cell() && cfg.heap.first(req) == a_match && cfg.heap.rest(req).is_cell() {
        let rest = cfg.heap.rest(req);
        let value = cfg.heap.first(rest);
        let env = cfg.heap.rest(rest);
        let a_bind = cfg.heap.atom("bind");
        let binding = cfg.heap.cons(name, value);
        let req = cfg.heap.cons(a_bind, binding);
        let msg = cfg.heap.cons(cust, req);
        cfg.send(env, msg);
    } else if req == a_write {
        let text = printable(cfg, name);
        let ok = with_sink(|sink| sink.put_str(&text));
        cfg.send(cust, ctx::boolean(ok));
    } else {
        object_type(cfg, ev);
    }
}

/// Intern a symbol actor by atom name; spellings share one actor.
pub fn get_symbol(cfg: &mut Config, name: Value) -> Value {
    debug_assert!(name.is_atom());
    let intern = ctx::intern_map();
    let symbol_map = cfg.heap.rest(intern);
    let found = map_get_def(&cfg.heap, symbol_map, name, Value::Nil);
    if found != Value::Nil {
        return found;
    }
    let symbol = cfg.actor(symbol_type, name);
    let symbol_map = map_put(&mut cfg.heap, symbol_map, name, symbol);
    rplacd(&mut cfg.heap, intern, symbol_map);
    symbol
}
