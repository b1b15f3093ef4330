//! Actor plumbing shared by the Kernel types.
//!
//! Tag/fork/join are the dataflow idioms the evaluator is built from: a
//! fork sends two requests out, the joins gather both replies back into a
//! single `(first . rest)` message for the customer. `throw` carries
//! Kernel-level failures to a reporting actor; `ensure!` is the invariant
//! guard behaviors open with.

use abe_core::{Config, Event, Value};

/// Guard a behavior invariant. On violation, THROW an `(AT file line)`
/// report and return from the behavior.
macro_rules! ensure {
    ($cfg:expr, $cond:expr) => {
        if !($cond) {
            $crate::plumbing::throw_at($cfg, file!(), line!());
            return;
        }
    };
}
pub(crate) use ensure;

/// Send `msg` to a fresh reporting actor: print and continue.
pub fn throw(cfg: &mut Config, msg: Value) {
    let reporter = cfg.actor(throw_beh, Value::Nil);
    cfg.send(reporter, msg);
}

pub(crate) fn throw_at(cfg: &mut Config, file: &str, line: u32) {
    let at = cfg.heap.atom("AT");
    let place = cfg.heap.atom(file);
    let detail = cfg.heap.cons(place, Value::Int(line as i64));
    let msg = cfg.heap.cons(at, detail);
    throw(cfg, msg);
}

/// Render a value for diagnostics. Depth-bounded so cyclic structure
/// cannot hang a failure report.
pub fn show(cfg: &Config, v: Value) -> String {
    fn go(cfg: &Config, v: Value, depth: usize, out: &mut String) {
        if depth == 0 {
            out.push_str("...");
            return;
        }
        match v {
            Value::Nil => out.push_str("()"),
            Value::True => out.push_str("#true"),
            Value::False => out.push_str("#false"),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Atom(a) => out.push_str(cfg.heap.atom_name(a)),
            Value::Func(_) => out.push_str("#<code>"),
            Value::Actor(_) => out.push_str("#<actor>"),
            Value::Cell(_) => {
                out.push('(');
                let mut p = v;
                loop {
                    let head = cfg.heap.first(p);
                    go(cfg, head, depth - 1, out);
                    let tail = cfg.heap.rest(p);
                    match tail {
                        Value::Nil => break,
                        Value::Cell(_) => {
                            out.push(' ');
                            p = tail;
                        }
                        other => {
                            out.push_str(" . ");
                            go(cfg, other, depth - 1, out);
                            break;
                        }
                    }
                }
                out.push(')');
            }
        }
    }
    let mut out = String::new();
    go(cfg, v, 16, &mut out);
    out
}

/// Reporting actor: print the failure and carry on.
pub fn throw_beh(cfg: &mut Config, ev: &Event) {
    let text = show(cfg, ev.message);
    tracing::debug!(%text, "FAIL!");
    crate::io::with_sink(|sink| sink.put_str(&format!("FAIL! {}\n", text)));
}

/// Terminal actor: a message here means the configuration is wedged.
pub fn abort_beh(cfg: &mut Config, ev: &Event) {
    let text = show(cfg, ev.message);
    eprintln!("ABORT! {}", text);
    cfg.abort(format!("ABORT! {}", text));
}

/// Swallow every message.
pub fn sink_beh(_cfg: &mut Config, _ev: &Event) {}

/// Forward the stored message to whatever actor arrives.
pub fn command_beh(cfg: &mut Config, ev: &Event) {
    let msg = ev.state;
    let actor = ev.message;
    ensure!(cfg, actor.is_actor());
    cfg.send(actor, msg);
}

/// Stamp replies with this actor's identity: `cust <- (SELF . msg)`.
pub fn tag_beh(cfg: &mut Config, ev: &Event) {
    let cust = ev.state;
    ensure!(cfg, cust.is_actor());
    let reply = cfg.heap.cons(ev.target, ev.message);
    cfg.send(cust, reply);
}

/// Wait for the second half once the first arrived: state is
/// `(cust . (k_rest . first))`, accepting `(k_rest . rest)`.
pub fn join_rest_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let inner = cfg.heap.rest(state);
    ensure!(cfg, inner.is_cell());
    let k_rest = cfg.heap.first(inner);
    let first = cfg.heap.rest(inner);

    let msg = ev.message;
    if msg.is_cell() && cfg.heap.first(msg) == k_rest {
        let rest = cfg.heap.rest(msg);
        let reply = cfg.heap.cons(first, rest);
        cfg.send(cust, reply);
    }
}

/// Mirror of `join_rest_beh`: state `(cust . (k_first . rest))`.
pub fn join_first_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let inner = cfg.heap.rest(state);
    ensure!(cfg, inner.is_cell());
    let k_first = cfg.heap.first(inner);
    let rest = cfg.heap.rest(inner);

    let msg = ev.message;
    if msg.is_cell() && cfg.heap.first(msg) == k_first {
        let first = cfg.heap.rest(msg);
        let reply = cfg.heap.cons(first, rest);
        cfg.send(cust, reply);
    }
}

/// Gather two tagged replies in either arrival order. State is
/// `(cust . (k_first . k_rest))`.
pub fn join_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let inner = cfg.heap.rest(state);
    ensure!(cfg, inner.is_cell());
    let k_first = cfg.heap.first(inner);
    let k_rest = cfg.heap.rest(inner);

    let msg = ev.message;
    if !msg.is_cell() {
        return;
    }
    let tag = cfg.heap.first(msg);
    let body = cfg.heap.rest(msg);
    if tag == k_first {
        let pending = cfg.heap.cons(k_rest, body);
        let state = cfg.heap.cons(cust, pending);
        cfg.become_(join_rest_beh, state);
    } else if tag == k_rest {
        let pending = cfg.heap.cons(k_first, body);
        let state = cfg.heap.cons(cust, pending);
        cfg.become_(join_first_beh, state);
    }
}

/// Split a `(h_req . t_req)` message across two actors and join the
/// replies. State is `(cust . (head . tail))`.
pub fn fork_beh(cfg: &mut Config, ev: &Event) {
    let state = ev.state;
    ensure!(cfg, state.is_cell());
    let cust = cfg.heap.first(state);
    ensure!(cfg, cust.is_actor());
    let inner = cfg.heap.rest(state);
    ensure!(cfg, inner.is_cell());
    let head = cfg.heap.first(inner);
    ensure!(cfg, head.is_actor());
    let tail = cfg.heap.rest(inner);
    ensure!(cfg, tail.is_actor());
    let msg = ev.message;
    ensure!(cfg, msg.is_cell());
    let h_req = cfg.heap.first(msg);
    let t_req = cfg.heap.rest(msg);

    let k_head = cfg.actor(tag_beh, ev.target);
    let k_tail = cfg.actor(tag_beh, ev.target);
    let to_head = cfg.heap.cons(k_head, h_req);
    cfg.send(head, to_head);
    let to_tail = cfg.heap.cons(k_tail, t_req);
    cfg.send(tail, to_tail);
    let keys = cfg.heap.cons(k_head, k_tail);
    let state = cfg.heap.cons(cust, keys);
    cfg.become_(join_beh, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use abe_core::{Config, RunOutcome};

    fn latch_beh(cfg: &mut Config, ev: &Event) {
        cfg.become_(latch_done_beh, ev.message);
    }

    fn latch_done_beh(_cfg: &mut Config, _ev: &Event) {}

    fn echo_beh(cfg: &mut Config, ev: &Event) {
        let cust = cfg.heap.first(ev.message);
        let body = cfg.heap.rest(ev.message);
        cfg.send(cust, body);
    }

    #[test]
    fn test_tag_stamps_identity() {
        let mut cfg = Config::new(64);
        let latch = cfg.actor(latch_beh, Value::Nil);
        let tag = cfg.actor(tag_beh, latch);
        cfg.send(tag, Value::Int(5));
        assert!(matches!(cfg.run(10), RunOutcome::Drained { .. }));
        let got = cfg.heap.rest(latch);
        assert_eq!(cfg.heap.first(got), tag);
        assert_eq!(cfg.heap.rest(got), Value::Int(5));
    }

    #[test]
    fn test_fork_join_pairs_replies() {
        let mut cfg = Config::new(64);
        let latch = cfg.actor(latch_beh, Value::Nil);
        let head = cfg.actor(echo_beh, Value::Nil);
        let tail = cfg.actor(echo_beh, Value::Nil);
        let pair = cfg.heap.cons(head, tail);
        let state = cfg.heap.cons(latch, pair);
        let fork = cfg.actor(fork_beh, state);
        let msg = cfg.heap.cons(Value::Int(1), Value::Int(2));
        cfg.send(fork, msg);
        assert!(matches!(cfg.run(100), RunOutcome::Drained { .. }));
        let got = cfg.heap.rest(latch);
        assert!(got.is_cell());
        assert_eq!(cfg.heap.first(got), Value::Int(1));
        assert_eq!(cfg.heap.rest(got), Value::Int(2));
    }

    #[test]
    fn test_command_forwards_to_arriving_actor() {
        let mut cfg = Config::new(64);
        let latch = cfg.actor(latch_beh, Value::Nil);
        let command = cfg.actor(command_beh, Value::Int(7));
        cfg.send(command, latch);
        assert!(matches!(cfg.run(10), RunOutcome::Drained { .. }));
        assert_eq!(cfg.heap.rest(latch), Value::Int(7));
    }

    #[test]
    fn test_show_renders_structure() {
        let mut cfg = Config::new(8);
        let tag = cfg.heap.atom("Undefined");
        let name = cfg.heap.atom("x");
        let msg = cfg.heap.cons(tag, name);
        assert_eq!(show(&cfg, msg), "(Undefined . x)");
        let list = cfg.heap.cons(Value::Int(2), Value::Nil);
        let list = cfg.heap.cons(Value::Int(1), list);
        assert_eq!(show(&cfg, list), "(1 2)");
    }
}
