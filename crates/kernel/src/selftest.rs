//! Built-in test battery (`abek -t`) and evaluation helpers for tests.
//!
//! Each scenario echoes the expression, evaluates it with an asserting
//! customer, and runs the dispatcher to quiescence. The asserting actor
//! flips to a terminal behavior on success, so the host can verify the
//! outcome by peeking at its behavior slot afterwards.

use crate::ctx::{self, a_false, a_ignore, a_inert, a_true};
use crate::data::{get_number, get_symbol};
use crate::error::KernelError;
use crate::io::StrSource;
use crate::plumbing::{abort_beh, show};
use crate::pred::eq;
use crate::read::{read_sexpr, EOF};
use crate::repl::{newline_beh, report_beh, run_test};
use abe_core::{beh_ref, Config, Event, Value};

/// Latch the first message as this actor's state.
pub fn result_beh(cfg: &mut Config, ev: &Event) {
    cfg.become_(result_done_beh, ev.message);
}

/// Terminal state of `result_beh`; the latched value sits in the state
/// slot.
pub fn result_done_beh(_cfg: &mut Config, _ev: &Event) {}

/// Check the delivered value against the expectation; flip to the
/// terminal behavior on success, poison the configuration on mismatch.
pub fn assert_beh(cfg: &mut Config, ev: &Event) {
    let expect = ev.state;
    let actual = ev.message;
    if eq(&cfg.heap, expect, actual) {
        cfg.become_(abort_beh, Value::Nil);
    } else {
        let want = show(cfg, expect);
        let got = show(cfg, actual);
        cfg.abort(format!("expected {}, got {}", want, got));
    }
}

/// Evaluate one form from `text` in the ground environment and return the
/// value delivered to the customer.
pub fn eval_str(cfg: &mut Config, text: &str, budget: usize) -> Result<Value, KernelError> {
    let mut src = StrSource::new(text);
    let expr = read_sexpr(cfg, &mut src);
    if !expr.is_actor() {
        return Err(KernelError::Read(show(cfg, expr)));
    }
    let cust = cfg.actor(result_beh, Value::Nil);
    cfg.add_gc_root(cust);
    let env = ctx::ground_env();
    let a_eval = cfg.heap.atom("eval");
    let req = cfg.heap.cons(a_eval, env);
    let msg = cfg.heap.cons(cust, req);
    cfg.send(expr, msg);
    run_test(cfg, budget)?;
    if cfg.heap.first(cust) == beh_ref(result_done_beh) {
        Ok(cfg.heap.rest(cust))
    } else {
        Err(KernelError::TestFailed(format!(
            "no value delivered for {}",
            text
        )))
    }
}

fn assert_eval(
    cfg: &mut Config,
    expr: Value,
    expect: Value,
    budget: usize,
) -> Result<(), KernelError> {
    // echo the expression
    let echo = cfg.actor(newline_beh, Value::Nil);
    let a_write = cfg.heap.atom("write");
    let wmsg = cfg.heap.cons(echo, a_write);
    cfg.send(expr, wmsg);

    let checker = cfg.actor(assert_beh, expect);
    let cust = cfg.actor(report_beh, checker);
    let env = ctx::ground_env();
    let a_eval = cfg.heap.atom("eval");
    let req = cfg.heap.cons(a_eval, env);
    let emsg = cfg.heap.cons(cust, req);
    cfg.send(expr, emsg);
    run_test(cfg, budget)?;

    if cfg.heap.first(checker) == beh_ref(abort_beh) {
        Ok(())
    } else {
        Err(KernelError::TestFailed(
            "no value reached the asserting customer".to_string(),
        ))
    }
}

fn assert_eval_str(
    cfg: &mut Config,
    text: &str,
    expect: Value,
    budget: usize,
) -> Result<(), KernelError> {
    let mut src = StrSource::new(text);
    let expr = read_sexpr(cfg, &mut src);
    if !expr.is_actor() {
        return Err(KernelError::Read(show(cfg, expr)));
    }
    assert_eval(cfg, expr, expect, budget)
        .map_err(|e| KernelError::TestFailed(format!("{} <= {}", e, text)))
}

fn check_reader(cfg: &mut Config) -> Result<(), KernelError> {
    let checks: &[(&str, fn(&mut Config) -> Value)] = &[
        ("", |_| EOF),
        (" \r\n", |_| EOF),
        ("#t", |_| a_true()),
        ("#f", |_| a_false()),
        ("#ignore", |_| a_ignore()),
        ("#inert", |_| a_inert()),
        ("0", |cfg| get_number(cfg, Value::Int(0))),
        ("42", |cfg| get_number(cfg, Value::Int(42))),
        ("-1", |cfg| get_number(cfg, Value::Int(-1))),
        ("' '", |cfg| get_number(cfg, Value::Int(32))),
        ("'\\n'", |cfg| get_number(cfg, Value::Int(10))),
        ("-", |cfg| {
            let dash = cfg.heap.atom("-");
            get_symbol(cfg, dash)
        }),
        ("x", |cfg| {
            let x = cfg.heap.atom("x");
            get_symbol(cfg, x)
        }),
        ("(x (y", |_| EOF),
    ];
    for (text, want) in checks {
        let mut src = StrSource::new(text);
        let got = read_sexpr(cfg, &mut src);
        let want = want(cfg);
        if !eq(&cfg.heap, want, got) {
            return Err(KernelError::TestFailed(format!(
                "read {:?}: expected {}, got {}",
                text,
                show(cfg, want),
                show(cfg, got)
            )));
        }
    }
    Ok(())
}

/// The battery behind `abek -t`. Exercises the reader, then evaluates the
/// canonical scenarios through the full actor pipeline, and finishes with
/// a forced collection so heap damage shows up here and not later.
pub fn run_battery(cfg: &mut Config, budget: usize) -> Result<(), KernelError> {
    check_reader(cfg)?;

    let inert = a_inert();
    assert_eval(cfg, inert, inert, budget)?;

    let scenarios: &[(&str, fn(&mut Config) -> Value)] = &[
        ("(ignore? #ignore #inert)", |_| a_false()),
        ("(boolean? #t #f)", |_| a_true()),
        ("(number? 0 1 -1)", |_| a_true()),
        ("(($vau (x) #ignore x)  y)", |cfg| {
            let y = cfg.heap.atom("y");
            get_symbol(cfg, y)
        }),
        (
            "($sequence ($define! y #t) (($lambda (x) x) y))",
            |_| a_true(),
        ),
        ("(eq? #f (boolean? #t #f))", |_| a_false()),
        ("($if #t ($if #f 0 42) 314)", |cfg| {
            get_number(cfg, Value::Int(42))
        }),
        ("(eq? (cons 0 (cons 1 ())) (list 0 1))", |_| a_false()),
        ("(equal? (cons 0 (cons 1 ())) (list 0 1))", |_| a_true()),
        (
            "(eq? (copy-es-immutable (cons 0 1)) (copy-es-immutable (cons 0 1)))",
            |_| a_true(),
        ),
        (
            "($sequence (write (cons (list #t #f #inert #ignore) (cons 0 1))) (newline))",
            |_| a_true(),
        ),
        ("(($lambda ((#ignore . x)) x) (cons 0 1))", |cfg| {
            get_number(cfg, Value::Int(1))
        }),
        (
            "($sequence \
               ($define! (seal sealed? unseal) (make-encapsulation-type)) \
               ($define! x (seal 42)) \
               ($if (sealed? x) (unseal x) #f))",
            |cfg| get_number(cfg, Value::Int(42)),
        ),
        (
            "($sequence \
               ($define! f \
                 ($lambda x \
                   ($if (null? x) \
                     #inert \
                     (list (number? (car x)) (apply f (cdr x)))))) \
               (car (f 1 2 3)))",
            |_| a_true(),
        ),
        ("(+ 2 3 4)", |cfg| get_number(cfg, Value::Int(9))),
        ("(* 2 3 4)", |cfg| get_number(cfg, Value::Int(24))),
    ];
    for (text, want) in scenarios {
        let expect = want(cfg);
        assert_eval_str(cfg, text, expect, budget)?;
    }

    // clean up the garbage the battery created
    cfg.force_gc();
    Ok(())
}
