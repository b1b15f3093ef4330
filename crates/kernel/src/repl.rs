//! Read-eval-print driving.
//!
//! Each load (file or interactive session) stacks a fresh environment on
//! the previous ground environment, reads forms one at a time, and fires
//! an `eval` request with a reporting customer. Dispatch runs in bounded
//! batches; pending timers advance the clock between batches.

use crate::ctx::{self, a_sink};
use crate::env::env_type;
use crate::error::KernelError;
use crate::io::{with_sink, ReadSource, Source};
use crate::plumbing::abort_beh;
use crate::read::{read_sexpr, EOF};
use abe_core::{Config, Event, RunOutcome, Value};
use std::path::Path;
use std::time::Duration;

/// How long to idle before advancing the clock when only timers remain.
const TICK_PAUSE: Duration = Duration::from_millis(10);

pub fn prompt() {
    with_sink(|sink| sink.put_str("\n> "));
}

/// Print a newline, then forward the stored value to the stored customer.
/// State is `(cust . value)` or `Nil`.
pub fn newline_beh(cfg: &mut Config, ev: &Event) {
    with_sink(|sink| sink.put('\n' as i64));
    let state = ev.state;
    if state.is_cell() {
        let cust = cfg.heap.first(state);
        if cust.is_actor() {
            let value = cfg.heap.rest(state);
            cfg.send(cust, value);
        }
    }
}

/// Write the received value, then pass it along. A second message means
/// the customer chain double-fired, which is a wedged configuration.
pub fn report_beh(cfg: &mut Config, ev: &Event) {
    let cust = ev.state;
    let value = ev.message;
    let state = cfg.heap.cons(cust, value);
    let k_write = cfg.actor(newline_beh, state);
    let a_write = cfg.heap.atom("write");
    let msg = cfg.heap.cons(k_write, a_write);
    cfg.send(value, msg);
    cfg.become_(abort_beh, Value::Nil);
}

/// Drive dispatch for one top-level form in REPL mode: exhausted budgets
/// are reported and draining continues; the loop ends when no work and no
/// timers remain.
pub fn run_repl(cfg: &mut Config, budget: usize) -> Result<(), KernelError> {
    if budget == 0 {
        return Ok(());
    }
    loop {
        match cfg.run(budget) {
            RunOutcome::Aborted(fault) => {
                tracing::debug!(%fault, queued = cfg.q_count(), "configuration aborted");
                return Err(fault.into());
            }
            RunOutcome::Exhausted => {
                if cfg.q_count() > 0 {
                    eprintln!("\nMessage limit of {} exceeded!", budget);
                    eprintln!("{} undelivered message(s)", cfg.q_count());
                }
                if cfg.t_count() == 0 && cfg.q_count() == 0 {
                    return Ok(());
                }
            }
            RunOutcome::Drained { remaining } => {
                tracing::trace!(delivered = budget - remaining, "batch drained");
                if cfg.t_count() == 0 {
                    return Ok(());
                }
            }
        }
        if cfg.t_count() > 0 {
            std::thread::sleep(TICK_PAUSE);
            cfg.tick();
        }
    }
}

/// Like `run_repl`, but an exhausted budget with work still queued is a
/// failure instead of a diagnostic.
pub fn run_test(cfg: &mut Config, budget: usize) -> Result<(), KernelError> {
    if budget == 0 {
        return Ok(());
    }
    loop {
        match cfg.run(budget) {
            RunOutcome::Aborted(fault) => return Err(fault.into()),
            RunOutcome::Exhausted => {
                if cfg.q_count() > 0 {
                    return Err(KernelError::Backlog {
                        queued: cfg.q_count(),
                    });
                }
                if cfg.t_count() == 0 {
                    return Ok(());
                }
            }
            RunOutcome::Drained { .. } => {
                if cfg.t_count() == 0 {
                    return Ok(());
                }
            }
        }
        if cfg.t_count() > 0 {
            std::thread::sleep(TICK_PAUSE);
            cfg.tick();
        }
    }
}

/// Stack a fresh environment over the current ground environment, pin it,
/// and make it the new ground. Definitions from one load remain visible
/// to the next.
pub fn push_env(cfg: &mut Config) -> Value {
    let parent = ctx::ground_env();
    let env_state = cfg.heap.cons(parent, Value::Nil);
    let env = cfg.actor(env_type, env_state);
    cfg.add_gc_root(env);
    ctx::set_ground_env(env);
    env
}

/// Read and evaluate every form from `src` in a freshly stacked
/// environment.
pub fn read_eval_print_loop(
    cfg: &mut Config,
    src: &mut dyn Source,
    interactive: bool,
    budget: usize,
) -> Result<(), KernelError> {
    let env = push_env(cfg);

    loop {
        if interactive {
            prompt();
        }
        let expr = read_sexpr(cfg, src);
        if expr == EOF {
            return Ok(());
        }
        if !expr.is_actor() {
            return Err(KernelError::Read(crate::plumbing::show(cfg, expr)));
        }
        let mut cust = a_sink();
        if interactive {
            cust = cfg.actor(report_beh, cust);
        }
        let a_eval = cfg.heap.atom("eval");
        let req = cfg.heap.cons(a_eval, env);
        let msg = cfg.heap.cons(cust, req);
        cfg.send(expr, msg);
        run_repl(cfg, budget)?;
        // between top-level forms the dispatcher is quiescent
        cfg.force_gc();
    }
}

/// Load a file of Kernel forms.
pub fn load_file(cfg: &mut Config, path: &Path, budget: usize) -> Result<(), KernelError> {
    let mut src = ReadSource::open(path)?;
    read_eval_print_loop(cfg, &mut src, false, budget)
}
