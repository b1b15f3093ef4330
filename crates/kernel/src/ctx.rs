//! Per-configuration Kernel singletons.
//!
//! The distinguished actors (`#inert`, `()`, `#ignore`, `#t`, `#f`), the
//! sink, the symbol intern map, and the current ground environment must be
//! reachable from every behavior. Behaviors only receive `(cfg, event)`,
//! so these live in a thread-local slot installed by `init_kernel`, the
//! same role the file statics played in the original. The values are all
//! pinned as GC roots of the owning configuration.

use abe_core::Value;
use std::cell::Cell;

#[derive(Clone, Copy)]
pub struct Singletons {
    pub inert: Value,
    pub nil: Value,
    pub ignore: Value,
    pub t: Value,
    pub f: Value,
    /// Actor that swallows every message.
    pub sink: Value,
    /// `(constant-map . symbol-map)` interning cell.
    pub intern: Value,
    /// Current ground environment actor. Each REPL stacks a child on top.
    pub ground: Value,
}

thread_local! {
    static KERNEL: Cell<Option<Singletons>> = const { Cell::new(None) };
}

pub(crate) fn install(s: Singletons) {
    KERNEL.with(|k| k.set(Some(s)));
}

/// The singletons of the configuration driven on this thread.
pub fn kernel() -> Singletons {
    KERNEL
        .with(|k| k.get())
        .expect("kernel singletons not initialized on this thread")
}

pub fn a_inert() -> Value {
    kernel().inert
}

pub fn a_nil() -> Value {
    kernel().nil
}

pub fn a_ignore() -> Value {
    kernel().ignore
}

pub fn a_true() -> Value {
    kernel().t
}

pub fn a_false() -> Value {
    kernel().f
}

pub fn a_sink() -> Value {
    kernel().sink
}

pub(crate) fn intern_map() -> Value {
    kernel().intern
}

/// The environment new top-level forms evaluate in.
pub fn ground_env() -> Value {
    kernel().ground
}

pub(crate) fn set_ground_env(env: Value) {
    KERNEL.with(|k| {
        let mut s = k.get().expect("kernel singletons not initialized");
        s.ground = env;
        k.set(Some(s));
    });
}

/// Kernel boolean actor for a host truth value.
pub fn boolean(flag: bool) -> Value {
    if flag { a_true() } else { a_false() }
}
