//! An actor-based evaluator for a Kernel-family Lisp (Shutt's vau
//! calculus), built on the `abe-core` cell heap and configuration.
//!
//! Every Kernel value is an actor; every evaluation step, pattern match,
//! environment lookup, and combiner application is a message send in
//! continuation-passing style. The behavior chain per type bottoms out in
//! `object_type`, which throws `Not-Understood`.
//!
//! # Modules
//!
//! - `ctx`: per-configuration singletons (`#inert`, `()`, `#t`, ...)
//! - `io`: character sources and sinks
//! - `plumbing`: tag/fork/join dataflow, THROW, `ensure!`
//! - `data`: leaf types (unit, null, ignore, boolean, number, symbol)
//! - `pair`: mutable cons and immutable pair
//! - `env`: environments and the ptree matcher
//! - `comb`: operatives, applicatives, `$vau`, `$lambda`, special forms
//! - `maplist`: the n-ary `map` applicative
//! - `num`: arithmetic, relations, type predicates
//! - `brand`: `make-encapsulation-type`
//! - `pred`: host `eq`/`eq_now`
//! - `ground`: ground environment construction
//! - `read`: s-expression reader
//! - `repl`: read-eval-print driving
//! - `selftest`: the `-t` battery and eval helpers

pub mod brand;
pub mod comb;
pub mod ctx;
pub mod data;
pub mod env;
mod error;
pub mod io;
pub mod maplist;
pub mod num;
pub mod pair;
pub mod plumbing;
pub mod pred;
pub mod read;
pub mod repl;
pub mod selftest;

pub mod ground;

pub use error::KernelError;
pub use ground::init_kernel;
