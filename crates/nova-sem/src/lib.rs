//! Static type checking for the Nova AST.
//!
//! [`check`] runs in two phases: collecting every function's signature so
//! forward and mutually recursive calls resolve, then checking each body
//! against its own signature with a scope that is copied — not shared —
//! into each `if`/`while` branch, so a binding introduced in one branch
//! never leaks into its sibling or the parent.

mod checker;
mod error;
mod sig;

pub use checker::check;
pub use error::TypeError;
pub use sig::{builtin_signatures, FunctionSig, MAX_PARAMS};
