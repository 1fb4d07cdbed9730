//! x86-64 code generation for a type-checked Nova program.
//!
//! [`generate`] is the only entry point: string interning and frame
//! layout are internal prepasses, and the expression emitter is a single
//! recursive walk that always leaves its result in `rax`.

mod codegen;
mod frame;
mod strings;

pub use codegen::generate;
