//! Concurrency primitives, the batched DNS resolution protocol and the
//! interface directory, built on [`netatlas_common`]'s value types.

pub mod interfaces;
pub mod resolver;
pub mod tasks;
