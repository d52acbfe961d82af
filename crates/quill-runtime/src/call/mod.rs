//! Host call API
//!
//! Entry points a host (or native function) uses to invoke callables sitting
//! on the operand stack:
//!
//! | operation                     | stack before                   | after          |
//! |-------------------------------|--------------------------------|----------------|
//! | [`call`](crate::Context::call)       | `func args*n`                  | `result`       |
//! | [`call_method`](crate::Context::call_method) | `func this args*n`     | `result`       |
//! | [`call_prop`](crate::Context::call_prop) | `key args*n` (object at `obj_idx`) | `result` |
//! | [`construct`](crate::Context::construct) | `ctor args*n`              | `instance`     |
//!
//! Each has a protected variant returning a [`CallStatus`](crate::CallStatus)
//! and leaving either the result or the error value in the same place.

mod bound;
mod dispatch;
mod index;
mod magic;
mod protected;
mod query;
