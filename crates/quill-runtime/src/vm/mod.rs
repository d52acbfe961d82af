//! Execution engine
//!
//! Runs a callable sitting on the operand stack, either unprotected (errors
//! propagate to the caller) or inside a protected boundary that turns errors
//! into a status code and a value on the stack.

mod call;
mod frame;
mod safe_call;

pub use frame::{Activation, ActivationFlags, Callee};

use std::ops::BitOr;

/// Flags accepted by the call dispatch paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallFlags(u8);

impl CallFlags {
    pub const NONE: Self = CallFlags(0);
    /// Invoke as a constructor
    pub const CONSTRUCT: Self = CallFlags(1 << 0);
    /// Skip the native recursion depth check for this call
    pub const IGNORE_RECURSION_LIMIT: Self = CallFlags(1 << 1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for CallFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        CallFlags(self.0 | rhs.0)
    }
}
