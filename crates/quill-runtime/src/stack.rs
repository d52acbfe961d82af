//! Operand stack
//!
//! A single growable array of values with three cursors:
//!
//! ```text
//! values:  [ ...caller frames... | arg0 arg1 ... | (reserved) ]
//!                                 ^               ^            ^
//!                               bottom           top          end
//! ```
//!
//! `bottom` marks the start of the current frame, `top` is one past the last
//! value and `end` is the capacity guaranteed to the current frame. Pushing at
//! `end` fails until more space is reserved with [`ValueStack::check_stack`].
//!
//! Host-facing indices ([`Idx`]) are relative to `bottom`; negative indices count
//! down from `top` (-1 is the topmost value).

use crate::error::{EngineError, EngineResult};
use crate::value::Value;

/// Signed stack index
pub type Idx = isize;

pub struct ValueStack {
    values: Vec<Value>,
    bottom: usize,
    end: usize,
    limit: usize,
}

impl ValueStack {
    pub fn new(initial: usize, limit: usize) -> Self {
        let end = initial.min(limit);
        Self {
            values: Vec::with_capacity(end),
            bottom: 0,
            end,
            limit,
        }
    }

    // ------------------------------------------------------------------
    // Cursors (absolute positions)
    // ------------------------------------------------------------------

    pub fn top(&self) -> usize {
        self.values.len()
    }

    pub fn bottom(&self) -> usize {
        self.bottom
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub(crate) fn set_bottom(&mut self, bottom: usize) {
        debug_assert!(bottom <= self.top());
        self.bottom = bottom;
    }

    /// Number of values in the current frame
    pub fn get_top(&self) -> Idx {
        (self.top() - self.bottom) as Idx
    }

    // ------------------------------------------------------------------
    // Index handling
    // ------------------------------------------------------------------

    /// Absolute position of `idx`, or `None` when it is outside the frame.
    pub(crate) fn abs_index(&self, idx: Idx) -> Option<usize> {
        let top = self.get_top();
        let rel = if idx < 0 { top + idx } else { idx };
        if rel < 0 || rel >= top {
            None
        } else {
            Some(self.bottom + rel as usize)
        }
    }

    pub(crate) fn require_abs_index(&self, idx: Idx) -> EngineResult<usize> {
        self.abs_index(idx)
            .ok_or(EngineError::InvalidIndex { index: idx })
    }

    /// Frame-relative, non-negative form of `idx`
    pub fn normalize_index(&self, idx: Idx) -> Option<Idx> {
        self.abs_index(idx).map(|abs| (abs - self.bottom) as Idx)
    }

    pub fn require_normalize_index(&self, idx: Idx) -> EngineResult<Idx> {
        self.normalize_index(idx)
            .ok_or(EngineError::InvalidIndex { index: idx })
    }

    pub fn is_valid_index(&self, idx: Idx) -> bool {
        self.abs_index(idx).is_some()
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    pub fn get(&self, idx: Idx) -> Option<&Value> {
        self.abs_index(idx).map(|abs| &self.values[abs])
    }

    pub fn require(&self, idx: Idx) -> EngineResult<&Value> {
        let abs = self.require_abs_index(idx)?;
        Ok(&self.values[abs])
    }

    pub(crate) fn get_abs(&self, abs: usize) -> Option<&Value> {
        self.values.get(abs)
    }

    pub(crate) fn set_abs(&mut self, abs: usize, value: Value) -> EngineResult<()> {
        match self.values.get_mut(abs) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(EngineError::internal(format!(
                "stack slot {} out of range",
                abs
            ))),
        }
    }

    /// Values from `from` (absolute) up to top
    pub(crate) fn slice_from(&self, from: usize) -> &[Value] {
        &self.values[from.min(self.values.len())..]
    }

    /// Frame contents, bottom to top
    pub fn frame(&self) -> &[Value] {
        &self.values[self.bottom..]
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    pub fn push(&mut self, value: Value) -> EngineResult<()> {
        if self.top() >= self.end {
            return Err(EngineError::range_error(
                "attempt to push beyond currently allocated stack",
            ));
        }
        self.values.push(value);
        Ok(())
    }

    /// Push into space the caller has already accounted for; extends `end`
    /// when it is crossed.
    pub(crate) fn push_reserved(&mut self, value: Value) {
        self.values.push(value);
        if self.top() > self.end {
            self.end = self.top();
        }
    }

    pub fn pop(&mut self) -> EngineResult<Value> {
        if self.top() <= self.bottom {
            return Err(EngineError::InvalidIndex { index: -1 });
        }
        self.values
            .pop()
            .ok_or(EngineError::InvalidIndex { index: -1 })
    }

    pub fn pop_n(&mut self, count: usize) -> EngineResult<()> {
        if count > self.top() - self.bottom {
            return Err(EngineError::InvalidArgs);
        }
        let new_top = self.top() - count;
        self.values.truncate(new_top);
        Ok(())
    }

    /// Set the frame size. Growing pads with undefined, shrinking discards.
    pub fn set_top(&mut self, idx: Idx) -> EngineResult<()> {
        let top = self.get_top();
        let rel = if idx < 0 { top + idx } else { idx };
        if rel < 0 {
            return Err(EngineError::InvalidIndex { index: idx });
        }
        let new_top = self.bottom + rel as usize;
        if new_top > self.end {
            return Err(EngineError::InvalidIndex { index: idx });
        }
        self.values.resize(new_top, Value::Undefined);
        Ok(())
    }

    pub(crate) fn truncate_abs(&mut self, top: usize) {
        debug_assert!(top >= self.bottom);
        self.values.truncate(top);
    }

    pub fn dup(&mut self, idx: Idx) -> EngineResult<()> {
        let value = self.require(idx)?.clone();
        self.push(value)
    }

    /// Move the top value to `to_idx`, shifting values at and above it up.
    pub fn insert(&mut self, to_idx: Idx) -> EngineResult<()> {
        let abs = self.require_abs_index(to_idx)?;
        let value = self.pop()?;
        self.values.insert(abs, value);
        Ok(())
    }

    pub(crate) fn insert_many_abs(&mut self, abs: usize, values: &[Value]) {
        debug_assert!(abs <= self.top());
        self.values.splice(abs..abs, values.iter().cloned());
        if self.top() > self.end {
            self.end = self.top();
        }
    }

    /// Pop the top value and write it over `to_idx`.
    pub fn replace(&mut self, to_idx: Idx) -> EngineResult<()> {
        let abs = self.require_abs_index(to_idx)?;
        let value = self.pop()?;
        if abs == self.top() {
            // replacing the popped slot with itself
            self.values.push(value);
        } else {
            self.values[abs] = value;
        }
        Ok(())
    }

    pub fn remove(&mut self, idx: Idx) -> EngineResult<Value> {
        let abs = self.require_abs_index(idx)?;
        Ok(self.values.remove(abs))
    }

    pub(crate) fn drain_from(&mut self, from: usize) -> Vec<Value> {
        self.values.drain(from..).collect()
    }

    // ------------------------------------------------------------------
    // Capacity
    // ------------------------------------------------------------------

    /// Guarantee room for `extra` more values; `false` when that would
    /// cross the hard limit.
    pub fn check_stack(&mut self, extra: usize) -> bool {
        let wanted = match self.top().checked_add(extra) {
            Some(w) if w <= self.limit => w,
            _ => return false,
        };
        if wanted > self.end {
            tracing::debug!(from = self.end, to = wanted, "growing value stack");
            self.values.reserve(wanted - self.top());
            self.end = wanted;
        }
        true
    }

    pub fn require_stack(&mut self, extra: usize) -> EngineResult<()> {
        if self.check_stack(extra) {
            Ok(())
        } else {
            Err(EngineError::range_error("valstack limit"))
        }
    }
}
