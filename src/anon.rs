//! Forward (`+`, `++`, ...) and backward (`-`, `--`, ...) unnamed labels.
//! `all` has one slot per statement, keyed by the statement's sequential
//! `index`; `forward`/`backward` record, in source order, which statement
//! indices hold a forward or backward anonymous label.

use crate::value::{Value, UNDEFINED};

#[derive(Default)]
pub struct AnonLabels {
    all: Vec<Option<Value>>,
    forward: Vec<usize>,
    backward: Vec<usize>,
    forward_index: usize,
    backward_index: usize,
}

impl AnonLabels {
    pub fn new() -> Self {
        AnonLabels::default()
    }

    /// Resets the forward/backward cursors at the top of a pass. The `all`
    /// table and the forward/backward index lists persist across passes.
    pub fn begin_pass(&mut self) {
        self.forward_index = 0;
        self.backward_index = 0;
    }

    /// Pass-1 bookkeeping: reserves a slot for `stmt_index`, registering it
    /// as forward- or backward-labeled if `plus`/`hyphen` is `true`.
    pub fn add_mode_slot(&mut self, stmt_index: usize, plus: bool, hyphen: bool) {
        debug_assert_eq!(self.all.len(), stmt_index, "statements must register slots in source order");
        self.all.push(None);
        if plus {
            self.forward.push(stmt_index);
        } else if hyphen {
            self.backward.push(stmt_index);
        }
    }

    /// Records (or updates, on later passes) the value for the forward
    /// label at `stmt_index`. Returns `true` if the stored value changed
    /// (the caller sets `pass_needed`).
    pub fn record_forward(&mut self, stmt_index: usize, value: Value) -> bool {
        self.forward_index += 1;
        self.store(stmt_index, value)
    }

    /// Records (or updates) the value for the backward label at
    /// `stmt_index`.
    pub fn record_backward(&mut self, stmt_index: usize, value: Value) -> bool {
        self.backward_index += 1;
        self.store(stmt_index, value)
    }

    fn store(&mut self, stmt_index: usize, value: Value) -> bool {
        let slot = &mut self.all[stmt_index];
        let changed = *slot != Some(value);
        *slot = Some(value);
        changed
    }

    /// Resolves a `+`-style reference with `count` pluses: the `count`-th
    /// forward label strictly after the current execution point.
    pub fn forward_ref(&self, count: u32) -> Value {
        let idx = self.forward_index + (count as usize).saturating_sub(1);
        self.forward
            .get(idx)
            .and_then(|&slot| self.all[slot])
            .unwrap_or(UNDEFINED)
    }

    /// Resolves a `-`-style reference with `count` hyphens: the `count`-th
    /// backward label at or before the current execution point.
    pub fn backward_ref(&self, count: u32) -> Value {
        let count = count as usize;
        if self.backward_index < count {
            return UNDEFINED;
        }
        let idx = self.backward_index - count;
        self.backward
            .get(idx)
            .and_then(|&slot| self.all[slot])
            .unwrap_or(UNDEFINED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_backward_label_loop() {
        // -   inx        ; stmt 0, backward label
        //     bne -      ; stmt 1, references "-" (1 hyphen)
        let mut anon = AnonLabels::new();
        anon.add_mode_slot(0, false, true);
        anon.add_mode_slot(1, false, false);
        anon.begin_pass();
        assert_eq!(anon.backward_ref(1), UNDEFINED); // not yet seen
        anon.record_backward(0, 0x0000);
        assert_eq!(anon.backward_ref(1), 0x0000);
    }

    #[test]
    fn forward_reference_resolves_after_label_seen() {
        //     bne +      ; stmt 0, references "+"
        // +   inx        ; stmt 1, forward label
        let mut anon = AnonLabels::new();
        anon.add_mode_slot(0, false, false);
        anon.add_mode_slot(1, true, false);
        anon.begin_pass();
        assert_eq!(anon.forward_ref(1), UNDEFINED);
        anon.record_forward(1, 0x0003);
        // Second pass: forward_ref resolved before the label statement executes,
        // because forward_index hasn't advanced past it yet.
        anon.begin_pass();
        assert_eq!(anon.forward_ref(1), 0x0003);
    }

    #[test]
    fn value_change_is_reported() {
        let mut anon = AnonLabels::new();
        anon.add_mode_slot(0, true, false);
        anon.begin_pass();
        assert!(anon.record_forward(0, 10));
        anon.begin_pass();
        assert!(!anon.record_forward(0, 10));
        anon.begin_pass();
        assert!(anon.record_forward(0, 11));
    }
}
