//! Optimistic interaction state for clients.
//!
//! Every interaction button keeps one small state machine per item:
//! `idle -> pending -> idle` (confirmed or rolled back). A mutation is
//! applied locally before the network call resolves, and the exact
//! pre-mutation snapshot is kept so a rejection restores it verbatim —
//! rollback never recomputes a delta from current state.
//!
//! Server pushes (`updated-likes` etc.) carry no sequence number, so they
//! always overwrite the local count, never delta-apply.

use serde::{Deserialize, Serialize};

/// A second mutation was attempted while one is already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationInFlight;

impl std::fmt::Display for MutationInFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a mutation for this item is already in flight")
    }
}

impl std::error::Error for MutationInFlight {}

// ---------------------------------------------------------------------------
// Toggle interactions (like, save)
// ---------------------------------------------------------------------------

/// The pre-mutation value restored on rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ToggleSnapshot {
    flag: bool,
    count: i64,
}

/// Local state for a toggle-style interaction (like, save).
///
/// `apply` flips the flag and adjusts the count by ±1 immediately. At most
/// one mutation may be pending per item: a second `apply` before the first
/// resolves is refused, so rapid repeated clicks cannot compound a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleState {
    flag: bool,
    count: i64,
    pending: Option<ToggleSnapshot>,
}

impl ToggleState {
    /// Initial state from server-rendered data.
    pub fn new(flag: bool, count: i64) -> Self {
        Self {
            flag,
            count,
            pending: None,
        }
    }

    pub fn flag(&self) -> bool {
        self.flag
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the optimistic flip before the network call resolves.
    pub fn apply(&mut self) -> Result<(), MutationInFlight> {
        if self.pending.is_some() {
            return Err(MutationInFlight);
        }
        self.pending = Some(ToggleSnapshot {
            flag: self.flag,
            count: self.count,
        });
        self.flag = !self.flag;
        self.count += if self.flag { 1 } else { -1 };
        Ok(())
    }

    /// Accept the server's authoritative result, overwriting the guess.
    pub fn confirm(&mut self, flag: bool, count: i64) {
        self.pending = None;
        self.flag = flag;
        self.count = count;
    }

    /// Reverse exactly the flip and adjustment applied by `apply`.
    ///
    /// No-op when nothing is pending (e.g. a duplicate failure callback).
    pub fn rollback(&mut self) {
        if let Some(snapshot) = self.pending.take() {
            self.flag = snapshot.flag;
            self.count = snapshot.count;
        }
    }

    /// Apply an authoritative pushed count (`updated-likes` etc.).
    ///
    /// The push always overwrites the displayed count. While a mutation is
    /// pending it also rewrites the rollback target, so a later rollback
    /// undoes only the local flag flip, not the pushed value.
    pub fn overwrite(&mut self, count: i64) {
        self.count = count;
        if let Some(snapshot) = &mut self.pending {
            snapshot.count = count;
        }
    }
}

// ---------------------------------------------------------------------------
// Append-only interactions (comment, repost)
// ---------------------------------------------------------------------------

/// Local state for a repeatable, non-reversible interaction (comment,
/// repost). These only ever optimistically increment; a failure rolls back
/// exactly one increment. Multiple submissions may be in flight at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    count: i64,
    in_flight: u32,
}

impl CounterState {
    pub fn new(count: i64) -> Self {
        Self { count, in_flight: 0 }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    /// Optimistically count one submission.
    pub fn apply(&mut self) {
        self.count += 1;
        self.in_flight += 1;
    }

    /// Accept the server's authoritative count for one resolved submission.
    pub fn confirm(&mut self, count: i64) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.count = count;
    }

    /// Roll back exactly one optimistic increment.
    pub fn rollback(&mut self) {
        if self.in_flight > 0 {
            self.in_flight -= 1;
            self.count -= 1;
        }
    }

    /// Apply an authoritative pushed count.
    pub fn overwrite(&mut self, count: i64) {
        self.count = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_confirm_accepts_authoritative_value() {
        // C1 likes item X: local 3 -> 4, flag false -> true.
        let mut state = ToggleState::new(false, 3);
        state.apply().unwrap();
        assert!(state.flag());
        assert_eq!(state.count(), 4);
        assert!(state.is_pending());

        // Server confirms with authoritative count 4.
        state.confirm(true, 4);
        assert!(state.flag());
        assert_eq!(state.count(), 4);
        assert!(!state.is_pending());
    }

    #[test]
    fn like_reject_restores_pre_optimistic_value() {
        let mut state = ToggleState::new(false, 3);
        state.apply().unwrap();

        // Server rejects — state reverts to (3, false).
        state.rollback();
        assert!(!state.flag());
        assert_eq!(state.count(), 3);
        assert!(!state.is_pending());
    }

    #[test]
    fn unlike_rolls_back_to_liked() {
        let mut state = ToggleState::new(true, 4);
        state.apply().unwrap();
        assert!(!state.flag());
        assert_eq!(state.count(), 3);

        state.rollback();
        assert!(state.flag());
        assert_eq!(state.count(), 4);
    }

    #[test]
    fn second_apply_while_pending_is_refused() {
        let mut state = ToggleState::new(false, 3);
        state.apply().unwrap();

        // A rapid second click must not compound the delta.
        assert_eq!(state.apply(), Err(MutationInFlight));
        assert!(state.flag());
        assert_eq!(state.count(), 4);

        // The original rollback target is intact.
        state.rollback();
        assert!(!state.flag());
        assert_eq!(state.count(), 3);
    }

    #[test]
    fn rollback_without_pending_is_a_no_op() {
        let mut state = ToggleState::new(true, 7);
        state.rollback();
        assert!(state.flag());
        assert_eq!(state.count(), 7);
    }

    #[test]
    fn push_overwrites_idle_count() {
        let mut state = ToggleState::new(false, 3);
        state.overwrite(10);
        assert_eq!(state.count(), 10);
        assert!(!state.flag());
    }

    #[test]
    fn push_while_pending_rewrites_rollback_target() {
        let mut state = ToggleState::new(false, 3);
        state.apply().unwrap();

        // Another viewer's like lands while ours is in flight.
        state.overwrite(5);
        assert_eq!(state.count(), 5);

        // Rejection undoes only our flag flip, keeping the pushed count.
        state.rollback();
        assert!(!state.flag());
        assert_eq!(state.count(), 5);
    }

    #[test]
    fn stale_push_still_overwrites() {
        // Network reordering: newer value first, stale value second. The
        // contract is overwrite, not delta-apply, so the stale value wins
        // until the next push — no drift accumulates.
        let mut state = ToggleState::new(false, 3);
        state.overwrite(5);
        state.overwrite(4);
        assert_eq!(state.count(), 4);
    }

    #[test]
    fn comment_apply_and_confirm() {
        let mut state = CounterState::new(2);
        state.apply();
        assert_eq!(state.count(), 3);
        assert_eq!(state.in_flight(), 1);

        state.confirm(3);
        assert_eq!(state.count(), 3);
        assert_eq!(state.in_flight(), 0);
    }

    #[test]
    fn comment_rollback_reverses_one_increment() {
        let mut state = CounterState::new(2);
        state.apply();
        state.apply();
        assert_eq!(state.count(), 4);
        assert_eq!(state.in_flight(), 2);

        // One of the two submissions fails.
        state.rollback();
        assert_eq!(state.count(), 3);
        assert_eq!(state.in_flight(), 1);

        state.confirm(3);
        assert_eq!(state.count(), 3);
        assert_eq!(state.in_flight(), 0);
    }

    #[test]
    fn counter_never_speculatively_decrements() {
        let mut state = CounterState::new(0);
        state.rollback();
        assert_eq!(state.count(), 0);
        assert_eq!(state.in_flight(), 0);
    }
}
