//! Last-issued-wins bookkeeping.
//!
//! Each logical operation (a search box, a list fetch) owns one
//! [`LatestWins`]. Issuing an operation hands out a [`Ticket`]; when its
//! result arrives the owner asks whether the ticket is still current. Any
//! later `issue` or `invalidate` makes every earlier ticket stale, whatever
//! order the results arrive in.

/// Identifies one issued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct LatestWins {
  generation: u64,
}

impl LatestWins {
  pub fn new() -> Self { Self::default() }

  /// Start a new operation, superseding all earlier ones.
  pub fn issue(&mut self) -> Ticket {
    self.generation += 1;
    Ticket(self.generation)
  }

  /// Supersede all outstanding operations without starting a new one.
  pub fn invalidate(&mut self) { self.generation += 1; }

  pub fn is_current(&self, ticket: Ticket) -> bool { ticket.0 == self.generation }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_the_last_issued_ticket_is_current() {
    let mut latest = LatestWins::new();
    let first = latest.issue();
    let second = latest.issue();
    assert!(!latest.is_current(first));
    assert!(latest.is_current(second));
  }

  #[test]
  fn invalidate_stales_everything() {
    let mut latest = LatestWins::new();
    let ticket = latest.issue();
    latest.invalidate();
    assert!(!latest.is_current(ticket));
    let fresh = latest.issue();
    assert!(latest.is_current(fresh));
  }
}
