//! Tests for `EdgeStatus`.

use super::EdgeStatus;

#[test]
fn display_variants() {
  assert_eq!(EdgeStatus::Pending.to_string(), "pending");
  assert_eq!(EdgeStatus::Valid.to_string(), "valid");
  assert_eq!(EdgeStatus::Rejected.to_string(), "rejected");
}

#[test]
fn only_pending_is_not_terminal() {
  assert!(!EdgeStatus::Pending.is_terminal());
  assert!(EdgeStatus::Valid.is_terminal());
  assert!(EdgeStatus::Rejected.is_terminal());
}
