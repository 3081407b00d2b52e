//! Tests for `SessionContext`.

use std::time::Duration;

use super::{MAX_COMPLEXITY, SessionContext};

#[test]
fn starts_at_zero_complexity() {
  let ctx = SessionContext::new("S-1");
  assert_eq!(ctx.session_id, "S-1");
  assert_eq!(ctx.complexity_level(), 0);
}

#[test]
fn raise_complexity_saturates_at_max() {
  let mut ctx = SessionContext::new("S-1");
  let levels: Vec<u8> = (0..8).map(|_| ctx.raise_complexity()).collect();
  assert_eq!(levels, vec![1, 2, 3, 4, 5, 5, 5, 5]);
  assert_eq!(ctx.complexity_level(), MAX_COMPLEXITY);
}

#[tokio::test(start_paused = true)]
async fn elapsed_ms_tracks_session_clock() {
  let ctx = SessionContext::new("S-1");
  tokio::time::advance(Duration::from_millis(1_500)).await;
  assert_eq!(ctx.elapsed_ms(), 1_500);
}
