//! Tests for `RelationKind`.

use super::RelationKind;

#[test]
fn default_is_greater() {
  assert_eq!(RelationKind::default(), RelationKind::greater());
  assert_eq!(RelationKind::default().to_string(), "GREATER");
}

#[test]
fn during_is_temporal() {
  assert!(RelationKind::new("DURING").is_temporal());
  assert!(RelationKind::new("during").is_temporal());
  assert!(!RelationKind::greater().is_temporal());
}

#[test]
fn serde_is_transparent() {
  let r: RelationKind = serde_json::from_str("\"BEFORE\"").unwrap();
  assert_eq!(r.as_str(), "BEFORE");
  assert_eq!(serde_json::to_string(&r).unwrap(), "\"BEFORE\"");
}
