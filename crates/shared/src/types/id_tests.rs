use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_new_is_unique() {
    assert_ne!(JournalId::new(), JournalId::new());
}

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = LedgerLineId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
    assert_eq!(LedgerLineId::from(uuid), id);
}

#[test]
fn test_typed_id_display() {
    let uuid = Uuid::new_v4();
    let id = LedgerLineId::from_uuid(uuid);
    assert_eq!(format!("{id}"), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = JournalId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_from_str_error() {
    assert!(JournalId::from_str("invalid").is_err());
}
