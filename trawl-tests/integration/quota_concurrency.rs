//! Concurrency properties of the usage ledger.

use std::sync::Arc;

use trawl_core::ledger::{Direction, InMemoryStore, UsageLedger};

#[tokio::test]
async fn test_concurrent_reservations_never_exceed_limit() {
    let ledger = Arc::new(UsageLedger::open(Box::new(InMemoryStore::new())));
    let limit = Some(100.0);

    // Twenty concurrent claimants of 10 MB against a 100 MB limit: the
    // atomic reserve admits exactly ten, no matter the interleaving.
    let mut handles = Vec::new();
    for _ in 0..20 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.try_reserve(Direction::Download, 10.0, limit).is_ok()
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 10);
    assert_eq!(ledger.current_record().downloaded_mb, 100.0);
}

#[tokio::test]
async fn test_released_capacity_can_be_reclaimed() {
    let ledger = Arc::new(UsageLedger::open(Box::new(InMemoryStore::new())));
    let limit = Some(100.0);

    let first = ledger.try_reserve(Direction::Download, 100.0, limit).unwrap();
    assert!(ledger.try_reserve(Direction::Download, 1.0, limit).is_err());

    // A failed transfer hands its reservation back
    ledger.release(first);
    assert!(ledger.try_reserve(Direction::Download, 100.0, limit).is_ok());
}
