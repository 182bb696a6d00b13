// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ot_core::{FakeClock, OperationSeed, OperationStatus};
use ot_storage::MemoryStore;

const GRACE: Duration = Duration::from_secs(10);

fn settled_registry(status: OperationStatus) -> (Arc<Registry<MemoryStore, FakeClock>>, OperationKey) {
    let registry = Arc::new(Registry::open(MemoryStore::new(), FakeClock::new()));
    let key = OperationKey::new("backup", "42");
    registry.set_operation(&key, OperationSeed::new());
    registry.update_progress(&key, 100, status, "");
    (registry, key)
}

#[tokio::test(start_paused = true)]
async fn removes_after_grace() {
    let (registry, key) = settled_registry(OperationStatus::Completed);
    let removals = DeferredRemovals::new();
    removals.schedule(Arc::clone(&registry), key.clone(), GRACE);
    assert!(removals.is_pending(&key));

    tokio::time::sleep(GRACE - Duration::from_millis(1)).await;
    assert!(registry.get_operation(&key).is_some());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(registry.get_operation(&key).is_none());
    assert!(!removals.is_pending(&key));
}

#[tokio::test(start_paused = true)]
async fn keeps_record_that_became_active_again() {
    let (registry, key) = settled_registry(OperationStatus::Error);
    let removals = DeferredRemovals::new();
    removals.schedule(Arc::clone(&registry), key.clone(), GRACE);

    registry.set_operation(&key, OperationSeed::new());
    tokio::time::sleep(GRACE * 2).await;

    assert_eq!(registry.get_operation(&key).unwrap().status, OperationStatus::Starting);
}

#[tokio::test(start_paused = true)]
async fn cancel_prevents_removal() {
    let (registry, key) = settled_registry(OperationStatus::Cancelled);
    let removals = DeferredRemovals::new();
    removals.schedule(Arc::clone(&registry), key.clone(), GRACE);

    assert!(removals.cancel(&key));
    assert!(!removals.cancel(&key));
    tokio::time::sleep(GRACE * 2).await;

    assert!(registry.get_operation(&key).is_some());
}

#[tokio::test(start_paused = true)]
async fn rescheduling_restarts_the_timer() {
    let (registry, key) = settled_registry(OperationStatus::Completed);
    let removals = DeferredRemovals::new();
    removals.schedule(Arc::clone(&registry), key.clone(), GRACE);

    tokio::time::sleep(Duration::from_secs(6)).await;
    removals.schedule(Arc::clone(&registry), key.clone(), GRACE);

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(registry.get_operation(&key).is_some());
    assert!(removals.is_pending(&key));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(registry.get_operation(&key).is_none());
}
