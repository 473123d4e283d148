//! The serialized async executor.

use std::sync::Arc;

use device_ledger::store::MemoryStore;
use device_ledger::{
    BlockHeight, Call, ErrorKind, Ledger, LedgerConfig, LedgerError, LedgerService,
    ManualClock, Operation, Principal,
};

fn ledger() -> Ledger<MemoryStore> {
    Ledger::new(
        MemoryStore::new(),
        Arc::new(ManualClock::new(BlockHeight(100))),
        LedgerConfig::with_admin(Principal::from("admin")),
    )
    .unwrap()
}

fn register(caller: &str, device: &str) -> Call {
    Call::new(
        caller,
        Operation::RegisterDevice {
            device: device.into(),
            metadata: "Test Device".into(),
        },
    )
}

#[tokio::test]
async fn test_calls_through_handle() {
    let service = LedgerService::spawn(ledger());
    let handle = service.handle();

    let outcome = handle.call(register("user1", "device1")).await.unwrap();
    assert!(outcome.success);

    let outcome = handle.call(register("user2", "device1")).await.unwrap();
    assert_eq!(outcome.error, Some(ErrorKind::AlreadyRegistered));

    let ledger = service.shutdown().await.unwrap();
    assert_eq!(ledger.device_count().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_has_one_winner() {
    let service = LedgerService::spawn(ledger());

    let mut tasks = Vec::new();
    for i in 0..16 {
        let handle = service.handle();
        tasks.push(tokio::spawn(async move {
            handle
                .call(register(&format!("user{}", i), "contested"))
                .await
                .unwrap()
        }));
    }

    let mut winners = 0;
    for task in tasks {
        let outcome = task.await.unwrap();
        if outcome.success {
            winners += 1;
        } else {
            assert_eq!(outcome.error, Some(ErrorKind::AlreadyRegistered));
        }
    }
    assert_eq!(winners, 1);

    let ledger = service.shutdown().await.unwrap();
    assert_eq!(ledger.device_count().unwrap(), 1);
}

#[tokio::test]
async fn test_digest_sees_prior_calls() {
    let service = LedgerService::spawn(ledger());
    let handle = service.handle();

    let empty = handle.state_digest().await.unwrap();
    handle.call(register("user1", "device1")).await.unwrap();
    let after = handle.state_digest().await.unwrap();
    assert_ne!(empty, after);

    let rejected = handle.call(register("user2", "device1")).await.unwrap();
    assert!(!rejected.success);
    assert_eq!(handle.state_digest().await.unwrap(), after);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_handle_after_shutdown() {
    let service = LedgerService::spawn(ledger());
    let handle = service.handle();
    service.shutdown().await.unwrap();

    let err = handle.call(register("user1", "device1")).await.unwrap_err();
    assert!(matches!(err, LedgerError::ServiceStopped));
}
