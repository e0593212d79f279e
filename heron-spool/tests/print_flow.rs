//! End-to-end print flow over loopback TCP
//!
//! Real registry persistence (redb on a temp path), real `TcpTransport`,
//! and loopback listeners standing in for thermal printers.

use heron_printer::TcpTransport;
use heron_spool::{
    JobStatus, PoolStorage, PrintContent, PrintQueue, PrintRequest, PrinterRegistry,
    PrinterTarget, Subscription,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

fn target(id: &str, port: u16) -> PrinterTarget {
    PrinterTarget {
        id: id.to_string(),
        name: format!("Printer {}", id),
        address: "127.0.0.1".to_string(),
        port,
        class: "ethernet".to_string(),
        enabled: true,
    }
}

fn receipt() -> PrintRequest {
    PrintRequest {
        target_class: "ethernet".to_string(),
        content: PrintContent::Receipt {
            text: "[C][B]HERON CAFE\n[=]\n1x Americano\n[R]2.50 €".to_string(),
        },
    }
}

async fn wait_terminal(sub: &mut Subscription, job_id: &str) -> heron_spool::PrintJob {
    loop {
        let update = tokio::time::timeout(Duration::from_secs(10), sub.recv())
            .await
            .expect("timed out waiting for job update")
            .expect("subscription closed");
        if update.id == job_id && update.status.is_terminal() {
            return update;
        }
    }
}

fn queue_on_temp_storage(dir: &tempfile::TempDir) -> Arc<PrintQueue> {
    let storage = PoolStorage::open(dir.path().join("pool.redb")).unwrap();
    let registry = Arc::new(PrinterRegistry::new(storage));
    Arc::new(PrintQueue::new(registry, Arc::new(TcpTransport::default())))
}

#[tokio::test]
async fn partial_result_when_one_printer_is_offline() {
    let dir = tempfile::tempdir().unwrap();
    let storage = PoolStorage::open(dir.path().join("pool.redb")).unwrap();
    let registry = Arc::new(PrinterRegistry::new(storage));

    // P1: a live listener that drains whatever arrives
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let p1_port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        sock.read_to_end(&mut buf).await.unwrap();
        buf
    });

    // P2: a port nothing listens on
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let p2_port = dead.local_addr().unwrap().port();
    drop(dead);

    registry.add(target("p1", p1_port)).unwrap();
    registry.add(target("p2", p2_port)).unwrap();

    let queue = Arc::new(PrintQueue::new(
        registry,
        Arc::new(TcpTransport::default()),
    ));
    let mut sub = queue.subscribe();

    assert!(queue.is_available("ethernet"));

    let job_id = queue.submit(receipt());
    let job = wait_terminal(&mut sub, &job_id).await;

    assert_eq!(job.status, JobStatus::Partial);
    assert_eq!(job.per_target.len(), 2);
    assert!(job.per_target["p1"].ok);
    assert!(!job.per_target["p2"].ok);
    assert_eq!(job.per_target["p2"].error.as_deref(), Some("Connect failed"));

    // The live printer received a real ESC/POS stream
    let received = server.await.unwrap();
    assert!(!received.is_empty());
    // Receipt text survives encoding; markers do not
    let s = String::from_utf8_lossy(&received);
    assert!(s.contains("HERON CAFE"));
    assert!(!s.contains("[C]"));
}

#[tokio::test]
async fn empty_pool_fails_without_any_connection() {
    let dir = tempfile::tempdir().unwrap();
    let queue = queue_on_temp_storage(&dir);
    let mut sub = queue.subscribe();

    assert!(!queue.is_available("ethernet"));

    let job_id = queue.submit(receipt());
    let job = wait_terminal(&mut sub, &job_id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.reason.as_deref(), Some("No printer configured"));
    assert!(job.per_target.is_empty());
}

#[tokio::test]
async fn pool_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pool.redb");

    {
        let storage = PoolStorage::open(&path).unwrap();
        let registry = PrinterRegistry::new(storage);
        registry.add(target("p1", 9100)).unwrap();
    }

    // "Restart": a fresh registry over the same file
    let storage = PoolStorage::open(&path).unwrap();
    let registry = PrinterRegistry::new(storage);
    registry.load();

    let listed = registry.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "p1");
}
