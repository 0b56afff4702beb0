use json_ledger::{Actor, ChangeTracker, DocumentStore};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::temp_dir().join("json_ledger_demo_tracked.json");
    let store = Arc::new(DocumentStore::open(&path));
    store
        .write(&json!({ "alice": 120, "bob": 80 }), None, None)
        .await?;

    let tracker = ChangeTracker::new(Arc::clone(&store));
    let alice = Actor::new("alice", "1001");

    // a successful transfer: the tracker logs who ran it and what changed
    let inner = Arc::clone(&store);
    let moved: Result<i64, String> = tracker
        .track("transfer", &alice, move || async move {
            inner
                .update(
                    |mut doc| {
                        let from = doc.get("alice").and_then(|v| v.as_i64()).unwrap_or(0);
                        let to = doc.get("bob").and_then(|v| v.as_i64()).unwrap_or(0);
                        doc.insert("alice".into(), json!(from - 25));
                        doc.insert("bob".into(), json!(to + 25));
                        Some(doc)
                    },
                    Some("alice"),
                    Some("transfer to bob"),
                )
                .await
                .map_err(|e| e.to_string())?;
            Ok(25)
        })
        .await;
    println!("transfer -> {moved:?}");

    // a failing operation: the error is logged and handed back unchanged
    let denied: Result<i64, String> = tracker
        .track("withdraw_everything", &alice, || async {
            Err("insufficient funds".into())
        })
        .await;
    println!("withdraw_everything -> {denied:?}");

    println!("final document = {:?}", store.read().await);

    let _ = std::fs::remove_file(store.path());
    let _ = std::fs::remove_file(store.backup_path());
    Ok(())
}
