use json_ledger::DocumentStore;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::temp_dir().join("json_ledger_demo_basic.json");
    let store = DocumentStore::open(&path);

    // first write: nothing to back up yet
    store
        .write(
            &json!({ "alice": 120, "bob": 80 }),
            Some("admin"),
            Some("initial import"),
        )
        .await?;
    println!("document = {:?}", store.read().await);

    // second write: the previous version lands in the backup
    store
        .write(
            &json!({ "alice": 95, "bob": 80 }),
            Some("admin"),
            Some("correction"),
        )
        .await?;
    println!("backup at {:?}", store.backup_path());

    // update with a transform; the diff is logged and returned
    let diff = store
        .update(
            |mut doc| {
                doc.insert("carol".into(), json!(40));
                Some(doc)
            },
            Some("admin"),
            Some("new account"),
        )
        .await?;
    println!("update changed {} key(s): {}", diff.len(), diff);

    // the file on disk is nicely indented
    let contents = std::fs::read_to_string(store.path())?;
    println!("On-disk JSON:\n{contents}");

    // roll back to the version before the update
    store.restore(Some("admin"), Some("undo new account")).await?;
    println!("after restore = {:?}", store.read().await);

    let _ = std::fs::remove_file(store.path());
    let _ = std::fs::remove_file(store.backup_path());
    Ok(())
}
