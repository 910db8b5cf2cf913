use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::net::TcpListener;

use models::product::Product;
use models::Entity;
use server::routes::AppState;
use server::startup::build_app;
use service::catalog::{ProductStore, WriteStatus};
use service::facade::{DataFacade, HttpRemote, LocalStore, MemoryMirror};
use service::kv::MemoryKv;

async fn start_server() -> anyhow::Result<(String, tokio::task::JoinHandle<()>)> {
    let app = build_app(AppState::new(Arc::new(MemoryKv::new())));
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });
    Ok((format!("http://{}", addr), handle))
}

fn facade(base_url: &str, mirror: Arc<MemoryMirror>) -> anyhow::Result<Arc<DataFacade>> {
    let remote = HttpRemote::new(base_url, Duration::from_secs(2))?;
    Ok(Arc::new(DataFacade::new(Arc::new(remote), mirror)))
}

#[tokio::test]
async fn e2e_products_seed_add_and_reload() -> anyhow::Result<()> {
    let (base_url, _server) = start_server().await?;
    let mirror = Arc::new(MemoryMirror::new());
    let store = ProductStore::new(facade(&base_url, mirror.clone())?);

    assert_eq!(store.load().await.len(), 4);
    let added = store
        .add(Product { name: "X".into(), price: 99.0, active: true, ..Product::default() })
        .await?;
    assert_eq!(store.write_status(&added.id).await, WriteStatus::Synced);

    // a fresh client with an empty mirror sees the server's copy
    let other = ProductStore::new(facade(&base_url, Arc::new(MemoryMirror::new()))?);
    let loaded = other.load().await;
    assert_eq!(loaded.len(), 5);
    assert!(loaded.iter().any(|p| p.id == added.id));
    assert!(mirror.get_raw(Product::BUCKET).await.is_some());
    Ok(())
}

#[tokio::test]
async fn e2e_offline_client_reads_mirror() -> anyhow::Result<()> {
    let (base_url, server) = start_server().await?;
    let mirror = Arc::new(MemoryMirror::new());
    let store = ProductStore::new(facade(&base_url, mirror.clone())?);
    store.load().await;
    store.delete("1").await?;

    server.abort();
    let _ = server.await;

    let offline = ProductStore::new(facade(&base_url, mirror)?);
    let loaded = offline.load().await;
    assert_eq!(loaded.len(), 3);

    let added = offline
        .add(Product { name: "Offline".into(), price: 10.0, ..Product::default() })
        .await?;
    assert_eq!(offline.write_status(&added.id).await, WriteStatus::Failed);
    Ok(())
}
