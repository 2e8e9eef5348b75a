use portico::config::{initialize_root_acl, rdf_converters, web_acl_handler, ServerConfig};
use portico::http::LdpServer;
use portico::storage::conversion::TEXT_TURTLE;
use portico::storage::{MemoryResourceStore, RepresentationConvertingStore, ResourceStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    println!("Portico LDP server v{}", portico::version());
    println!("Base URL: {}", config.base);
    println!();

    let store: Arc<dyn ResourceStore> = Arc::new(RepresentationConvertingStore::new(
        MemoryResourceStore::new(),
        rdf_converters(),
        Some(TEXT_TURTLE.to_string()),
    ));

    // Everything is accessible until real ACL documents are uploaded.
    initialize_root_acl(store.as_ref(), &config.base_identifier()).await?;

    let handler = Arc::new(web_acl_handler(store));
    let server = LdpServer::new(handler, config.address.clone(), config.port);

    if let Err(e) = server.start().await {
        eprintln!("Server error: {e}");
    }

    Ok(())
}
