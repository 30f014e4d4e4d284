use log::{error, info};
use std::path::Path;

use chainwatch::bootstrap;
use chainwatch::models::ServiceConfig;
use chainwatch::services::broker::MessageBroker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Initialize logger
	env_logger::init();

	// Extract configuration
	let config_path = std::env::var("CHAINWATCH_CONFIG").ok();
	let config = ServiceConfig::load(config_path.as_deref().map(Path::new))?;
	info!("configuration: {:?}", config);

	// Instantiate the explorer service
	let (mut explorer, broker) = bootstrap::initialize_explorer(&config).await?;
	explorer.start().await;

	// Wait for shutdown signal
	info!("Service started. Press Ctrl+C to shutdown");
	tokio::signal::ctrl_c().await?;
	info!("Shutdown signal received, stopping services...");

	// Gracefully drain every chain and collect the reports
	explorer.stop();
	for report in explorer.join().await {
		match report.error {
			Some(err) => error!("[{}] finished with error: {}", report.chain, err),
			None => info!("[{}] finished", report.chain),
		}
	}

	if let Err(e) = broker.close().await {
		error!("Error closing message broker: {}", e);
	}

	info!("Shutdown complete");
	Ok(())
}
