use std::sync::Arc;

use anifind_service::AnifindService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<AnifindService>,
}
impl AppState {
	/// Loads the synopsis table and connects the configured index.
	pub fn new(config: anifind_config::Config) -> color_eyre::Result<Self> {
		let service = AnifindService::new(config)?;

		Ok(Self { service: Arc::new(service) })
	}

	pub fn from_service(service: AnifindService) -> Self {
		Self { service: Arc::new(service) }
	}
}
