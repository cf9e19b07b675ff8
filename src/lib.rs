pub mod app;
pub mod config;
pub mod editor;
pub mod entitlement;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod state;
pub mod storage;
pub mod viewer;
pub use error::{AppError, AppResult};

use crate::entitlement::EntitlementProvider;

/// Entrypoint used by higher-level integrations and CLI bindings.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting masknote");

    let config = config::load_app_config();
    let data_dir = config
        .resolve_data_dir()
        .map_err(|_| AppError::MissingDataDirectory)?;
    let repository = storage::CardRepository::open(&data_dir)?;

    let mut app = app::App::new(repository, config.entitlement());
    app.start()?;

    tracing::info!(
        cards = app.repository().cards().len(),
        tier = ?app.entitlement().tier(),
        mask_limit = app.entitlement().mask_limit(),
        data_dir = %data_dir.display(),
        "startup complete with state={:?}",
        app.state().state()
    );
    Ok(())
}
