pub mod api;
pub mod model;
pub mod pipeline;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;
use salary_core::{Module, ServiceError};
use salary_sql::SQLStore;

use pipeline::SalaryPipeline;
use service::SalaryService;
use store::SalaryStore;

pub use store::migrate;

/// The salary module: stores prediction requests with their outcomes.
pub struct SalaryModule {
    service: Arc<SalaryService>,
}

impl SalaryModule {
    /// Open the record store over a migrated database and wire in the pipeline.
    pub fn new(
        db: Arc<dyn SQLStore>,
        pipeline: Arc<SalaryPipeline>,
    ) -> Result<Self, ServiceError> {
        let store = SalaryStore::open(db)?;
        Ok(Self {
            service: Arc::new(SalaryService::new(store, pipeline)),
        })
    }
}

impl Module for SalaryModule {
    fn name(&self) -> &str {
        "salary"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
