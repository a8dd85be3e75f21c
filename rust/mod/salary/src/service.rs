use std::sync::Arc;

use salary_core::ServiceError;
use tracing::info;

use crate::model::{OptionalFeatures, Prediction, SalaryInput, SalaryRecord};
use crate::pipeline::SalaryPipeline;
use crate::store::SalaryStore;

/// Predict-and-persist operations behind the HTTP handlers.
pub struct SalaryService {
    store: SalaryStore,
    pipeline: Arc<SalaryPipeline>,
}

impl SalaryService {
    pub fn new(store: SalaryStore, pipeline: Arc<SalaryPipeline>) -> Self {
        Self { store, pipeline }
    }

    /// Predict for `input` (optional fields defaulted) and store the result.
    pub fn create(&self, input: &SalaryInput) -> Result<SalaryRecord, ServiceError> {
        let features = input.resolve(&OptionalFeatures::default());
        let predicted = self.pipeline.predict(&features)?;
        let record = self.store.create(&features, predicted)?;
        info!(id = record.id, predicted, "created salary record");
        Ok(record)
    }

    pub fn get(&self, id: i64) -> Result<SalaryRecord, ServiceError> {
        self.store.get(id)
    }

    pub fn list(&self) -> Result<Vec<SalaryRecord>, ServiceError> {
        self.store.list()
    }

    /// Replace a record's features and recompute its prediction.
    ///
    /// Optional fields the caller omits keep their stored values.
    pub fn update(&self, id: i64, input: &SalaryInput) -> Result<SalaryRecord, ServiceError> {
        let current = self.store.get(id)?;
        self.recompute(&current, input)
    }

    /// [`SalaryService::update`] for a record the caller already loaded.
    pub fn recompute(
        &self,
        current: &SalaryRecord,
        input: &SalaryInput,
    ) -> Result<SalaryRecord, ServiceError> {
        let id = current.id;
        let features = input.resolve(&OptionalFeatures::from(&current.features));
        let predicted = self.pipeline.predict(&features)?;
        let record = self.store.update(id, &features, predicted)?;
        info!(id, predicted, "updated salary record");
        Ok(record)
    }

    pub fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.store.delete(id)?;
        info!(id, "deleted salary record");
        Ok(())
    }

    /// Predict without storing anything.
    pub fn predict(&self, input: &SalaryInput) -> Result<Prediction, ServiceError> {
        let features = input.resolve(&OptionalFeatures::default());
        let predicted_salary = self.pipeline.predict(&features)?;
        Ok(Prediction {
            features,
            predicted_salary,
        })
    }
}
