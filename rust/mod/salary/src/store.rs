use std::sync::Arc;

use salary_core::ServiceError;
use salary_sql::{Row, SQLStore, Value};
use tracing::info;

use crate::model::{SalaryFeatures, SalaryRecord};

/// Message returned for any unknown record id.
pub const NOT_FOUND_MESSAGE: &str = "Record not found";

/// Schema migrations, applied in order. Index `i` brings the database
/// to `user_version = i + 1`. Append only.
const MIGRATIONS: &[&str] = &["
CREATE TABLE salary (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    work_year           INTEGER NOT NULL,
    experience_level    INTEGER NOT NULL,
    employment_type     INTEGER NOT NULL,
    job_title           INTEGER NOT NULL,
    employee_residence  INTEGER NOT NULL,
    remote_ratio        INTEGER NOT NULL,
    company_location    INTEGER NOT NULL,
    company_size        INTEGER NOT NULL,
    predicted_salary    REAL
);
"];

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

const COLUMNS: &str = "id, work_year, experience_level, employment_type, job_title, \
     employee_residence, remote_ratio, company_location, company_size, predicted_salary";

// ---------------------------------------------------------------------------
// Migrations
// ---------------------------------------------------------------------------

/// Current schema version of the database (`PRAGMA user_version`).
pub fn schema_version(db: &dyn SQLStore) -> Result<i64, ServiceError> {
    let rows = db
        .query("PRAGMA user_version", &[])
        .map_err(|e| ServiceError::Storage(format!("read schema version: {e}")))?;
    Ok(rows
        .first()
        .and_then(|r| r.get_i64("user_version"))
        .unwrap_or(0))
}

/// Apply pending migrations. Returns how many were applied.
///
/// Each migration and its version bump commit in one transaction.
pub fn migrate(db: &dyn SQLStore) -> Result<usize, ServiceError> {
    let current = schema_version(db)?;
    if current > SCHEMA_VERSION {
        return Err(ServiceError::Storage(format!(
            "database schema version {current} is newer than supported version {SCHEMA_VERSION}"
        )));
    }

    let mut applied = 0;
    for (i, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = i + 1;
        db.exec_batch(&format!("{sql}\nPRAGMA user_version = {version};"))
            .map_err(|e| ServiceError::Storage(format!("salary migration {version}: {e}")))?;
        info!("Applied salary schema migration {}", version);
        applied += 1;
    }
    Ok(applied)
}

// ---------------------------------------------------------------------------
// SalaryStore
// ---------------------------------------------------------------------------

/// Persistent storage for salary records, backed by SQLStore (SQLite).
///
/// Every write is one statement, so the feature columns and the
/// prediction always commit together.
pub struct SalaryStore {
    db: Arc<dyn SQLStore>,
}

impl SalaryStore {
    /// Open the store over an already-migrated database.
    pub fn open(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        let version = schema_version(db.as_ref())?;
        if version != SCHEMA_VERSION {
            return Err(ServiceError::Storage(format!(
                "salary schema is at version {version}, expected {SCHEMA_VERSION}; \
                 run `salaryd migrate` first"
            )));
        }
        Ok(Self { db })
    }

    /// Insert a new record and return it with its assigned id.
    pub fn create(
        &self,
        features: &SalaryFeatures,
        predicted_salary: f64,
    ) -> Result<SalaryRecord, ServiceError> {
        let mut params = feature_params(features);
        params.push(Value::Real(predicted_salary));

        let id = self
            .db
            .insert(
                "INSERT INTO salary (work_year, experience_level, employment_type, job_title, \
                 employee_residence, remote_ratio, company_location, company_size, predicted_salary) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                &params,
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(SalaryRecord {
            id,
            features: *features,
            predicted_salary: Some(predicted_salary),
        })
    }

    /// Get a record by id.
    pub fn get(&self, id: i64) -> Result<SalaryRecord, ServiceError> {
        let rows = self
            .db
            .query(
                &format!("SELECT {COLUMNS} FROM salary WHERE id = ?1"),
                &[Value::Integer(id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND_MESSAGE.into()))?;

        row_to_record(row)
    }

    /// All records, oldest first.
    pub fn list(&self) -> Result<Vec<SalaryRecord>, ServiceError> {
        let rows = self
            .db
            .query(&format!("SELECT {COLUMNS} FROM salary ORDER BY id"), &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_record).collect()
    }

    /// Overwrite all features and the prediction of an existing record.
    pub fn update(
        &self,
        id: i64,
        features: &SalaryFeatures,
        predicted_salary: f64,
    ) -> Result<SalaryRecord, ServiceError> {
        let mut params = feature_params(features);
        params.push(Value::Real(predicted_salary));
        params.push(Value::Integer(id));

        let affected = self
            .db
            .exec(
                "UPDATE salary SET work_year = ?1, experience_level = ?2, employment_type = ?3, \
                 job_title = ?4, employee_residence = ?5, remote_ratio = ?6, \
                 company_location = ?7, company_size = ?8, predicted_salary = ?9 \
                 WHERE id = ?10",
                &params,
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(NOT_FOUND_MESSAGE.into()));
        }
        Ok(SalaryRecord {
            id,
            features: *features,
            predicted_salary: Some(predicted_salary),
        })
    }

    /// Delete a record by id.
    pub fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec("DELETE FROM salary WHERE id = ?1", &[Value::Integer(id)])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(NOT_FOUND_MESSAGE.into()));
        }
        Ok(())
    }
}

/// The eight feature columns as `?1..?8` parameters.
fn feature_params(f: &SalaryFeatures) -> Vec<Value> {
    vec![
        Value::Integer(f.work_year),
        Value::Integer(f.experience_level),
        Value::Integer(f.employment_type),
        Value::Integer(f.job_title),
        Value::Integer(f.employee_residence),
        Value::Integer(f.remote_ratio),
        Value::Integer(f.company_location),
        Value::Integer(f.company_size),
    ]
}

fn row_to_record(row: &Row) -> Result<SalaryRecord, ServiceError> {
    let int = |name: &str| {
        row.get_i64(name)
            .ok_or_else(|| ServiceError::Storage(format!("missing or non-integer column {name}")))
    };

    Ok(SalaryRecord {
        id: int("id")?,
        features: SalaryFeatures {
            work_year: int("work_year")?,
            experience_level: int("experience_level")?,
            employment_type: int("employment_type")?,
            job_title: int("job_title")?,
            employee_residence: int("employee_residence")?,
            remote_ratio: int("remote_ratio")?,
            company_location: int("company_location")?,
            company_size: int("company_size")?,
        },
        predicted_salary: row.get_f64("predicted_salary"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use salary_sql::SqliteStore;

    fn migrated_db() -> Arc<dyn SQLStore> {
        let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        migrate(db.as_ref()).unwrap();
        db
    }

    fn test_store() -> SalaryStore {
        SalaryStore::open(migrated_db()).unwrap()
    }

    fn features(work_year: i64) -> SalaryFeatures {
        SalaryFeatures {
            work_year,
            experience_level: 2,
            employment_type: 1,
            job_title: 114,
            employee_residence: 91,
            remote_ratio: 0,
            company_location: 86,
            company_size: 1,
        }
    }

    #[test]
    fn migrate_is_idempotent() {
        let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        assert_eq!(schema_version(db.as_ref()).unwrap(), 0);
        assert_eq!(migrate(db.as_ref()).unwrap(), 1);
        assert_eq!(schema_version(db.as_ref()).unwrap(), SCHEMA_VERSION);
        assert_eq!(migrate(db.as_ref()).unwrap(), 0);
    }

    #[test]
    fn open_requires_migration() {
        let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        match SalaryStore::open(db) {
            Err(ServiceError::Storage(msg)) => assert!(msg.contains("salaryd migrate")),
            other => panic!("expected storage error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn create_and_get() {
        let store = test_store();
        let created = store.create(&features(2023), 120_500.25).unwrap();
        assert_eq!(created.id, 1);

        let got = store.get(created.id).unwrap();
        assert_eq!(got, created);
        assert_eq!(got.predicted_salary, Some(120_500.25));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = test_store();
        let a = store.create(&features(2021), 1.0).unwrap();
        store.delete(a.id).unwrap();
        let b = store.create(&features(2022), 2.0).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn list_in_id_order() {
        let store = test_store();
        store.create(&features(2020), 1.0).unwrap();
        store.create(&features(2021), 2.0).unwrap();
        store.create(&features(2022), 3.0).unwrap();

        let all = store.list().unwrap();
        let years: Vec<i64> = all.iter().map(|r| r.features.work_year).collect();
        assert_eq!(years, vec![2020, 2021, 2022]);
    }

    #[test]
    fn update_overwrites_features_and_prediction() {
        let store = test_store();
        let created = store.create(&features(2020), 1.0).unwrap();

        let mut changed = features(2024);
        changed.remote_ratio = 100;
        store.update(created.id, &changed, 9.5).unwrap();

        let got = store.get(created.id).unwrap();
        assert_eq!(got.features, changed);
        assert_eq!(got.predicted_salary, Some(9.5));
    }

    #[test]
    fn missing_ids_are_not_found() {
        let store = test_store();
        assert!(matches!(store.get(99), Err(ServiceError::NotFound(_))));
        assert!(matches!(
            store.update(99, &features(2023), 1.0),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(store.delete(99), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let store = test_store();
        let created = store.create(&features(2023), 1.0).unwrap();
        store.delete(created.id).unwrap();
        match store.get(created.id) {
            Err(ServiceError::NotFound(msg)) => assert_eq!(msg, NOT_FOUND_MESSAGE),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn null_prediction_reads_as_none() {
        let db = migrated_db();
        db.exec(
            "INSERT INTO salary (work_year, experience_level, employment_type, job_title, \
             employee_residence, remote_ratio, company_location, company_size) \
             VALUES (2023, 2, 1, 114, 91, 0, 86, 1)",
            &[],
        )
        .unwrap();
        let store = SalaryStore::open(db).unwrap();
        assert_eq!(store.get(1).unwrap().predicted_salary, None);
    }
}
