use std::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Width of the feature vector the fitted artifacts expect.
pub const NUM_FEATURES: usize = 8;

// Fallbacks for the optional input fields, in the categorical encoding
// the model was trained with.
pub const DEFAULT_JOB_TITLE: i64 = 114;
pub const DEFAULT_EMPLOYEE_RESIDENCE: i64 = 91;
pub const DEFAULT_REMOTE_RATIO: i64 = 0;
pub const DEFAULT_COMPANY_LOCATION: i64 = 86;

// ---------------------------------------------------------------------------
// SalaryFeatures
// ---------------------------------------------------------------------------

/// The eight model inputs. Field order is the positional order of the
/// feature vector and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryFeatures {
    pub work_year: i64,
    pub experience_level: i64,
    pub employment_type: i64,
    pub job_title: i64,
    pub employee_residence: i64,
    pub remote_ratio: i64,
    pub company_location: i64,
    pub company_size: i64,
}

impl SalaryFeatures {
    /// Assemble the positional vector fed to the input scaler.
    pub fn to_vector(&self) -> [f64; NUM_FEATURES] {
        [
            self.work_year as f64,
            self.experience_level as f64,
            self.employment_type as f64,
            self.job_title as f64,
            self.employee_residence as f64,
            self.remote_ratio as f64,
            self.company_location as f64,
            self.company_size as f64,
        ]
    }
}

// ---------------------------------------------------------------------------
// SalaryRecord / Prediction
// ---------------------------------------------------------------------------

/// A stored prediction request with its outcome. Maps 1:1 to the
/// `salary` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub id: i64,
    #[serde(flatten)]
    pub features: SalaryFeatures,
    pub predicted_salary: Option<f64>,
}

/// A prediction that is returned but not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(flatten)]
    pub features: SalaryFeatures,
    pub predicted_salary: f64,
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Values used for optional fields the caller leaves out.
///
/// `Default` gives the documented constants; on update the stored
/// record's own values are used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalFeatures {
    pub job_title: i64,
    pub employee_residence: i64,
    pub remote_ratio: i64,
    pub company_location: i64,
}

impl Default for OptionalFeatures {
    fn default() -> Self {
        Self {
            job_title: DEFAULT_JOB_TITLE,
            employee_residence: DEFAULT_EMPLOYEE_RESIDENCE,
            remote_ratio: DEFAULT_REMOTE_RATIO,
            company_location: DEFAULT_COMPANY_LOCATION,
        }
    }
}

impl From<&SalaryFeatures> for OptionalFeatures {
    fn from(f: &SalaryFeatures) -> Self {
        Self {
            job_title: f.job_title,
            employee_residence: f.employee_residence,
            remote_ratio: f.remote_ratio,
            company_location: f.company_location,
        }
    }
}

/// A request body: required fields are present, optional ones may still
/// be missing.
///
/// Codes are not range-checked against what the scalers were fit on. An
/// out-of-range value, even one as large as `i64::MAX`, still yields a
/// finite but meaningless prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SalaryInput {
    #[serde(deserialize_with = "whole_number")]
    pub work_year: i64,
    #[serde(deserialize_with = "whole_number")]
    pub experience_level: i64,
    #[serde(deserialize_with = "whole_number")]
    pub employment_type: i64,
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub job_title: Option<i64>,
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub employee_residence: Option<i64>,
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub remote_ratio: Option<i64>,
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub company_location: Option<i64>,
    #[serde(deserialize_with = "whole_number")]
    pub company_size: i64,
}

impl SalaryInput {
    /// Fill in the optional fields from `fallback`.
    pub fn resolve(&self, fallback: &OptionalFeatures) -> SalaryFeatures {
        SalaryFeatures {
            work_year: self.work_year,
            experience_level: self.experience_level,
            employment_type: self.employment_type,
            job_title: self.job_title.unwrap_or(fallback.job_title),
            employee_residence: self
                .employee_residence
                .unwrap_or(fallback.employee_residence),
            remote_ratio: self.remote_ratio.unwrap_or(fallback.remote_ratio),
            company_location: self.company_location.unwrap_or(fallback.company_location),
            company_size: self.company_size,
        }
    }
}

/// An integer code. Whole-valued floats such as `2023.0` are accepted.
struct WholeNumber(i64);

impl<'de> Deserialize<'de> for WholeNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WholeNumberVisitor;

        impl Visitor<'_> for WholeNumberVisitor {
            type Value = WholeNumber;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an integer")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<WholeNumber, E> {
                Ok(WholeNumber(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<WholeNumber, E> {
                i64::try_from(v)
                    .map(WholeNumber)
                    .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<WholeNumber, E> {
                let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
                if v.fract() == 0.0 && in_range {
                    Ok(WholeNumber(v as i64))
                } else {
                    Err(E::invalid_value(Unexpected::Float(v), &self))
                }
            }
        }

        deserializer.deserialize_any(WholeNumberVisitor)
    }
}

fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    WholeNumber::deserialize(deserializer).map(|n| n.0)
}

fn optional_whole_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Option::<WholeNumber>::deserialize(deserializer).map(|n| n.map(|n| n.0))
}
