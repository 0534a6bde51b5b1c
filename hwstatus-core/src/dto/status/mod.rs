//! Status API DTOs
//!
//! The review API answers `GET homework_statuses?from_date=<ts>` with
//! `{ "homeworks": [...], "current_date": <ts> }`. The body is kept as raw
//! JSON until [`validate_response`] has checked its shape.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::domain::homework::HomeworkRecord;

/// Validated status API response
///
/// Only the most recent record is decoded; earlier ones are kept as they
/// came and never affect a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// The most recent homework record
    pub latest: HomeworkRecord,

    /// Earlier records, undecoded
    pub earlier: Vec<JsonValue>,

    /// Server time of the answer, used as the next watermark
    pub current_date: i64,
}

/// Ways a status API body can fail validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("Ответ API не является словарем")]
    NotAnObject,

    #[error("В ответе API отсутствует ключ \"{0}\"")]
    MissingKey(&'static str),

    #[error("Ключ \"{key}\" в ответе API имеет неверный тип: ожидается {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },

    #[error("Некорректная запись о работе: {0}")]
    InvalidRecord(String),

    #[error("Список работ пуст")]
    EmptyHomeworks,
}

impl ResponseError {
    /// True when the body itself is malformed, false when it is well-formed
    /// but carries nothing to report
    pub fn is_shape(&self) -> bool {
        !matches!(self, ResponseError::EmptyHomeworks)
    }
}

/// Checks the shape of a status API body and extracts its content
///
/// # Errors
/// - [`ResponseError::NotAnObject`] if the body is not a JSON object
/// - [`ResponseError::MissingKey`] if `homeworks` or `current_date` is absent
/// - [`ResponseError::WrongType`] if `homeworks` is not a list or
///   `current_date` is not an integer
/// - [`ResponseError::EmptyHomeworks`] if the list is empty
/// - [`ResponseError::InvalidRecord`] if the most recent record cannot be
///   decoded
pub fn validate_response(body: &JsonValue) -> Result<StatusResponse, ResponseError> {
    let object = body.as_object().ok_or(ResponseError::NotAnObject)?;

    let homeworks = object
        .get("homeworks")
        .ok_or(ResponseError::MissingKey("homeworks"))?
        .as_array()
        .ok_or(ResponseError::WrongType {
            key: "homeworks",
            expected: "список",
        })?;

    let (latest, earlier) = homeworks
        .split_first()
        .ok_or(ResponseError::EmptyHomeworks)?;

    let latest = serde_json::from_value::<HomeworkRecord>(latest.clone())
        .map_err(|e| ResponseError::InvalidRecord(e.to_string()))?;

    let current_date = object
        .get("current_date")
        .ok_or(ResponseError::MissingKey("current_date"))?
        .as_i64()
        .ok_or(ResponseError::WrongType {
            key: "current_date",
            expected: "целое число",
        })?;

    Ok(StatusResponse {
        latest,
        earlier: earlier.to_vec(),
        current_date,
    })
}
