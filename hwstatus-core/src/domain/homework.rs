//! Homework domain model
//!
//! A homework record is produced by the review API and is read-only here.
//! The only thing the bot derives from it is the notification text.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A single homework submission as reported by the review API
///
/// `homework_name` and `status` are optional at the decode level: a record
/// lacking them is still a well-formed record, it just cannot be turned into
/// a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub homework_name: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_name: Option<String>,
}

impl HomeworkRecord {
    /// Creates a record with just a name and a raw status code
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            homework_name: Some(name.into()),
            status: Some(status.into()),
            ..Self::default()
        }
    }
}

/// Review status of a homework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    /// Reviewer accepted the work
    Approved,

    /// Work is being reviewed
    Reviewing,

    /// Reviewer left remarks
    Rejected,
}

impl HomeworkStatus {
    /// All known statuses, in verdict table order
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Status code as used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Human readable verdict for this status
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(HomeworkStatus::Approved),
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(StatusError::UnknownStatus(other.to_string())),
        }
    }
}

/// Reasons a homework record cannot be turned into a notification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Отсутствует название работы")]
    MissingName,

    #[error("Отсутствует статус")]
    MissingStatus,

    #[error("Неожиданный статус: {0}")]
    UnknownStatus(String),
}

/// Builds the notification text for a homework record
///
/// # Errors
/// Fails when the name or status is absent, or when the status is not one
/// of the known review statuses.
pub fn parse_status(homework: &HomeworkRecord) -> Result<String, StatusError> {
    let name = homework
        .homework_name
        .as_deref()
        .ok_or(StatusError::MissingName)?;
    let status: HomeworkStatus = homework
        .status
        .as_deref()
        .ok_or(StatusError::MissingStatus)?
        .parse()?;

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        name,
        status.verdict()
    ))
}
