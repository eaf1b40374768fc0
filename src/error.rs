use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid data: {0}")]
    Data(String),
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error("calculation failed: {0}")]
    Calc(String),
    #[error("classification failed: {0}")]
    Classification(String),
    #[error("server error: {0}")]
    Server(String),
}

impl PlanError {
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup(message.into())
    }

    pub fn calc(message: impl Into<String>) -> Self {
        Self::Calc(message.into())
    }

    pub fn status(&self) -> PlanStatus {
        match self {
            Self::Data(_) => PlanStatus::DataError,
            Self::Lookup(_) => PlanStatus::LookupError,
            Self::Calc(_) => PlanStatus::CalcError,
            Self::Classification(_) => PlanStatus::ClassificationError,
            Self::Server(_) => PlanStatus::ServerError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Data(m)
            | Self::Lookup(m)
            | Self::Calc(m)
            | Self::Classification(m)
            | Self::Server(m) => m,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Success,
    DataError,
    LookupError,
    CalcError,
    ClassificationError,
    ServerError,
}

impl PlanStatus {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::DataError => "data_error",
            Self::LookupError => "lookup_error",
            Self::CalcError => "calc_error",
            Self::ClassificationError => "classification_error",
            Self::ServerError => "server_error",
        }
    }
}
