//! The module contains the errors the ledger engine can throw.
//!
//! The errors are grouped by who is at fault:
//!
//! - caller input: [`Validation`], [`InvalidSplit`], [`InvalidAmount`],
//!   [`InvalidId`], [`InvalidCursor`]
//! - referenced entity absent: [`NotFound`]
//! - actor not allowed or not a party: [`Unauthorized`]
//! - payment larger than what is still owed: [`ExceedsObligation`]
//! - concurrent mutation detected: [`Conflict`]
//! - the underlying store failed: [`Database`]
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidSplit`]: EngineError::InvalidSplit
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`InvalidCursor`]: EngineError::InvalidCursor
//!  [`NotFound`]: EngineError::NotFound
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`ExceedsObligation`]: EngineError::ExceedsObligation
//!  [`Conflict`]: EngineError::Conflict
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

use crate::MoneyCents;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Payment of {requested} exceeds remaining obligation of {remaining}")]
    ExceedsObligation {
        requested: MoneyCents,
        remaining: MoneyCents,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors caused by malformed or out-of-range input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidSplit(_)
                | Self::InvalidAmount(_)
                | Self::InvalidId(_)
                | Self::InvalidCursor(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidSplit(a), Self::InvalidSplit(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (
                Self::ExceedsObligation {
                    requested: a_req,
                    remaining: a_rem,
                },
                Self::ExceedsObligation {
                    requested: b_req,
                    remaining: b_rem,
                },
            ) => a_req == b_req && a_rem == b_rem,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
