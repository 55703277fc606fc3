// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Felicity Card.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use felicity_core::DispatchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HaError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Home Assistant API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Service call {service} failed: {reason}")]
    ServiceCallFailed { service: String, reason: String },

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type HaResult<T> = Result<T, HaError>;

impl HaError {
    /// Map onto the dispatcher error the card reports to the user
    pub fn into_dispatch_error(self, service: &str) -> DispatchError {
        match self {
            Self::ServiceCallFailed { service, reason } => {
                DispatchError::Rejected { service, reason }
            }
            Self::ApiError { status, message } => DispatchError::Rejected {
                service: service.to_owned(),
                reason: format!("{status}: {message}"),
            },
            other => DispatchError::Unavailable(other.to_string()),
        }
    }
}
