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

use thiserror::Error;

/// Write input rejected before anything is dispatched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("missing_field")]
    MissingField,

    #[error("{0} does not accept writes")]
    ReadOnlySource(String),
}

/// Failure reported by a command dispatcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Service {service} rejected: {reason}")]
    Rejected { service: String, reason: String },

    #[error("Dispatcher unavailable: {0}")]
    Unavailable(String),
}
