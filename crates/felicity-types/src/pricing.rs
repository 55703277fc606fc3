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

use serde::{Deserialize, Serialize};

/// Today's price statistics (currency per kWh)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, avg: f64, max: f64) -> Self {
        Self { min, avg, max }
    }

    /// All three values known and the range non-degenerate
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.avg.is_finite() && self.max.is_finite() && self.max > self.min
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Operator-selected price threshold level, always within 1..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThresholdLevel(u8);

impl ThresholdLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    /// Used when the level entity is missing or unreadable
    pub const DEFAULT: Self = Self(5);

    /// Returns `None` outside 1..=10
    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    /// Level from a raw entity reading: rounded, clamped to 1..=10, default 5 when unknown
    pub fn from_reading(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => {
                Self(v.round().clamp(f64::from(Self::MIN), f64::from(Self::MAX)) as u8)
            }
            _ => Self::DEFAULT,
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every level in ascending order
    pub fn all() -> impl Iterator<Item = ThresholdLevel> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl Default for ThresholdLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}
