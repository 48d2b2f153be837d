//! Travel preferences collected from the user.

use crate::error::{Result, TourError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Interest used when the user names none.
pub const DEFAULT_INTEREST: &str = "sightseeing";

/// Currency assumed for budgets without an explicit code.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Spending range for the whole trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

impl BudgetRange {
    pub fn new(min: f64, max: f64, currency: impl Into<String>) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(TourError::preferences("budget must be a non-negative number"));
        }
        if min > max {
            return Err(TourError::preferences(format!(
                "budget minimum {} exceeds maximum {}",
                min, max
            )));
        }

        let currency = currency.into().trim().to_uppercase();
        Ok(Self {
            min,
            max,
            currency: if currency.is_empty() {
                DEFAULT_CURRENCY.to_string()
            } else {
                currency
            },
        })
    }

    /// Parse `"1500"` (up to 1500) or `"500-1500"`.
    pub fn parse(raw: &str, currency: &str) -> Result<Self> {
        let raw = raw.trim();
        let parse_amount = |s: &str| -> Result<f64> {
            s.trim().parse::<f64>().map_err(|_| {
                TourError::preferences(format!("invalid budget amount '{}'", s.trim()))
            })
        };

        match raw.split_once('-') {
            Some((min, max)) => Self::new(parse_amount(min)?, parse_amount(max)?, currency),
            None => Self::new(0.0, parse_amount(raw)?, currency),
        }
    }
}

impl fmt::Display for BudgetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == 0.0 {
            write!(f, "up to {:.0} {}", self.max, self.currency)
        } else {
            write!(f, "{:.0}-{:.0} {}", self.min, self.max, self.currency)
        }
    }
}

/// What the traveller wants out of the trip. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    destination: String,
    duration_days: u32,
    interests: BTreeSet<String>,
    budget: Option<BudgetRange>,
}

impl UserPreferences {
    /// Build validated preferences.
    ///
    /// Interests are trimmed and lowercased; blanks are dropped. With no
    /// interests left, [`DEFAULT_INTEREST`] is used.
    pub fn new<I, S>(
        destination: &str,
        duration_days: u32,
        interests: I,
        budget: Option<BudgetRange>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(TourError::preferences("destination must not be empty"));
        }
        if duration_days == 0 {
            return Err(TourError::preferences("trip duration must be at least one day"));
        }

        let mut interests: BTreeSet<String> = interests
            .into_iter()
            .map(|i| i.as_ref().trim().to_lowercase())
            .filter(|i| !i.is_empty())
            .collect();
        if interests.is_empty() {
            interests.insert(DEFAULT_INTEREST.to_string());
        }

        Ok(Self {
            destination: destination.to_string(),
            duration_days,
            interests,
            budget,
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn interests(&self) -> impl Iterator<Item = &str> {
        self.interests.iter().map(String::as_str)
    }

    pub fn budget(&self) -> Option<&BudgetRange> {
        self.budget.as_ref()
    }
}

/// Split a comma separated interest list.
pub fn parse_interests(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
