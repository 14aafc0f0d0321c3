//! Calendar-based savings terms.
//!
//! The engine works in whole days; savers think in dates. `MaturityTerm`
//! converts a start date, a maturity date and an as-of date into the two day
//! counts a `PenaltyRequest` needs.

use chrono::NaiveDate;

use crate::domain::Field;
use crate::engine::{FieldError, FieldErrorKind, PenaltyError};

/// A commitment running from `start` to `maturity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaturityTerm {
    pub start: NaiveDate,
    pub maturity: NaiveDate,
}

/// Day counts derived from a term at a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermDays {
    pub days_remaining: u32,
    pub total_maturity_days: u32,
}

impl MaturityTerm {
    pub fn new(start: NaiveDate, maturity: NaiveDate) -> Result<Self, PenaltyError> {
        if maturity <= start {
            return Err(PenaltyError::field(
                Field::TotalMaturityDays,
                FieldErrorKind::DivisionUndefined,
            ));
        }
        Ok(Self { start, maturity })
    }

    /// Convenience for callers that only hold the three dates.
    pub fn from_dates(
        start: NaiveDate,
        maturity: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<TermDays, PenaltyError> {
        Self::new(start, maturity)?.days_at(as_of)
    }

    pub fn total_days(&self) -> Result<u32, PenaltyError> {
        day_count(self.start, self.maturity, Field::TotalMaturityDays)
    }

    /// Days remaining at `as_of`, clamped to the term (before start = full
    /// term, after maturity = 0).
    pub fn days_at(&self, as_of: NaiveDate) -> Result<TermDays, PenaltyError> {
        let total_maturity_days = self.total_days()?;
        let days_remaining = if as_of <= self.start {
            total_maturity_days
        } else if as_of >= self.maturity {
            0
        } else {
            day_count(as_of, self.maturity, Field::DaysRemaining)?
        };
        Ok(TermDays {
            days_remaining,
            total_maturity_days,
        })
    }
}

fn day_count(from: NaiveDate, to: NaiveDate, field: Field) -> Result<u32, PenaltyError> {
    let days = (to - from).num_days();
    u32::try_from(days).map_err(|_| {
        PenaltyError::InvalidInput(vec![FieldError::new(field, FieldErrorKind::OutOfRange)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn one_year_term_mid_way() {
        let days = MaturityTerm::from_dates(date(2025, 1, 1), date(2026, 1, 1), date(2025, 12, 2)).unwrap();
        assert_eq!(days.total_maturity_days, 365);
        assert_eq!(days.days_remaining, 30);
    }

    #[test]
    fn as_of_outside_term_is_clamped() {
        let term = MaturityTerm::new(date(2025, 1, 1), date(2025, 4, 1)).unwrap();
        let before = term.days_at(date(2024, 6, 1)).unwrap();
        assert_eq!(before.days_remaining, before.total_maturity_days);
        assert_eq!(before.total_maturity_days, 90);

        let after = term.days_at(date(2030, 1, 1)).unwrap();
        assert_eq!(after.days_remaining, 0);
    }

    #[test]
    fn maturity_on_or_before_start_is_division_undefined() {
        let err = MaturityTerm::new(date(2025, 1, 1), date(2025, 1, 1)).unwrap_err();
        assert!(err.is_division_undefined());

        let err = MaturityTerm::new(date(2025, 2, 1), date(2025, 1, 1)).unwrap_err();
        assert!(err.is_division_undefined());
    }
}
