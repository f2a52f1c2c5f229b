//! Reservation domain entity

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::shared::{DomainError, DomainResult};

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationStatus {
    /// Created, waiting for an administrator
    Pending,
    /// Approved, rental starts in the future
    Approved,
    /// Vehicle handed over
    Active,
    /// Refused by an administrator
    Rejected,
    /// Withdrawn by the owning account
    Cancelled,
    /// Vehicle returned
    Completed,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 6] = [
        Self::Pending,
        Self::Approved,
        Self::Active,
        Self::Rejected,
        Self::Cancelled,
        Self::Completed,
    ];

    /// Statuses that no longer hold the vehicle's calendar
    pub const RELEASED: [ReservationStatus; 3] =
        [Self::Rejected, Self::Cancelled, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Active => "ACTIVE",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive calendar date range, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::InvalidRequest(format!(
                "end_date {} is before start_date {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of billable days; both ends count
    pub fn inclusive_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// True iff the ranges share at least one day
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// `daily_rate` x inclusive days. Fails when the product does not fit
    /// in a `Decimal`.
    pub fn total_cost(&self, daily_rate: Decimal) -> DomainResult<Decimal> {
        daily_rate
            .checked_mul(Decimal::from(self.inclusive_days()))
            .ok_or_else(|| {
                DomainError::InvalidRequest(format!(
                    "total cost of {} days at {} per day is out of range",
                    self.inclusive_days(),
                    daily_rate
                ))
            })
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A reservation of one vehicle by one account
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: i32,
    pub vehicle_id: i32,
    pub account_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: Decimal,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_owned_by(&self, account_id: &str) -> bool {
        self.account_id == account_id
    }
}

/// Admitted reservation about to be written to the ledger as `PENDING`
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub vehicle_id: i32,
    pub account_id: String,
    pub period: DateRange,
    pub total_cost: Decimal,
}

impl NewReservation {
    pub fn priced(
        vehicle_id: i32,
        account_id: impl Into<String>,
        period: DateRange,
        daily_rate: Decimal,
    ) -> DomainResult<Self> {
        Ok(Self {
            vehicle_id,
            account_id: account_id.into(),
            period,
            total_cost: period.total_cost(daily_rate)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn range(a: NaiveDate, b: NaiveDate) -> DateRange {
        DateRange::new(a, b).unwrap()
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = DateRange::new(d(2024, 1, 12), d(2024, 1, 10)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn single_day_range_is_one_day() {
        let r = range(d(2024, 1, 10), d(2024, 1, 10));
        assert_eq!(r.inclusive_days(), 1);
    }

    #[test]
    fn cost_counts_both_ends() {
        let r = range(d(2024, 1, 10), d(2024, 1, 12));
        assert_eq!(r.inclusive_days(), 3);
        assert_eq!(r.total_cost(Decimal::from(350_000)).unwrap(), Decimal::from(1_050_000));
    }

    #[test]
    fn cost_keeps_fractional_rates_exact() {
        let r = range(d(2024, 2, 27), d(2024, 3, 1)); // leap year: 4 days
        let rate = Decimal::new(4999, 2);
        assert_eq!(r.total_cost(rate).unwrap(), Decimal::new(19996, 2));
    }

    #[test]
    fn cost_overflow_is_an_invalid_request() {
        let r = range(d(2024, 1, 10), d(2024, 1, 11));
        let err = r.total_cost(Decimal::MAX).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));

        let new = NewReservation::priced(7, "acc-1", r, Decimal::MAX);
        assert!(matches!(new, Err(DomainError::InvalidRequest(_))));
    }

    #[test]
    fn overlap_is_inclusive_at_both_ends() {
        let base = range(d(2024, 1, 10), d(2024, 1, 12));

        // touching on the last day
        assert!(base.overlaps(&range(d(2024, 1, 12), d(2024, 1, 14))));
        // touching on the first day
        assert!(base.overlaps(&range(d(2024, 1, 8), d(2024, 1, 10))));
        // contained and containing
        assert!(base.overlaps(&range(d(2024, 1, 11), d(2024, 1, 11))));
        assert!(base.overlaps(&range(d(2024, 1, 1), d(2024, 1, 31))));
        // adjacent but disjoint
        assert!(!base.overlaps(&range(d(2024, 1, 13), d(2024, 1, 15))));
        assert!(!base.overlaps(&range(d(2024, 1, 5), d(2024, 1, 9))));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = range(d(2024, 1, 10), d(2024, 1, 12));
        let b = range(d(2024, 1, 11), d(2024, 1, 13));
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn released_set_is_the_terminal_statuses() {
        for status in ReservationStatus::ALL {
            let expected = matches!(
                status,
                ReservationStatus::Rejected
                    | ReservationStatus::Cancelled
                    | ReservationStatus::Completed
            );
            assert_eq!(ReservationStatus::RELEASED.contains(&status), expected, "{}", status);
        }
    }

    #[test]
    fn status_strings_parse_back() {
        for status in ReservationStatus::ALL {
            assert_eq!(ReservationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReservationStatus::parse("Unknown"), None);
    }

    #[test]
    fn priced_reservation_uses_inclusive_days() {
        let new = NewReservation::priced(
            7,
            "acc-1",
            range(d(2024, 1, 10), d(2024, 1, 12)),
            Decimal::from(350_000),
        )
        .unwrap();
        assert_eq!(new.total_cost, Decimal::from(1_050_000));
        assert_eq!(new.account_id, "acc-1");
    }
}
