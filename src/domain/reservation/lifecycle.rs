//! Rental lifecycle
//!
//! The transition table is a single exhaustive `match` over
//! `(ReservationStatus, RentalEvent)`; adding a status or an event fails to
//! compile until every pair has been decided.

use chrono::{NaiveDate, Utc};

use super::model::{Reservation, ReservationStatus};
use crate::domain::vehicle::VehicleStatus;
use crate::shared::{DomainError, DomainResult};

/// Something that happens to a reservation after admission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalEvent {
    /// Administrator accepts the booking
    Approve,
    /// Administrator refuses the booking
    Reject,
    /// Owning account withdraws the booking
    Cancel,
    /// Administrator records the vehicle's return
    Complete,
}

impl RentalEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }

    /// Audit action name recorded for this event
    pub fn audit_action(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE_RENTAL",
            Self::Reject => "REJECT_RENTAL",
            Self::Cancel => "CANCEL_RENTAL",
            Self::Complete => "COMPLETE_RENTAL",
        }
    }
}

impl std::fmt::Display for RentalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a legal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ReservationStatus,
    pub to: ReservationStatus,
    /// Status the vehicle must take in the same unit of work, if any
    pub vehicle_status: Option<VehicleStatus>,
}

impl ReservationStatus {
    /// Look up the transition for `event`.
    ///
    /// `starts_by_today` decides whether an approval hands the vehicle over
    /// immediately (`ACTIVE`) or waits (`APPROVED`).
    pub fn transition(self, event: RentalEvent, starts_by_today: bool) -> DomainResult<Transition> {
        use RentalEvent::*;
        use ReservationStatus::*;

        let (to, vehicle_status) = match (self, event) {
            (Pending, Approve) if starts_by_today => (Active, Some(VehicleStatus::Rented)),
            (Pending, Approve) => (Approved, None),
            (Pending, Reject) => (Rejected, None),
            (Pending, Cancel) => (Cancelled, None),
            (Approved | Active, Complete) => (Completed, Some(VehicleStatus::Available)),

            (Pending, Complete)
            | (Approved | Active, Approve | Reject | Cancel)
            | (Rejected | Cancelled | Completed, Approve | Reject | Cancel | Complete) => {
                return Err(DomainError::InvalidRequest(format!(
                    "cannot {} a reservation in status {}",
                    event, self
                )));
            }
        };

        Ok(Transition {
            from: self,
            to,
            vehicle_status,
        })
    }
}

impl Reservation {
    /// Apply `event` on behalf of `caller_account_id`.
    ///
    /// Cancel requires ownership; the ownership check runs before the status
    /// guard so a foreign caller never learns anything from the status.
    /// Role checks for administrator events belong to the caller.
    pub fn apply(
        &mut self,
        event: RentalEvent,
        caller_account_id: &str,
        today: NaiveDate,
    ) -> DomainResult<Transition> {
        if event == RentalEvent::Cancel && !self.is_owned_by(caller_account_id) {
            return Err(DomainError::InvalidRequest(format!(
                "reservation {} belongs to another account",
                self.id
            )));
        }

        let transition = self.status.transition(event, self.start_date <= today)?;
        self.status = transition.to;
        self.updated_at = Utc::now();
        Ok(transition)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const EVENTS: [RentalEvent; 4] = [
        RentalEvent::Approve,
        RentalEvent::Reject,
        RentalEvent::Cancel,
        RentalEvent::Complete,
    ];

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reservation(status: ReservationStatus, start: NaiveDate) -> Reservation {
        Reservation {
            id: 1,
            vehicle_id: 10,
            account_id: "owner".into(),
            start_date: start,
            end_date: start + chrono::Duration::days(2),
            total_cost: Decimal::from(1_050_000),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn approve_starting_today_activates_and_rents_vehicle() {
        let today = d(2024, 1, 10);
        let mut r = reservation(ReservationStatus::Pending, today);
        let t = r.apply(RentalEvent::Approve, "admin", today).unwrap();
        assert_eq!(t.to, ReservationStatus::Active);
        assert_eq!(t.vehicle_status, Some(VehicleStatus::Rented));
        assert_eq!(r.status, ReservationStatus::Active);
    }

    #[test]
    fn approve_started_in_the_past_activates() {
        let mut r = reservation(ReservationStatus::Pending, d(2024, 1, 8));
        let t = r.apply(RentalEvent::Approve, "admin", d(2024, 1, 10)).unwrap();
        assert_eq!(t.to, ReservationStatus::Active);
    }

    #[test]
    fn approve_future_start_leaves_vehicle_alone() {
        let mut r = reservation(ReservationStatus::Pending, d(2024, 1, 11));
        let t = r.apply(RentalEvent::Approve, "admin", d(2024, 1, 10)).unwrap();
        assert_eq!(t.to, ReservationStatus::Approved);
        assert_eq!(t.vehicle_status, None);
    }

    #[test]
    fn reject_and_cancel_from_pending() {
        let today = d(2024, 1, 10);

        let mut r = reservation(ReservationStatus::Pending, today);
        let t = r.apply(RentalEvent::Reject, "admin", today).unwrap();
        assert_eq!((t.from, t.to), (ReservationStatus::Pending, ReservationStatus::Rejected));
        assert_eq!(t.vehicle_status, None);

        let mut r = reservation(ReservationStatus::Pending, today);
        let t = r.apply(RentalEvent::Cancel, "owner", today).unwrap();
        assert_eq!(t.to, ReservationStatus::Cancelled);
        assert_eq!(t.vehicle_status, None);
    }

    #[test]
    fn complete_returns_vehicle_from_approved_or_active() {
        let today = d(2024, 1, 10);
        for status in [ReservationStatus::Approved, ReservationStatus::Active] {
            let mut r = reservation(status, today);
            let t = r.apply(RentalEvent::Complete, "admin", today).unwrap();
            assert_eq!(t.to, ReservationStatus::Completed);
            assert_eq!(t.vehicle_status, Some(VehicleStatus::Available));
        }
    }

    #[test]
    fn terminal_states_reject_every_event() {
        let today = d(2024, 1, 10);
        for status in ReservationStatus::RELEASED {
            for event in EVENTS {
                let mut r = reservation(status, today);
                let err = r.apply(event, "owner", today).unwrap_err();
                assert!(
                    matches!(err, DomainError::InvalidRequest(_)),
                    "{} from {} should be invalid",
                    event,
                    status
                );
                assert_eq!(r.status, status, "status must not change on failure");
            }
        }
    }

    #[test]
    fn illegal_non_terminal_pairs_are_rejected() {
        let today = d(2024, 1, 10);
        let cases = [
            (ReservationStatus::Pending, RentalEvent::Complete),
            (ReservationStatus::Approved, RentalEvent::Approve),
            (ReservationStatus::Approved, RentalEvent::Reject),
            (ReservationStatus::Approved, RentalEvent::Cancel),
            (ReservationStatus::Active, RentalEvent::Approve),
            (ReservationStatus::Active, RentalEvent::Reject),
            (ReservationStatus::Active, RentalEvent::Cancel),
        ];
        for (status, event) in cases {
            let mut r = reservation(status, today);
            assert!(r.apply(event, "owner", today).is_err(), "{} from {}", event, status);
        }
    }

    #[test]
    fn cancel_by_other_account_fails_in_any_status() {
        let today = d(2024, 1, 10);
        for status in ReservationStatus::ALL {
            let mut r = reservation(status, today);
            let err = r.apply(RentalEvent::Cancel, "intruder", today).unwrap_err();
            match err {
                DomainError::InvalidRequest(msg) => assert!(msg.contains("another account")),
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(r.status, status);
        }
    }

    #[test]
    fn audit_actions_are_distinct() {
        let mut actions: Vec<_> = EVENTS.iter().map(|e| e.audit_action()).collect();
        actions.sort();
        actions.dedup();
        assert_eq!(actions.len(), EVENTS.len());
    }
}
