//! Expiry evaluation.
//!
//! A message's deadline is `anchor + ttl`, where the anchor is either the
//! creation time embedded in the payload or the first successful view
//! recorded in the ledger. `ttl == 0` never expires.
//!
//! The boundary is inclusive: a message is still readable at exactly the
//! deadline and expired strictly after it. The live countdown reports zero
//! remaining at the deadline and the reader hides the message on that tick.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

/// Which timestamp starts the time-to-live clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryAnchor {
    /// `createdAt + ttl`
    #[default]
    Creation,
    /// `firstViewedAt + ttl`; the first reveal starts the clock
    FirstView,
}

impl fmt::Display for ExpiryAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creation => f.write_str("creation"),
            Self::FirstView => f.write_str("first-view"),
        }
    }
}

/// Result of checking a message against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// No TTL
    Never,
    /// Readable until the given instant (inclusive)
    Until(DateTime<Utc>),
    /// Deadline has passed
    Expired,
}

impl Expiry {
    /// Compute the deadline for a message.
    ///
    /// With [`ExpiryAnchor::FirstView`] and no recorded first view, the clock
    /// starts at `now`: the caller is about to make the first view.
    pub fn deadline(
        anchor: ExpiryAnchor,
        created_at: DateTime<Utc>,
        first_viewed_at: Option<DateTime<Utc>>,
        ttl_secs: u64,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if ttl_secs == 0 {
            return None;
        }
        let start = match anchor {
            ExpiryAnchor::Creation => created_at,
            ExpiryAnchor::FirstView => first_viewed_at.unwrap_or(now),
        };
        let ttl = i64::try_from(ttl_secs).ok().and_then(TimeDelta::try_seconds)?;
        // Saturate instead of overflowing for absurd timestamps
        Some(start.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// Evaluate a deadline at `now`.
    pub fn evaluate(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match deadline {
            None => Self::Never,
            Some(deadline) if now > deadline => Self::Expired,
            Some(deadline) => Self::Until(deadline),
        }
    }

    /// Returns true if the deadline has passed.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

/// Whole seconds left until `deadline`, rounded up, floored at zero.
pub fn remaining_secs(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = deadline.signed_duration_since(now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    u64::try_from(millis).map_or(u64::MAX, |ms| ms.div_ceil(1000))
}

/// Render a countdown as `Ns`, `M:SS` or `H:MM:SS`.
pub fn format_remaining(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else if minutes > 0 {
        format!("{minutes}:{seconds:02}")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + TimeDelta::seconds(secs)
    }

    #[test]
    fn zero_ttl_never_expires() {
        let deadline = Expiry::deadline(ExpiryAnchor::Creation, t0(), None, 0, at(0));
        assert_eq!(deadline, None);
        assert_eq!(Expiry::evaluate(deadline, at(10 * 365 * 86_400)), Expiry::Never);
    }

    #[test]
    fn creation_anchor_boundary_is_inclusive() {
        let deadline = Expiry::deadline(ExpiryAnchor::Creation, t0(), None, 30, at(0));

        assert_eq!(Expiry::evaluate(deadline, at(29)), Expiry::Until(at(30)));
        assert_eq!(Expiry::evaluate(deadline, at(30)), Expiry::Until(at(30)));
        assert_eq!(Expiry::evaluate(deadline, at(31)), Expiry::Expired);
    }

    #[test]
    fn one_millisecond_past_deadline_is_expired() {
        let deadline = Expiry::deadline(ExpiryAnchor::Creation, t0(), None, 30, at(0));
        let just_after = at(30) + TimeDelta::milliseconds(1);
        assert!(Expiry::evaluate(deadline, just_after).is_expired());
    }

    #[test]
    fn first_view_anchor_uses_recorded_view() {
        let deadline =
            Expiry::deadline(ExpiryAnchor::FirstView, t0(), Some(at(100)), 30, at(200));
        assert_eq!(deadline, Some(at(130)));
    }

    #[test]
    fn first_view_anchor_without_record_starts_now() {
        let deadline = Expiry::deadline(ExpiryAnchor::FirstView, t0(), None, 30, at(500));
        assert_eq!(deadline, Some(at(530)));
    }

    #[test]
    fn creation_anchor_ignores_first_view() {
        let deadline =
            Expiry::deadline(ExpiryAnchor::Creation, t0(), Some(at(100)), 30, at(200));
        assert_eq!(deadline, Some(at(30)));
    }

    #[test]
    fn remaining_rounds_up_and_floors_at_zero() {
        assert_eq!(remaining_secs(at(30), at(0)), 30);
        assert_eq!(remaining_secs(at(30), at(29) + TimeDelta::milliseconds(1)), 1);
        assert_eq!(remaining_secs(at(30), at(30)), 0);
        assert_eq!(remaining_secs(at(30), at(45)), 0);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_remaining(0), "0s");
        assert_eq!(format_remaining(59), "59s");
        assert_eq!(format_remaining(60), "1:00");
        assert_eq!(format_remaining(3599), "59:59");
        assert_eq!(format_remaining(3600), "1:00:00");
        assert_eq!(format_remaining(86_400), "24:00:00");
    }

    #[test]
    fn anchor_display() {
        assert_eq!(ExpiryAnchor::default().to_string(), "creation");
        assert_eq!(ExpiryAnchor::FirstView.to_string(), "first-view");
    }
}
