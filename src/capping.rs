//! Statutory capping ("écrêtement").
//!
//! Two ceilings apply after the calculators have run.  The primary
//! grant and certificate credit together may not exceed a per-bracket
//! percentage of the estimated cost; when they do, both are scaled by
//! the same ratio and re-rounded independently.  The VAT saving is not
//! part of that cap, but the sum of all three streams may never exceed
//! the estimated cost, in which case the combined total is clamped.

use crate::models::IncomeBracket;
use crate::rates::RateSchedule;

/// Amounts after capping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CappedAid {
    pub primary_grant: i64,
    pub certificate_credit: i64,
    pub vat_saving: i64,
    /// Sum of the three streams, at most the estimated cost.
    pub total: i64,
    /// The percentage cap scaled grant and credit down.
    pub scaled: bool,
}

/// Absolute ceiling on grant + credit for a bracket and cost.
pub fn combined_ceiling(schedule: &RateSchedule, bracket: IncomeBracket, estimated_cost: i64) -> f64 {
    estimated_cost as f64 * schedule.combined_cap_percent(bracket) / 100.0
}

/// Scale grant and credit down to the bracket's share of the cost and
/// clamp the total to the cost.
///
/// Each scaled stream is rounded on its own, so after scaling grant +
/// credit may exceed the exact ceiling by at most one unit.
pub fn apply_caps(
    schedule: &RateSchedule,
    bracket: IncomeBracket,
    estimated_cost: i64,
    primary_grant: i64,
    certificate_credit: i64,
    vat_saving: i64,
) -> CappedAid {
    let ceiling = combined_ceiling(schedule, bracket, estimated_cost);
    let combined = primary_grant + certificate_credit;

    let (primary_grant, certificate_credit, scaled) = if combined as f64 <= ceiling {
        (primary_grant, certificate_credit, false)
    } else {
        let ratio = ceiling / combined as f64;
        (
            (primary_grant as f64 * ratio).round() as i64,
            (certificate_credit as f64 * ratio).round() as i64,
            true,
        )
    };

    let total = (primary_grant + certificate_credit + vat_saving).min(estimated_cost.max(0));

    CappedAid {
        primary_grant,
        certificate_credit,
        vat_saving,
        total,
        scaled,
    }
}
