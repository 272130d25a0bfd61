//! Eligibility gate.
//!
//! Runs before any monetary computation.  A failed gate is a normal
//! outcome: the engine returns a zeroed, ineligible result carrying one
//! advisory per failed condition.

use crate::models::WorkOrder;

/// Minimum age of the dwelling, in years, for the grant schemes.
pub const MIN_PROPERTY_AGE_YEARS: u32 = 15;

/// A qualification condition the order does not meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    NotPrimaryResidence,
    PropertyTooRecent { age_years: u32 },
    NoWorkSelected,
}

/// Every failed condition, in a fixed order.  Empty when the order may
/// proceed to pricing.
pub fn check_eligibility(order: &WorkOrder) -> Vec<Ineligibility> {
    let mut failures = Vec::new();
    if !order.primary_residence {
        failures.push(Ineligibility::NotPrimaryResidence);
    }
    if order.property_age_years < MIN_PROPERTY_AGE_YEARS {
        failures.push(Ineligibility::PropertyTooRecent {
            age_years: order.property_age_years,
        });
    }
    if !order.has_work_selection() {
        failures.push(Ineligibility::NoWorkSelected);
    }
    failures
}
