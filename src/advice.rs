//! Advisory generator.
//!
//! Advisories never influence amounts.  Trigger conditions are decided
//! in [`advise`] and [`ineligibility_advice`] as [`Notice`] values;
//! wording lives separately in [`Notice::message`] so it can be
//! rephrased or localised without touching the triggers.

use crate::eligibility::{Ineligibility, MIN_PROPERTY_AGE_YEARS};
use crate::models::{
    Advisory, AdvisoryKind, CalculationResult, HousingType, IncomeBracket, WorkOrder, WorkType,
};
use crate::pricing::PricedItem;
use crate::rates::RateSchedule;

/// Coverage at or above this percentage is called out as high.
pub const HIGH_COVERAGE_PERCENT: i64 = 70;

/// Projects with at least this many gestures and this cost are
/// encouraged to start with an energy audit.
pub const AUDIT_MIN_GESTURES: usize = 2;
pub const AUDIT_MIN_COST: i64 = 15_000;

/// A triggered advisory with the data its wording needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Ineligible(Ineligibility),
    Bracket(IncomeBracket),
    InteriorWallSunset { sunset: Option<String> },
    ZeroInterestLoan { remaining_cost: i64 },
    HighCoverage { percent: i64 },
    EnergyAuditSuggested,
    CoOwnershipApproval,
}

impl Notice {
    pub fn kind(&self) -> AdvisoryKind {
        match self {
            Notice::Ineligible(Ineligibility::NotPrimaryResidence) => {
                AdvisoryKind::NotPrimaryResidence
            }
            Notice::Ineligible(Ineligibility::PropertyTooRecent { .. }) => {
                AdvisoryKind::PropertyTooRecent
            }
            Notice::Ineligible(Ineligibility::NoWorkSelected) => AdvisoryKind::NoWorkSelected,
            Notice::Bracket(_) => AdvisoryKind::BracketFraming,
            Notice::InteriorWallSunset { .. } => AdvisoryKind::InteriorWallSunset,
            Notice::ZeroInterestLoan { .. } => AdvisoryKind::ZeroInterestLoan,
            Notice::HighCoverage { .. } => AdvisoryKind::HighCoverage,
            Notice::EnergyAuditSuggested => AdvisoryKind::EnergyAuditSuggested,
            Notice::CoOwnershipApproval => AdvisoryKind::CoOwnershipApproval,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::Ineligible(Ineligibility::NotPrimaryResidence) => {
                "Subsidies only apply to a primary residence.".to_string()
            }
            Notice::Ineligible(Ineligibility::PropertyTooRecent { age_years }) => format!(
                "The property is {age_years} years old; it must be at least \
                 {MIN_PROPERTY_AGE_YEARS} years old to qualify."
            ),
            Notice::Ineligible(Ineligibility::NoWorkSelected) => {
                "Select at least one type of work to estimate subsidies.".to_string()
            }
            Notice::Bracket(bracket) => match bracket {
                IncomeBracket::VeryModest => {
                    "Your household qualifies for the highest subsidy rates.".to_string()
                }
                IncomeBracket::Modest => {
                    "Your household qualifies for increased subsidy rates.".to_string()
                }
                IncomeBracket::Intermediate => {
                    "Your household qualifies for intermediate subsidy rates.".to_string()
                }
                IncomeBracket::Higher | IncomeBracket::NotEligible => {
                    "Your income is above the per-gesture grant thresholds; energy \
                     certificates and reduced VAT still apply."
                        .to_string()
                }
            },
            Notice::InteriorWallSunset { sunset } => match sunset {
                Some(date) => format!(
                    "Interior-wall insulation leaves the per-gesture grant scheme on {date}; \
                     file your application before then."
                ),
                None => "Interior-wall insulation is being withdrawn from the per-gesture \
                         grant scheme; file your application early."
                    .to_string(),
            },
            Notice::ZeroInterestLoan { remaining_cost } => format!(
                "The remaining {remaining_cost} € can be financed with a zero-interest \
                 retrofit loan (éco-PTZ)."
            ),
            Notice::HighCoverage { percent } => {
                format!("Subsidies cover {percent}% of the estimated cost.")
            }
            Notice::EnergyAuditSuggested => {
                "For a project of this size, an energy audit helps prioritise the work \
                 and may unlock the whole-home renovation path."
                    .to_string()
            }
            Notice::CoOwnershipApproval => {
                "Exterior work on an apartment building must be approved by the \
                 co-owners' general meeting."
                    .to_string()
            }
        }
    }

    fn into_advisory(self) -> Advisory {
        Advisory {
            kind: self.kind(),
            message: self.message(),
        }
    }
}

/// Advisories for an order rejected by the eligibility gate.
pub fn ineligibility_advice(failures: &[Ineligibility]) -> Vec<Advisory> {
    dedup(failures.iter().copied().map(Notice::Ineligible))
}

/// Advisories for a computed, eligible result.  `items` is the priced
/// work the result was computed from.
pub fn advise(
    result: &CalculationResult,
    order: &WorkOrder,
    items: &[PricedItem],
    schedule: &RateSchedule,
) -> Vec<Advisory> {
    let work: Vec<WorkType> = items.iter().map(PricedItem::work).collect();
    let mut notices = vec![Notice::Bracket(result.bracket)];

    if work.contains(&WorkType::InteriorWallInsulation) {
        notices.push(Notice::InteriorWallSunset {
            sunset: schedule
                .sunset(WorkType::InteriorWallInsulation)
                .map(str::to_string),
        });
    }
    if order.housing_type == HousingType::Apartment
        && work.iter().any(|work| work.is_exterior())
    {
        notices.push(Notice::CoOwnershipApproval);
    }
    if result.zero_interest_loan && result.remaining_cost > 0 {
        notices.push(Notice::ZeroInterestLoan {
            remaining_cost: result.remaining_cost,
        });
    }
    if result.amounts.coverage_percent >= HIGH_COVERAGE_PERCENT {
        notices.push(Notice::HighCoverage {
            percent: result.amounts.coverage_percent,
        });
    }
    if result.gesture_count >= AUDIT_MIN_GESTURES
        && result.estimated_cost >= AUDIT_MIN_COST
        && !work.contains(&WorkType::EnergyAudit)
    {
        notices.push(Notice::EnergyAuditSuggested);
    }

    dedup(notices)
}

fn dedup(notices: impl IntoIterator<Item = Notice>) -> Vec<Advisory> {
    let mut advisories: Vec<Advisory> = Vec::new();
    for advisory in notices.into_iter().map(Notice::into_advisory) {
        if !advisories.iter().any(|seen| seen.kind == advisory.kind) {
            advisories.push(advisory);
        }
    }
    advisories
}
