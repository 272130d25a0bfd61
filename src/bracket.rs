//! Income-bracket resolution.

use crate::models::{IncomeBracket, Region};
use crate::rates::RateSchedule;

/// Resolve a household into one of the four income brackets.
///
/// The threshold row is selected by region and household size (sizes
/// above the tabulated maximum use the largest row) and walked in
/// ascending order; the first ceiling the income does not exceed wins.
/// A schedule without a matching row places the household above every
/// threshold.
pub fn resolve_bracket(
    schedule: &RateSchedule,
    region: Region,
    household_size: u32,
    reference_income: f64,
) -> IncomeBracket {
    let Some(row) = schedule.thresholds(region, household_size) else {
        return IncomeBracket::Higher;
    };
    [
        (row.very_modest, IncomeBracket::VeryModest),
        (row.modest, IncomeBracket::Modest),
        (row.intermediate, IncomeBracket::Intermediate),
    ]
    .into_iter()
    .find(|(ceiling, _)| reference_income <= *ceiling)
    .map_or(IncomeBracket::Higher, |(_, bracket)| bracket)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> RateSchedule {
        RateSchedule::bundled().expect("bundled schedule is valid")
    }

    #[test]
    fn single_person_standard_zone() {
        let schedule = schedule();
        let resolve = |income| resolve_bracket(&schedule, Region::Standard, 1, income);
        assert_eq!(resolve(15_000.0), IncomeBracket::VeryModest);
        assert_eq!(resolve(17_173.0), IncomeBracket::VeryModest);
        assert_eq!(resolve(17_174.0), IncomeBracket::Modest);
        assert_eq!(resolve(30_844.0), IncomeBracket::Intermediate);
        assert_eq!(resolve(30_845.0), IncomeBracket::Higher);
    }

    #[test]
    fn high_cost_zone_has_higher_ceilings() {
        let schedule = schedule();
        assert_eq!(
            resolve_bracket(&schedule, Region::Standard, 1, 20_000.0),
            IncomeBracket::Modest
        );
        assert_eq!(
            resolve_bracket(&schedule, Region::HighCost, 1, 20_000.0),
            IncomeBracket::VeryModest
        );
    }

    #[test]
    fn large_households_use_the_largest_row() {
        let schedule = schedule();
        for income in [40_000.0, 50_000.0, 70_000.0, 90_000.0] {
            assert_eq!(
                resolve_bracket(&schedule, Region::Standard, 8, income),
                resolve_bracket(&schedule, Region::Standard, 5, income)
            );
        }
    }

    #[test]
    fn increasing_income_never_improves_the_bracket() {
        let schedule = schedule();
        for region in [Region::Standard, Region::HighCost] {
            for size in 1..=7 {
                let mut previous = IncomeBracket::VeryModest;
                for step in 0..=240 {
                    let income = f64::from(step) * 500.0;
                    let bracket = resolve_bracket(&schedule, region, size, income);
                    assert!(bracket >= previous, "{region:?}/{size} at {income}");
                    previous = bracket;
                }
                assert_eq!(previous, IncomeBracket::Higher);
            }
        }
    }
}
