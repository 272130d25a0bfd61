//! Subsidy calculators.
//!
//! Each subsidy stream is computed by an implementation of the
//! [`AidCalculator`] trait.  Calculators are independent of one another:
//! they read the normalised work items, the resolved bracket and the
//! rate schedule, and return a raw amount rounded to the nearest whole
//! currency unit.  Statutory capping is applied afterwards by the
//! [`capping`](crate::capping) module.

use crate::models::{AidStream, IncomeBracket, Region};
use crate::pricing::PricedItem;
use crate::rates::RateSchedule;

/// Everything a calculator may read for one estimate.
#[derive(Debug, Clone, Copy)]
pub struct AidContext<'a> {
    pub items: &'a [PricedItem],
    pub bracket: IncomeBracket,
    pub region: Region,
    /// Rounded estimated cost of `items`.
    pub estimated_cost: i64,
    pub schedule: &'a RateSchedule,
}

/// Computes one subsidy stream.
///
/// Calculators must be thread-safe (`Send + Sync`) because batch
/// estimates run concurrently across threads.
pub trait AidCalculator: Send + Sync {
    fn stream(&self) -> AidStream;
    /// Raw amount before the combined percentage cap.
    fn calculate(&self, ctx: &AidContext<'_>) -> i64;
}

/// Per-gesture primary grant.
///
/// Rates depend on the bracket; brackets without access to the grant
/// always receive zero.  The sum is clipped to the bracket's aggregate
/// ceiling before returning.
pub struct PrimaryGrantCalculator;

impl PrimaryGrantCalculator {
    /// Unclipped, unrounded grant for the given items.
    pub fn raw_amount(ctx: &AidContext<'_>) -> f64 {
        if !ctx.bracket.receives_primary_grant() {
            return 0.0;
        }
        ctx.items
            .iter()
            .map(|item| {
                let rate = ctx.schedule.grant_rate(item.work(), ctx.bracket);
                match *item {
                    PricedItem::Surface { work, area_m2, .. } => {
                        let area = ctx
                            .schedule
                            .grant_surface_cap(work)
                            .map_or(area_m2, |cap| area_m2.min(cap));
                        area * rate
                    }
                    PricedItem::Units { count, .. } => f64::from(count) * rate,
                    PricedItem::Flat { .. } => rate,
                }
            })
            .sum()
    }
}

impl AidCalculator for PrimaryGrantCalculator {
    fn stream(&self) -> AidStream {
        AidStream::PrimaryGrant
    }

    fn calculate(&self, ctx: &AidContext<'_>) -> i64 {
        let ceiling = ctx.schedule.aggregate_ceiling(ctx.bracket);
        Self::raw_amount(ctx).min(ceiling).round() as i64
    }
}

/// Energy-saving certificate credit.  One rate per m² of insulation and
/// one per replaced window or skylight, both set per region.
pub struct CertificateCreditCalculator;

impl AidCalculator for CertificateCreditCalculator {
    fn stream(&self) -> AidStream {
        AidStream::CertificateCredit
    }

    fn calculate(&self, ctx: &AidContext<'_>) -> i64 {
        let rates = ctx.schedule.certificate_rates(ctx.region);
        let amount: f64 = ctx
            .items
            .iter()
            .map(|item| match *item {
                PricedItem::Surface { work, area_m2, .. } if work.is_insulation() => {
                    area_m2 * rates.insulation_per_m2
                }
                PricedItem::Units { work, count, .. } if work.is_opening() => {
                    f64::from(count) * rates.opening_per_unit
                }
                _ => 0.0,
            })
            .sum();
        amount.round() as i64
    }
}

/// Saving obtained by invoicing at the reduced VAT rate instead of the
/// standard one.  Only the total cost matters.
pub struct VatSavingCalculator;

impl AidCalculator for VatSavingCalculator {
    fn stream(&self) -> AidStream {
        AidStream::VatSaving
    }

    fn calculate(&self, ctx: &AidContext<'_>) -> i64 {
        (ctx.estimated_cost as f64 * ctx.schedule.vat_differential_percent() / 100.0).round()
            as i64
    }
}

/// The three calculators, in breakdown order.
pub fn calculators() -> [&'static dyn AidCalculator; 3] {
    [
        &PrimaryGrantCalculator,
        &CertificateCreditCalculator,
        &VatSavingCalculator,
    ]
}
