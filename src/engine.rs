//! Subsidy estimation engine.
//!
//! The `engine` module turns a [`WorkOrder`] into a
//! [`CalculationResult`].  A single estimate is a pure, synchronous
//! computation: eligibility gate, bracket resolution, pricing, the
//! three subsidy calculators, capping and finally advisories.  Batches
//! of independent orders are spread across CPU cores with [`rayon`];
//! the only state they share is the read-only [`RateSchedule`].

use crate::advice::{advise, ineligibility_advice};
use crate::aid::{calculators, AidContext};
use crate::bracket::resolve_bracket;
use crate::capping::apply_caps;
use crate::eligibility::check_eligibility;
use crate::models::{
    AidAmounts, AidLine, AidStream, CalculationResult, IncomeBracket, WorkOrder, WorkType,
};
use crate::pricing::{estimate_cost, priced_items, PricedItem};
use crate::rates::RateSchedule;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Estimate the subsidies for one work order.
///
/// Never fails: an order that does not qualify yields a result with
/// `eligible == false`, zeroed amounts and advisories naming the
/// failed conditions.
pub fn run_estimate(order: &WorkOrder, schedule: &RateSchedule) -> CalculationResult {
    let failures = check_eligibility(order);
    if !failures.is_empty() {
        debug!(?failures, "work order rejected by eligibility gate");
        return CalculationResult {
            edition: schedule.edition.clone(),
            bracket: IncomeBracket::NotEligible,
            eligible: false,
            amounts: AidAmounts::default(),
            estimated_cost: 0,
            remaining_cost: 0,
            breakdown: Vec::new(),
            gesture_count: 0,
            capped: false,
            zero_interest_loan: false,
            reduced_vat: false,
            advisories: ineligibility_advice(&failures),
        };
    }

    let bracket = resolve_bracket(
        schedule,
        order.region,
        order.household_size,
        order.reference_income,
    );
    let items = priced_items(order, schedule);
    let estimated_cost = estimate_cost(&items);

    let ctx = AidContext {
        items: &items,
        bracket,
        region: order.region,
        estimated_cost,
        schedule,
    };
    let raw: HashMap<AidStream, i64> = calculators()
        .iter()
        .map(|calculator| (calculator.stream(), calculator.calculate(&ctx)))
        .collect();
    let raw_amount = |stream: AidStream| raw.get(&stream).copied().unwrap_or(0);

    let capped = apply_caps(
        schedule,
        bracket,
        estimated_cost,
        raw_amount(AidStream::PrimaryGrant),
        raw_amount(AidStream::CertificateCredit),
        raw_amount(AidStream::VatSaving),
    );

    let coverage_percent = if estimated_cost == 0 {
        0
    } else {
        (capped.total as f64 / estimated_cost as f64 * 100.0).round() as i64
    };
    let amounts = AidAmounts {
        primary_grant: capped.primary_grant,
        certificate_credit: capped.certificate_credit,
        vat_saving: capped.vat_saving,
        total: capped.total,
        coverage_percent,
    };

    let mut result = CalculationResult {
        edition: schedule.edition.clone(),
        bracket,
        eligible: true,
        amounts,
        estimated_cost,
        remaining_cost: (estimated_cost - capped.total).max(0),
        breakdown: breakdown(&amounts, &items, schedule),
        gesture_count: items
            .iter()
            .filter(|item| is_subsidised(item.work(), schedule))
            .count(),
        capped: capped.scaled,
        zero_interest_loan: estimated_cost > 0,
        reduced_vat: true,
        advisories: Vec::new(),
    };
    result.advisories = advise(&result, order, &items, schedule);

    debug!(
        ?bracket,
        estimated_cost,
        primary_grant = amounts.primary_grant,
        certificate_credit = amounts.certificate_credit,
        vat_saving = amounts.vat_saving,
        capped = capped.scaled,
        "subsidy estimate computed"
    );
    result
}

/// Estimate many independent work orders in parallel.  Results are in
/// the same order as `orders`.
pub fn run_batch(orders: &[WorkOrder], schedule: &RateSchedule) -> Vec<CalculationResult> {
    orders
        .par_iter()
        .map(|order| run_estimate(order, schedule))
        .collect()
}

fn is_subsidised(work: WorkType, schedule: &RateSchedule) -> bool {
    schedule.grant_rates.contains_key(&work) || work.is_insulation() || work.is_opening()
}

fn breakdown(amounts: &AidAmounts, items: &[PricedItem], schedule: &RateSchedule) -> Vec<AidLine> {
    let gestures = items
        .iter()
        .map(PricedItem::work)
        .filter(|work| schedule.grant_rates.contains_key(work))
        .map(WorkType::label)
        .collect::<Vec<_>>()
        .join(", ");

    [
        AidStream::PrimaryGrant,
        AidStream::CertificateCredit,
        AidStream::VatSaving,
    ]
    .into_iter()
    .filter(|stream| amounts.get(*stream) != 0)
    .map(|stream| AidLine {
        stream,
        name: stream.name().to_string(),
        amount: amounts.get(stream),
        description: match stream {
            AidStream::PrimaryGrant => format!("Per-gesture grant for {gestures}"),
            AidStream::CertificateCredit => {
                "Energy-saving certificate bonus at regional rates".to_string()
            }
            AidStream::VatSaving => format!(
                "VAT at {}% instead of {}%",
                schedule.vat.reduced_percent, schedule.vat.standard_percent
            ),
        },
    })
    .collect()
}
