//! Work normalisation and cost estimation.
//!
//! A work order describes its work either as a legacy list of work
//! types or as one structured project.  [`priced_items`] turns either
//! shape into a single list of [`PricedItem`]s; the cost estimator and
//! every subsidy calculator consume that list, so the work that is
//! priced and the work that is subsidised are always the same.

use crate::models::{Basis, WorkOrder, WorkType};
use crate::rates::RateSchedule;
use tracing::warn;

/// A normalised piece of billable work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PricedItem {
    /// Work measured in square metres.
    Surface {
        work: WorkType,
        area_m2: f64,
        unit_cost: f64,
    },
    /// Work measured in installed units.
    Units {
        work: WorkType,
        count: u32,
        unit_cost: f64,
    },
    /// Work charged once at a flat price.
    Flat { work: WorkType, price: f64 },
}

impl PricedItem {
    pub fn work(&self) -> WorkType {
        match *self {
            PricedItem::Surface { work, .. }
            | PricedItem::Units { work, .. }
            | PricedItem::Flat { work, .. } => work,
        }
    }

    /// Unrounded cost of this item.
    pub fn cost(&self) -> f64 {
        match *self {
            PricedItem::Surface {
                area_m2, unit_cost, ..
            } => area_m2 * unit_cost,
            PricedItem::Units {
                count, unit_cost, ..
            } => f64::from(count) * unit_cost,
            PricedItem::Flat { price, .. } => price,
        }
    }

    fn for_work_type(work: WorkType, area_m2: f64, count: u32, unit_cost: f64) -> Self {
        match work.basis() {
            Basis::PerSquareMetre => PricedItem::Surface {
                work,
                area_m2,
                unit_cost,
            },
            Basis::PerUnit => PricedItem::Units {
                work,
                count,
                unit_cost,
            },
            Basis::Flat => PricedItem::Flat {
                work,
                price: unit_cost,
            },
        }
    }
}

/// Normalise the work described by an order.
///
/// A structured configuration takes precedence over the legacy list.
/// Its surface is priced at the custom unit price, else the material's
/// market rate, else the market rate of its work type.  Duplicate
/// entries in the legacy list are priced once.
pub fn priced_items(order: &WorkOrder, schedule: &RateSchedule) -> Vec<PricedItem> {
    match &order.configuration {
        Some(config) => {
            let work = config.work_type();
            let unit_cost = config.custom_unit_price.unwrap_or_else(|| {
                match config.material.as_deref() {
                    Some(material) => schedule.material_cost(material).unwrap_or_else(|| {
                        warn!(material, edition = %schedule.edition, "material has no market rate");
                        0.0
                    }),
                    None => schedule.market_cost(work),
                }
            });
            let mut items = vec![PricedItem::Surface {
                work,
                area_m2: config.surface_m2,
                unit_cost,
            }];
            if let Some(count) = config.skylight_count.filter(|count| *count > 0) {
                items.push(PricedItem::Units {
                    work: WorkType::SkylightReplacement,
                    count,
                    unit_cost: schedule.market_cost(WorkType::SkylightReplacement),
                });
            }
            items
        }
        None => {
            let area_m2 = order.surface_m2.unwrap_or(0.0);
            let count = order.unit_count.unwrap_or(0);
            let mut seen = Vec::with_capacity(order.work_types.len());
            order
                .work_types
                .iter()
                .copied()
                .filter(|work| {
                    if seen.contains(work) {
                        false
                    } else {
                        seen.push(*work);
                        true
                    }
                })
                .map(|work| {
                    PricedItem::for_work_type(work, area_m2, count, schedule.market_cost(work))
                })
                .collect()
        }
    }
}

/// Estimated total cost of the priced work, rounded to the nearest
/// whole currency unit.
pub fn estimate_cost(items: &[PricedItem]) -> i64 {
    items.iter().map(PricedItem::cost).sum::<f64>().round() as i64
}
