//! Rate-table repository.
//!
//! The `rates` module holds the official rate schedule the engine
//! computes against.  A [`RateSchedule`] mirrors one dated edition of
//! the government rate document: income thresholds, per-gesture grant
//! rates, certificate credit rates, market unit costs and the statutory
//! percentages.  Schedules are stored as versioned JSON documents; the
//! current edition is compiled into the crate and further editions may
//! be loaded from a directory.  A schedule is never patched in place:
//! adopting a new edition means registering a complete new table set.

use crate::models::{IncomeBracket, Region, WorkType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Edition compiled into the crate.
pub const BUNDLED_EDITION: &str = "2025-02";

const BUNDLED_EDITION_JSON: &str = include_str!("../rate_schedules/2025-02.json");

/// Largest household size the threshold tables cover.
pub const MAX_HOUSEHOLD_SIZE: u32 = 5;

#[derive(Debug, Error)]
pub enum RateScheduleError {
    #[error("failed to parse rate schedule: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read rate schedule {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("rate schedule {edition} is invalid: {reason}")]
    Invalid { edition: String, reason: String },
    #[error("unknown rate schedule edition {0}")]
    UnknownEdition(String),
}

/// Income ceilings for one household size.  A household whose income
/// is at or below a ceiling falls into that bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeThresholds {
    pub household_size: u32,
    pub very_modest: f64,
    pub modest: f64,
    pub intermediate: f64,
}

/// Per-gesture grant rates for one work type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantRateTable {
    /// Rate per m², per unit or flat depending on the work type's basis.
    /// Brackets absent from the map receive nothing.
    pub rates: BTreeMap<IncomeBracket, f64>,
    /// Only this much surface is subsidised.
    #[serde(default)]
    pub surface_cap_m2: Option<f64>,
    /// Date (ISO 8601) after which the gesture leaves the per-gesture
    /// scheme.  Advisory only: the engine keeps applying the rate.
    #[serde(default)]
    pub sunset: Option<String>,
}

/// Certificate credit rate pair for one region.  Does not vary by bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateRates {
    pub insulation_per_m2: f64,
    pub opening_per_unit: f64,
}

/// Typical market prices used when no contractor quote is supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCosts {
    /// Unit cost per work type, in that work type's basis.
    pub work_types: BTreeMap<WorkType, f64>,
    /// Per-m² cost of a material for structured projects.
    pub materials: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VatRates {
    pub standard_percent: f64,
    pub reduced_percent: f64,
}

/// One complete edition of the rate schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSchedule {
    /// Edition identifier, e.g. `"2025-02"`.
    pub edition: String,
    /// Title of the official document this edition mirrors.
    pub source: String,
    pub income_thresholds: BTreeMap<Region, Vec<IncomeThresholds>>,
    pub grant_rates: BTreeMap<WorkType, GrantRateTable>,
    pub certificate_rates: BTreeMap<Region, CertificateRates>,
    pub market_costs: MarketCosts,
    pub vat: VatRates,
    /// Ceiling on grant + certificate credit as a percentage of cost.
    pub combined_cap_percent: BTreeMap<IncomeBracket, f64>,
    /// Five-year ceiling on the total primary grant per household.
    pub aggregate_ceiling: BTreeMap<IncomeBracket, f64>,
}

impl RateSchedule {
    /// The edition compiled into the crate.
    pub fn bundled() -> Result<Self, RateScheduleError> {
        Self::from_json(BUNDLED_EDITION_JSON)
    }

    /// Parse and validate a schedule document.
    pub fn from_json(data: &str) -> Result<Self, RateScheduleError> {
        let schedule: RateSchedule = serde_json::from_str(data)?;
        schedule.validate()?;
        Ok(schedule)
    }

    fn validate(&self) -> Result<(), RateScheduleError> {
        let invalid = |reason: String| RateScheduleError::Invalid {
            edition: self.edition.clone(),
            reason,
        };

        for region in [Region::Standard, Region::HighCost] {
            let rows = self
                .income_thresholds
                .get(&region)
                .ok_or_else(|| invalid(format!("missing income thresholds for {region:?}")))?;
            for size in 1..=MAX_HOUSEHOLD_SIZE {
                let row = rows
                    .iter()
                    .find(|row| row.household_size == size)
                    .ok_or_else(|| {
                        invalid(format!("{region:?} has no thresholds for household size {size}"))
                    })?;
                if !(row.very_modest < row.modest && row.modest < row.intermediate) {
                    return Err(invalid(format!(
                        "{region:?} thresholds for household size {size} are not ascending"
                    )));
                }
            }
        }

        if self.vat.reduced_percent > self.vat.standard_percent {
            return Err(invalid("reduced VAT rate exceeds the standard rate".into()));
        }

        for bracket in IncomeBracket::HOUSEHOLD {
            if !self.combined_cap_percent.contains_key(&bracket) {
                return Err(invalid(format!("missing combined cap for {bracket:?}")));
            }
            if !self.aggregate_ceiling.contains_key(&bracket) {
                return Err(invalid(format!("missing aggregate ceiling for {bracket:?}")));
            }
        }

        for region in [Region::Standard, Region::HighCost] {
            if !self.certificate_rates.contains_key(&region) {
                return Err(invalid(format!("missing certificate rates for {region:?}")));
            }
        }

        if let Some((bracket, percent)) = self
            .combined_cap_percent
            .iter()
            .find(|(_, percent)| !(0.0..=100.0).contains(*percent))
        {
            return Err(invalid(format!(
                "combined cap for {bracket:?} is {percent}%, outside 0..=100"
            )));
        }

        Ok(())
    }

    /// Threshold row for a region and household size.  Sizes above the
    /// tabulated maximum collapse to it; a size of 0 is read as 1.
    pub fn thresholds(&self, region: Region, household_size: u32) -> Option<&IncomeThresholds> {
        let size = household_size.clamp(1, MAX_HOUSEHOLD_SIZE);
        self.income_thresholds
            .get(&region)?
            .iter()
            .find(|row| row.household_size == size)
    }

    pub fn grant_rate(&self, work: WorkType, bracket: IncomeBracket) -> f64 {
        self.grant_rates
            .get(&work)
            .and_then(|table| table.rates.get(&bracket))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn grant_surface_cap(&self, work: WorkType) -> Option<f64> {
        self.grant_rates.get(&work).and_then(|table| table.surface_cap_m2)
    }

    pub fn sunset(&self, work: WorkType) -> Option<&str> {
        self.grant_rates
            .get(&work)
            .and_then(|table| table.sunset.as_deref())
    }

    pub fn certificate_rates(&self, region: Region) -> CertificateRates {
        self.certificate_rates
            .get(&region)
            .copied()
            .unwrap_or_default()
    }

    pub fn market_cost(&self, work: WorkType) -> f64 {
        self.market_costs
            .work_types
            .get(&work)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn material_cost(&self, material: &str) -> Option<f64> {
        self.market_costs.materials.get(material).copied()
    }

    /// VAT points saved by the reduced rate.
    pub fn vat_differential_percent(&self) -> f64 {
        self.vat.standard_percent - self.vat.reduced_percent
    }

    pub fn combined_cap_percent(&self, bracket: IncomeBracket) -> f64 {
        self.combined_cap_percent
            .get(&bracket)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn aggregate_ceiling(&self, bracket: IncomeBracket) -> f64 {
        self.aggregate_ceiling.get(&bracket).copied().unwrap_or(0.0)
    }
}

/// Load all rate schedule editions from a directory.
///
/// Every `.json` file is parsed as a [`RateSchedule`].  Files that fail
/// to parse or validate are logged and skipped so that one bad edition
/// does not prevent the others from loading.  A missing directory
/// yields no schedules.
pub fn load_rate_schedules_from_dir(path: &Path) -> Result<Vec<RateSchedule>, RateScheduleError> {
    let io_err = |source| RateScheduleError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut schedules = Vec::new();
    if !path.is_dir() {
        return Ok(schedules);
    }
    for entry in std::fs::read_dir(path).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let file = entry.path();
        if !entry.file_type().map_err(io_err)?.is_file()
            || file.extension().map_or(true, |ext| ext != "json")
        {
            continue;
        }
        let data = std::fs::read_to_string(&file).map_err(|source| RateScheduleError::Io {
            path: file.clone(),
            source,
        })?;
        match RateSchedule::from_json(&data) {
            Ok(schedule) => {
                info!(edition = %schedule.edition, path = ?file, "loaded rate schedule");
                schedules.push(schedule);
            }
            Err(err) => warn!(path = ?file, error = %err, "skipping rate schedule"),
        }
    }
    Ok(schedules)
}

/// Immutable set of schedule editions available to the engine.
#[derive(Debug, Clone)]
pub struct ScheduleRegistry {
    schedules: BTreeMap<String, Arc<RateSchedule>>,
    default_edition: String,
}

impl ScheduleRegistry {
    /// Registry holding only the bundled edition, which is the default.
    pub fn with_bundled() -> Result<Self, RateScheduleError> {
        let schedule = RateSchedule::bundled()?;
        let default_edition = schedule.edition.clone();
        let mut schedules = BTreeMap::new();
        schedules.insert(default_edition.clone(), Arc::new(schedule));
        Ok(Self {
            schedules,
            default_edition,
        })
    }

    /// Add an edition.  An edition already present is replaced as a
    /// whole.
    pub fn register(&mut self, schedule: RateSchedule) {
        self.schedules
            .insert(schedule.edition.clone(), Arc::new(schedule));
    }

    pub fn set_default(&mut self, edition: &str) -> Result<(), RateScheduleError> {
        if !self.schedules.contains_key(edition) {
            return Err(RateScheduleError::UnknownEdition(edition.to_string()));
        }
        self.default_edition = edition.to_string();
        Ok(())
    }

    /// Look up an edition, or the default one when `edition` is `None`.
    pub fn get(&self, edition: Option<&str>) -> Result<Arc<RateSchedule>, RateScheduleError> {
        let edition = edition.unwrap_or(&self.default_edition);
        self.schedules
            .get(edition)
            .cloned()
            .ok_or_else(|| RateScheduleError::UnknownEdition(edition.to_string()))
    }

    pub fn default_edition(&self) -> &str {
        &self.default_edition
    }

    pub fn editions(&self) -> Vec<String> {
        self.schedules.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_schedule_loads_and_validates() {
        let schedule = RateSchedule::bundled().expect("bundled schedule is valid");
        assert_eq!(schedule.edition, BUNDLED_EDITION);
        let row = schedule
            .thresholds(Region::Standard, 1)
            .expect("size 1 thresholds");
        assert_eq!(row.very_modest, 17173.0);
        assert_eq!(
            schedule.grant_rate(WorkType::RoofInsulation, IncomeBracket::VeryModest),
            25.0
        );
        assert_eq!(
            schedule.grant_surface_cap(WorkType::ExteriorWallInsulation),
            Some(100.0)
        );
        assert_eq!(schedule.vat_differential_percent(), 14.5);
    }

    #[test]
    fn household_size_collapses_to_largest_tabulated() {
        let schedule = RateSchedule::bundled().expect("bundled schedule is valid");
        let five = schedule.thresholds(Region::HighCost, 5).expect("size 5");
        let nine = schedule.thresholds(Region::HighCost, 9).expect("size 9");
        assert_eq!(five, nine);
    }

    #[test]
    fn missing_rates_read_as_zero() {
        let schedule = RateSchedule::bundled().expect("bundled schedule is valid");
        assert_eq!(
            schedule.grant_rate(WorkType::RoofInsulation, IncomeBracket::Higher),
            0.0
        );
        assert_eq!(
            schedule.grant_rate(WorkType::RoofCovering, IncomeBracket::VeryModest),
            0.0
        );
        assert_eq!(schedule.combined_cap_percent(IncomeBracket::NotEligible), 0.0);
    }

    #[test]
    fn rejects_descending_thresholds() {
        let mut value = bundled_json();
        value["income_thresholds"]["standard"][0]["modest"] = serde_json::json!(1000);
        assert_invalid(value, "not ascending");
    }

    fn bundled_json() -> serde_json::Value {
        serde_json::from_str(BUNDLED_EDITION_JSON).expect("bundled json")
    }

    fn assert_invalid(value: serde_json::Value, expected: &str) {
        let err = RateSchedule::from_json(&value.to_string()).expect_err("must be rejected");
        match err {
            RateScheduleError::Invalid { reason, .. } => {
                assert!(reason.contains(expected), "unexpected reason: {reason}")
            }
            other => panic!("expected an invalid schedule, got {other}"),
        }
    }

    #[test]
    fn rejects_reduced_vat_above_standard() {
        let mut value = bundled_json();
        value["vat"]["reduced_percent"] = serde_json::json!(25.0);
        assert_invalid(value, "reduced VAT");
    }

    #[test]
    fn rejects_cap_percentage_out_of_range() {
        let mut value = bundled_json();
        value["combined_cap_percent"]["modest"] = serde_json::json!(120);
        assert_invalid(value, "outside 0..=100");
    }

    #[test]
    fn rejects_missing_household_size() {
        let mut value = bundled_json();
        value["income_thresholds"]["high_cost"]
            .as_array_mut()
            .expect("threshold rows")
            .retain(|row| row["household_size"] != 4);
        assert_invalid(value, "household size 4");
    }

    #[test]
    fn rejects_missing_aggregate_ceiling() {
        let mut value = bundled_json();
        value["aggregate_ceiling"]
            .as_object_mut()
            .expect("ceiling map")
            .remove("modest");
        assert_invalid(value, "aggregate ceiling");
    }

    #[test]
    fn rejects_missing_certificate_region() {
        let mut value = bundled_json();
        value["certificate_rates"]
            .as_object_mut()
            .expect("certificate map")
            .remove("high_cost");
        assert_invalid(value, "certificate rates");
    }

    #[test]
    fn malformed_files_are_skipped_and_valid_siblings_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut next = bundled_json();
        next["edition"] = serde_json::json!("2026-01");
        std::fs::write(dir.path().join("2026-01.json"), next.to_string()).expect("write edition");
        std::fs::write(dir.path().join("broken.json"), "{ not json").expect("write broken");
        let mut invalid = bundled_json();
        invalid["edition"] = serde_json::json!("2026-07");
        invalid["vat"]["reduced_percent"] = serde_json::json!(30.0);
        std::fs::write(dir.path().join("2026-07.json"), invalid.to_string())
            .expect("write invalid");
        std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write notes");

        let schedules = load_rate_schedules_from_dir(dir.path()).expect("directory readable");
        let editions: Vec<_> = schedules.iter().map(|s| s.edition.as_str()).collect();
        assert_eq!(editions, vec!["2026-01"]);
    }

    #[test]
    fn registry_replaces_editions_whole_and_rejects_unknown() {
        let mut registry = ScheduleRegistry::with_bundled().expect("bundled registry");
        let mut next = RateSchedule::bundled().expect("bundled");
        next.edition = "2026-01".into();
        next.grant_rates.remove(&WorkType::InteriorWallInsulation);
        registry.register(next);
        registry.set_default("2026-01").expect("registered edition");

        let current = registry.get(None).expect("default edition");
        assert_eq!(current.edition, "2026-01");
        assert_eq!(
            current.grant_rate(WorkType::InteriorWallInsulation, IncomeBracket::Modest),
            0.0
        );
        let previous = registry.get(Some(BUNDLED_EDITION)).expect("bundled edition");
        assert_eq!(
            previous.grant_rate(WorkType::InteriorWallInsulation, IncomeBracket::Modest),
            20.0
        );
        assert!(matches!(
            registry.get(Some("1999-01")),
            Err(RateScheduleError::UnknownEdition(_))
        ));
    }

    #[test]
    fn missing_directory_loads_nothing() {
        let schedules = load_rate_schedules_from_dir(Path::new("does/not/exist"))
            .expect("missing directory is not an error");
        assert!(schedules.is_empty());
    }
}
