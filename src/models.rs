//! Data models for the Subsidy Engine.
//!
//! The `models` module defines the serialisable request and response
//! records exchanged with callers: the [`WorkOrder`] describing a
//! household and its planned work, and the [`CalculationResult`]
//! returned by the engine.  Every value here is created fresh per
//! call and never mutated once produced.

use serde::{Deserialize, Serialize};

/// Kind of dwelling the work is carried out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingType {
    House,
    Apartment,
}

/// Regional zone used to select income thresholds and certificate
/// credit rates.  `HighCost` is the Île-de-France zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Standard,
    HighCost,
}

/// Income-based eligibility tier.
///
/// The four household brackets are declared from lowest to highest
/// income so the derived ordering follows the thresholds.
/// `NotEligible` is reserved for orders rejected by the eligibility
/// gate and sorts after every household bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeBracket {
    /// Lowest-income households ("très modestes").
    VeryModest,
    /// Low-income households ("modestes").
    Modest,
    /// Middle-income households ("intermédiaires").
    Intermediate,
    /// Households above every threshold ("supérieurs").
    Higher,
    NotEligible,
}

impl IncomeBracket {
    /// Brackets a household can be resolved into, lowest income first.
    pub const HOUSEHOLD: [IncomeBracket; 4] = [
        IncomeBracket::VeryModest,
        IncomeBracket::Modest,
        IncomeBracket::Intermediate,
        IncomeBracket::Higher,
    ];

    /// Whether the per-gesture primary grant can be paid to this bracket.
    pub fn receives_primary_grant(self) -> bool {
        !matches!(self, IncomeBracket::Higher | IncomeBracket::NotEligible)
    }
}

/// How a work type's quantity is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Priced and subsidised per square metre.
    PerSquareMetre,
    /// Priced and subsidised per installed unit.
    PerUnit,
    /// A single flat amount regardless of quantity.
    Flat,
}

/// A billable work type.  Used directly by the legacy multi-select
/// input and as the canonical key of every rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Attic floor or rafter insulation.
    RoofInsulation,
    FlatRoofInsulation,
    /// External thermal insulation of walls.
    ExteriorWallInsulation,
    InteriorWallInsulation,
    WindowReplacement,
    SkylightReplacement,
    DualFlowVentilation,
    FuelTankRemoval,
    EnergyAudit,
    /// Re-roofing without insulation.  Priced but never subsidised.
    RoofCovering,
}

impl WorkType {
    pub fn basis(self) -> Basis {
        match self {
            WorkType::RoofInsulation
            | WorkType::FlatRoofInsulation
            | WorkType::ExteriorWallInsulation
            | WorkType::InteriorWallInsulation
            | WorkType::RoofCovering => Basis::PerSquareMetre,
            WorkType::WindowReplacement | WorkType::SkylightReplacement => Basis::PerUnit,
            WorkType::DualFlowVentilation | WorkType::FuelTankRemoval | WorkType::EnergyAudit => {
                Basis::Flat
            }
        }
    }

    /// Insulation work earns the per-m² certificate credit.
    pub fn is_insulation(self) -> bool {
        matches!(
            self,
            WorkType::RoofInsulation
                | WorkType::FlatRoofInsulation
                | WorkType::ExteriorWallInsulation
                | WorkType::InteriorWallInsulation
        )
    }

    /// Windows and skylights earn the per-unit certificate credit.
    pub fn is_opening(self) -> bool {
        matches!(self, WorkType::WindowReplacement | WorkType::SkylightReplacement)
    }

    /// Work on the building envelope visible from outside, which in an
    /// apartment needs co-ownership approval.
    pub fn is_exterior(self) -> bool {
        matches!(
            self,
            WorkType::ExteriorWallInsulation | WorkType::FlatRoofInsulation | WorkType::RoofCovering
        )
    }

    /// Short human-readable label used in breakdown descriptions.
    pub fn label(self) -> &'static str {
        match self {
            WorkType::RoofInsulation => "roof insulation",
            WorkType::FlatRoofInsulation => "flat-roof insulation",
            WorkType::ExteriorWallInsulation => "exterior-wall insulation",
            WorkType::InteriorWallInsulation => "interior-wall insulation",
            WorkType::WindowReplacement => "window replacement",
            WorkType::SkylightReplacement => "skylight replacement",
            WorkType::DualFlowVentilation => "dual-flow ventilation",
            WorkType::FuelTankRemoval => "fuel-tank removal",
            WorkType::EnergyAudit => "energy audit",
            WorkType::RoofCovering => "roof covering",
        }
    }
}

/// Project kind of the structured single-project input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// Roof covering replacement, optionally with insulation bundled.
    Roofing,
    RoofInsulation,
    FlatRoofInsulation,
    ExteriorWallInsulation,
    InteriorWallInsulation,
}

/// Structured description of a single roofing/insulation project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkConfiguration {
    pub project: ProjectKind,
    /// Surface area in square metres.
    pub surface_m2: f64,
    /// Material key into the market cost table, e.g. `"slate"`.
    #[serde(default)]
    pub material: Option<String>,
    /// Unit price per m² quoted by the contractor.  When present it
    /// replaces the material's market rate.
    #[serde(default)]
    pub custom_unit_price: Option<f64>,
    #[serde(default)]
    pub skylight_count: Option<u32>,
    /// Insulation is laid as part of a roofing job.
    #[serde(default)]
    pub insulation_included: bool,
    /// Scaffolding is included in the quoted price.  Informational.
    #[serde(default)]
    pub scaffolding_included: bool,
}

impl WorkConfiguration {
    /// Work type the project's surface is priced and subsidised as.
    /// Roofing counts as roof insulation when insulation is bundled.
    pub fn work_type(&self) -> WorkType {
        match self.project {
            ProjectKind::Roofing if self.insulation_included => WorkType::RoofInsulation,
            ProjectKind::Roofing => WorkType::RoofCovering,
            ProjectKind::RoofInsulation => WorkType::RoofInsulation,
            ProjectKind::FlatRoofInsulation => WorkType::FlatRoofInsulation,
            ProjectKind::ExteriorWallInsulation => WorkType::ExteriorWallInsulation,
            ProjectKind::InteriorWallInsulation => WorkType::InteriorWallInsulation,
        }
    }
}

/// Input to the subsidy engine.
///
/// Work is described either by the legacy `work_types` list (with the
/// shared `surface_m2`/`unit_count` quantities) or by a structured
/// `configuration`.  When a configuration is present it takes
/// precedence and the legacy fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub housing_type: HousingType,
    pub region: Region,
    /// Number of people in the household.  Sizes above the largest
    /// tabulated size use that size's thresholds.
    pub household_size: u32,
    /// Reference tax income ("revenu fiscal de référence").
    pub reference_income: f64,
    pub property_age_years: u32,
    pub primary_residence: bool,
    #[serde(default)]
    pub work_types: Vec<WorkType>,
    #[serde(default)]
    pub configuration: Option<WorkConfiguration>,
    /// Surface for every per-m² work type of the legacy list.
    #[serde(default)]
    pub surface_m2: Option<f64>,
    /// Unit count for every per-unit work type of the legacy list.
    #[serde(default)]
    pub unit_count: Option<u32>,
}

impl WorkOrder {
    /// At least one piece of work is described.
    pub fn has_work_selection(&self) -> bool {
        self.configuration.is_some() || !self.work_types.is_empty()
    }
}

/// The three subsidy streams computed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AidStream {
    /// MaPrimeRénov' per-gesture grant.
    PrimaryGrant,
    /// Energy-saving certificate bonus (CEE).
    CertificateCredit,
    /// Saving from the reduced 5.5% VAT rate.
    VatSaving,
}

impl AidStream {
    pub fn name(self) -> &'static str {
        match self {
            AidStream::PrimaryGrant => "MaPrimeRénov'",
            AidStream::CertificateCredit => "Energy savings certificates (CEE)",
            AidStream::VatSaving => "Reduced VAT",
        }
    }
}

/// Final subsidy amounts in whole currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidAmounts {
    pub primary_grant: i64,
    pub certificate_credit: i64,
    pub vat_saving: i64,
    /// Sum of the three streams, clamped to the estimated cost.
    pub total: i64,
    /// `total` as a rounded percentage of the estimated cost.
    pub coverage_percent: i64,
}

impl AidAmounts {
    pub fn get(&self, stream: AidStream) -> i64 {
        match stream {
            AidStream::PrimaryGrant => self.primary_grant,
            AidStream::CertificateCredit => self.certificate_credit,
            AidStream::VatSaving => self.vat_saving,
        }
    }
}

/// One line of the itemised breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidLine {
    pub stream: AidStream,
    pub name: String,
    pub amount: i64,
    pub description: String,
}

/// Stable trigger code of an advisory message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    NotPrimaryResidence,
    PropertyTooRecent,
    NoWorkSelected,
    BracketFraming,
    InteriorWallSunset,
    ZeroInterestLoan,
    HighCoverage,
    EnergyAuditSuggested,
    CoOwnershipApproval,
    AggregateCeilingReached,
}

/// Human-readable guidance attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
}

/// The result of a subsidy estimate for one work order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Edition of the rate schedule the amounts were computed against.
    pub edition: String,
    pub bracket: IncomeBracket,
    pub eligible: bool,
    pub amounts: AidAmounts,
    pub estimated_cost: i64,
    /// What the household still pays: `max(0, cost - total aid)`.
    pub remaining_cost: i64,
    /// Non-zero aid lines only.
    pub breakdown: Vec<AidLine>,
    /// Number of subsidised gestures in the priced work.
    pub gesture_count: usize,
    /// The combined grant and credit were scaled down by the
    /// statutory percentage cap.
    pub capped: bool,
    /// Eligible for the zero-interest retrofit loan (éco-PTZ).
    pub zero_interest_loan: bool,
    pub reduced_vat: bool,
    pub advisories: Vec<Advisory>,
}

impl CalculationResult {
    pub fn has_advisory(&self, kind: AdvisoryKind) -> bool {
        self.advisories.iter().any(|advisory| advisory.kind == kind)
    }
}
