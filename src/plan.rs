//! Plan categories, the purchasable plan catalog, and the access-gate policy.

use serde::{Deserialize, Serialize};

/// A purchase tier. `None` means the account has never bought a plan.
///
/// Tiers differ only in how many job credits they grant; every paid tier
/// unlocks the same gated features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanCategory {
    /// No active plan.
    #[default]
    None,
    /// Silver tier.
    Silver,
    /// Gold tier.
    Gold,
    /// Platinum tier.
    Platinum,
}

impl PlanCategory {
    /// Wire representation, matching the stored document values.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Silver => "SILVER",
            Self::Gold => "GOLD",
            Self::Platinum => "PLATINUM",
        }
    }

    /// Access-gate policy: any paid tier grants feature access.
    #[must_use]
    pub fn grants_access(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::str::FromStr for PlanCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "SILVER" => Ok(Self::Silver),
            "GOLD" => Ok(Self::Gold),
            "PLATINUM" => Ok(Self::Platinum),
            _ => Err(format!("unknown plan category: {s}")),
        }
    }
}

impl std::fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchasable plan as advertised by the portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier used on the wire (e.g. "gold").
    pub id: String,
    /// Tier this plan activates.
    pub category: PlanCategory,
    /// One-time price in whole rupees.
    pub price_rupees: u64,
    /// Job-application credits granted on purchase.
    pub credits: u32,
}

/// The catalog of plans the portal sells.
///
/// Purchase requests are validated against this catalog so a client cannot
/// pair an arbitrary amount with an arbitrary credit count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCatalog {
    /// Available plans.
    pub plans: Vec<Plan>,
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self {
            plans: vec![
                Plan {
                    id: "silver".to_string(),
                    category: PlanCategory::Silver,
                    price_rupees: 199,
                    credits: 10,
                },
                Plan {
                    id: "gold".to_string(),
                    category: PlanCategory::Gold,
                    price_rupees: 299,
                    credits: 25,
                },
                Plan {
                    id: "platinum".to_string(),
                    category: PlanCategory::Platinum,
                    price_rupees: 399,
                    credits: 50,
                },
            ],
        }
    }
}

impl PlanCatalog {
    /// Look up a plan by its wire identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }
}

/// Job-application gate: paid accounts always may apply; free accounts are
/// limited to `free_job_limit` applications. Credit balance is not consulted.
#[must_use]
pub fn can_apply(category: PlanCategory, jobs_applied: u32, free_job_limit: u32) -> bool {
    category.grants_access() || jobs_applied < free_job_limit
}
