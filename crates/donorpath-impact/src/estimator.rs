//! Donation amount → impact estimate.

use donorpath_core::error::DomainError;
use serde::Serialize;

/// Average monthly secondary-school fees, in dollars.
pub const MONTHLY_SCHOOL_FEES: f64 = 35.0;

/// One full year of fees; the amount that supports one student.
pub const YEARLY_SCHOOL_FEES: f64 = MONTHLY_SCHOOL_FEES * 12.0;

/// Amounts offered as one-tap presets.
pub const PRESET_AMOUNTS: [u32; 5] = [50, 100, 200, 400, 800];

/// Support tier an amount falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactTier {
    /// Below $100.
    Baseline,
    /// $100 to $199.
    Direct,
    /// $200 to $399.
    Medium,
    /// $400 and above.
    HighSupport,
}

impl ImpactTier {
    /// Tier for a (validated) amount.
    #[must_use]
    pub fn for_amount(amount: f64) -> Self {
        if amount >= 400.0 {
            Self::HighSupport
        } else if amount >= 200.0 {
            Self::Medium
        } else if amount >= 100.0 {
            Self::Direct
        } else {
            Self::Baseline
        }
    }

    /// Where this tier's support goes.
    #[must_use]
    pub fn location(self) -> &'static str {
        match self {
            Self::HighSupport => "Turkana County",
            Self::Medium => "Kisumu region",
            Self::Direct => "Nairobi slums",
            Self::Baseline => "various communities",
        }
    }

    /// What this tier's support pays for.
    #[must_use]
    pub fn narrative(self) -> &'static str {
        match self {
            Self::HighSupport => {
                "Fund a complete year of secondary education for a student, including tuition, uniforms, books, and boarding fees."
            }
            Self::Medium => {
                "Cover 6 months of education expenses, including school supplies and mentorship support."
            }
            Self::Direct => {
                "Provide 3 months of educational support, including textbooks and school meals."
            }
            Self::Baseline => {
                "Contribute to essential school supplies and educational materials for multiple students."
            }
        }
    }
}

/// What a donation funds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEstimate {
    /// Trimmed donor name.
    pub donor_name: String,
    /// Donation in dollars; always positive.
    pub amount: f64,
    /// Students supported for a year; at least 1.
    pub students: u32,
    /// Months of schooling funded; at least 1.
    pub months: u32,
    /// Region the support is directed to.
    pub location: String,
    /// Description of what the support pays for.
    pub narrative: String,
    /// Tier the amount falls into.
    pub tier: ImpactTier,
}

/// Estimates the impact of donating `amount` dollars.
///
/// # Errors
///
/// Returns `DomainError::InvalidAmount` if `amount` is not a positive finite
/// number, and `DomainError::Validation` if `donor_name` is blank.
pub fn estimate(donor_name: &str, amount: f64) -> Result<ImpactEstimate, DomainError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DomainError::InvalidAmount(amount));
    }
    let donor_name = donor_name.trim();
    if donor_name.is_empty() {
        return Err(DomainError::Validation("donor name is required".to_owned()));
    }

    let tier = ImpactTier::for_amount(amount);
    Ok(ImpactEstimate {
        donor_name: donor_name.to_owned(),
        amount,
        students: at_least_one(amount / YEARLY_SCHOOL_FEES),
        months: at_least_one(amount / MONTHLY_SCHOOL_FEES),
        location: tier.location().to_owned(),
        narrative: tier.narrative().to_owned(),
        tier,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn at_least_one(ratio: f64) -> u32 {
    let whole = ratio.floor().min(f64::from(u32::MAX));
    (whole as u32).max(1)
}
