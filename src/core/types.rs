use serde::Serialize;

/// Approximate number of days the principal stays invested per installment.
pub const DAYS_PER_INSTALLMENT: u32 = 30;

pub const DEFAULT_MAX_INSTALLMENTS: u32 = 60;

/// Longest installment plan the engine simulates (100 years of months).
pub const MAX_INSTALLMENTS: u32 = 1_200;

/// Rate used if a holding period falls past every bracket. The unbounded
/// last bracket makes this unreachable.
pub const FALLBACK_TAX_RATE: f64 = 0.15;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    /// Inclusive upper bound in days; `None` is the open-ended bucket.
    pub max_days: Option<u32>,
    pub rate: f64,
    pub label: &'static str,
}

impl TaxBracket {
    pub fn covers(&self, days: u32) -> bool {
        self.max_days.is_none_or(|max| days <= max)
    }
}

/// Income tax on investment returns by holding period, ascending by threshold.
pub const TAX_BRACKETS: &[TaxBracket] = &[
    TaxBracket {
        max_days: Some(180),
        rate: 0.225,
        label: "up to 180 days (22.5%)",
    },
    TaxBracket {
        max_days: Some(360),
        rate: 0.20,
        label: "181 to 360 days (20%)",
    },
    TaxBracket {
        max_days: Some(720),
        rate: 0.175,
        label: "361 to 720 days (17.5%)",
    },
    TaxBracket {
        max_days: None,
        rate: 0.15,
        label: "over 720 days (15%)",
    },
];

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenDiscount {
    pub discount_percent: f64,
    pub equivalent_upfront_amount: f64,
    pub savings: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InstallmentsToBeat {
    Viable { installments: u32, net_gain: f64 },
    NotViable,
}

impl InstallmentsToBeat {
    pub fn installments(self) -> Option<u32> {
        match self {
            InstallmentsToBeat::Viable { installments, .. } => Some(installments),
            InstallmentsToBeat::NotViable => None,
        }
    }

    pub fn net_gain(self) -> Option<f64> {
        match self {
            InstallmentsToBeat::Viable { net_gain, .. } => Some(net_gain),
            InstallmentsToBeat::NotViable => None,
        }
    }

    pub fn is_viable(self) -> bool {
        matches!(self, InstallmentsToBeat::Viable { .. })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub month: u32,
    pub balance: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GainPoint {
    pub installments: u32,
    pub net_gain: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentComparison {
    pub total: f64,
    pub installments: u32,
    pub monthly_rate: f64,
    pub installment_amount: f64,
    pub holding_period_days: u32,
    pub tax_rate: f64,
    pub tax_bracket: &'static str,
    pub net_gain: f64,
    pub installments_advantageous: bool,
}
