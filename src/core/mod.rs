mod engine;
mod error;
mod solver;
mod types;

pub use engine::{
    balance_schedule, break_even_discount, compare, gain_curve, holding_period_days,
    installment_amount, monthly_rate_from_annual, net_gain_from_installments,
    tax_bracket_for_holding_period, tax_rate_for_holding_period,
};
pub use error::{EngineError, Result};
pub use solver::installments_to_beat_discount;
pub use types::{
    BalancePoint, BreakEvenDiscount, DAYS_PER_INSTALLMENT, DEFAULT_MAX_INSTALLMENTS,
    FALLBACK_TAX_RATE, GainPoint, InstallmentComparison, InstallmentsToBeat, MAX_INSTALLMENTS,
    TAX_BRACKETS, TaxBracket,
};
