use super::error::{EngineError, Result};
use super::types::{
    BalancePoint, BreakEvenDiscount, DAYS_PER_INSTALLMENT, FALLBACK_TAX_RATE, GainPoint,
    InstallmentComparison, MAX_INSTALLMENTS, TAX_BRACKETS, TaxBracket,
};

/// Tax rate of the first bracket (ascending) whose threshold covers `days`.
pub fn tax_rate_for_holding_period(days: u32) -> f64 {
    TAX_BRACKETS
        .iter()
        .find(|bracket| bracket.covers(days))
        .map_or(FALLBACK_TAX_RATE, |bracket| bracket.rate)
}

pub fn tax_bracket_for_holding_period(days: u32) -> &'static TaxBracket {
    TAX_BRACKETS
        .iter()
        .find(|bracket| bracket.covers(days))
        .unwrap_or(&TAX_BRACKETS[TAX_BRACKETS.len() - 1])
}

pub fn holding_period_days(installments: u32) -> u32 {
    installments.saturating_mul(DAYS_PER_INSTALLMENT)
}

pub fn monthly_rate_from_annual(annual_rate: f64) -> Result<f64> {
    ensure_rate("annual rate", annual_rate)?;
    Ok((1.0 + annual_rate).powf(1.0 / 12.0) - 1.0)
}

pub fn installment_amount(total: f64, installments: u32) -> Result<f64> {
    ensure_total(total)?;
    ensure_installments(installments)?;
    Ok(total / installments as f64)
}

/// Invests `total`, then for each month grows the balance by `monthly_rate`
/// and pays one installment out of it. Returns what is left once every
/// installment is paid, after tax on any return above `total`.
///
/// The value is the absolute residual balance, not `residual - total`.
pub fn net_gain_from_installments(total: f64, installments: u32, monthly_rate: f64) -> Result<f64> {
    validate_common(total, installments, monthly_rate)?;
    let gross = simulate_balance(total, installments, monthly_rate, |_, _| {});
    ensure_finite_output("gross balance", gross)?;
    let net_gain = apply_tax(total, installments, gross);
    ensure_finite_output("net gain", net_gain)?;
    Ok(net_gain)
}

pub fn break_even_discount(
    total: f64,
    installments: u32,
    monthly_rate: f64,
) -> Result<BreakEvenDiscount> {
    let net_gain = net_gain_from_installments(total, installments, monthly_rate)?;
    let equivalent_upfront_amount = total - net_gain;
    let discount_percent = 100.0 * (1.0 - equivalent_upfront_amount / total);
    ensure_finite_output("equivalent upfront amount", equivalent_upfront_amount)?;
    ensure_finite_output("discount percent", discount_percent)?;
    let savings = total - equivalent_upfront_amount;
    ensure_finite_output("savings", savings)?;
    Ok(BreakEvenDiscount {
        discount_percent,
        equivalent_upfront_amount,
        savings,
    })
}

/// Month-by-month invested balance before tax. Month 0 is the initial
/// deposit; the last point is the gross residual.
pub fn balance_schedule(
    total: f64,
    installments: u32,
    monthly_rate: f64,
) -> Result<Vec<BalancePoint>> {
    validate_common(total, installments, monthly_rate)?;
    let mut points = vec![BalancePoint {
        month: 0,
        balance: total,
    }];
    let gross = simulate_balance(total, installments, monthly_rate, |month, balance| {
        points.push(BalancePoint { month, balance });
    });
    ensure_finite_output("gross balance", gross)?;
    Ok(points)
}

pub fn gain_curve(total: f64, monthly_rate: f64, max_installments: u32) -> Result<Vec<GainPoint>> {
    ensure_max_installments(max_installments)?;
    (1..=max_installments)
        .map(|installments| {
            net_gain_from_installments(total, installments, monthly_rate).map(|net_gain| {
                GainPoint {
                    installments,
                    net_gain,
                }
            })
        })
        .collect()
}

pub fn compare(total: f64, installments: u32, monthly_rate: f64) -> Result<InstallmentComparison> {
    let net_gain = net_gain_from_installments(total, installments, monthly_rate)?;
    let days = holding_period_days(installments);
    let bracket = tax_bracket_for_holding_period(days);
    Ok(InstallmentComparison {
        total,
        installments,
        monthly_rate,
        installment_amount: total / installments as f64,
        holding_period_days: days,
        tax_rate: tax_rate_for_holding_period(days),
        tax_bracket: bracket.label,
        net_gain,
        installments_advantageous: net_gain > 0.0,
    })
}

fn simulate_balance(
    total: f64,
    installments: u32,
    monthly_rate: f64,
    mut on_month: impl FnMut(u32, f64),
) -> f64 {
    let payment = total / installments as f64;
    let mut balance = total;
    for month in 1..=installments {
        balance *= 1.0 + monthly_rate;
        balance -= payment;
        on_month(month, balance);
    }
    balance
}

fn apply_tax(total: f64, installments: u32, gross: f64) -> f64 {
    let raw_return = gross - total;
    if raw_return > 0.0 {
        let rate = tax_rate_for_holding_period(holding_period_days(installments));
        gross - raw_return * rate
    } else {
        gross
    }
}

/// An infinite balance stays infinite through every later month, so checking
/// the final value covers the whole schedule.
fn ensure_finite_output(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(EngineError::Overflow { field });
    }
    Ok(())
}

pub(super) fn validate_common(total: f64, installments: u32, monthly_rate: f64) -> Result<()> {
    ensure_total(total)?;
    ensure_installments(installments)?;
    ensure_rate("monthly rate", monthly_rate)
}

pub(super) fn ensure_total(total: f64) -> Result<()> {
    if !total.is_finite() {
        return Err(EngineError::NonFinite {
            field: "total",
            value: total,
        });
    }
    if total <= 0.0 {
        return Err(EngineError::NonPositiveTotal(total));
    }
    Ok(())
}

fn ensure_installments(installments: u32) -> Result<()> {
    if installments == 0 {
        return Err(EngineError::ZeroInstallments);
    }
    if installments > MAX_INSTALLMENTS {
        return Err(EngineError::TooManyInstallments {
            count: installments,
            max: MAX_INSTALLMENTS,
        });
    }
    Ok(())
}

pub(super) fn ensure_max_installments(max_installments: u32) -> Result<()> {
    if max_installments == 0 {
        return Err(EngineError::ZeroMaxInstallments);
    }
    ensure_installments(max_installments)
}

pub(super) fn ensure_rate(field: &'static str, rate: f64) -> Result<()> {
    if !rate.is_finite() {
        return Err(EngineError::NonFinite { field, value: rate });
    }
    if rate <= -1.0 {
        return Err(EngineError::InvalidRate(rate));
    }
    Ok(())
}
