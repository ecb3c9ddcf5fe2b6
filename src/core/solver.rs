use super::engine::{ensure_max_installments, ensure_rate, ensure_total, net_gain_from_installments};
use super::error::{EngineError, Result};
use super::types::InstallmentsToBeat;

/// Smallest installment count in `1..=max_installments` whose net gain covers
/// the upfront discount.
///
/// Net gain is not monotonic in the installment count once tax brackets shift,
/// so this scans every count in order and stops at the first match.
pub fn installments_to_beat_discount(
    total: f64,
    discount_percent: f64,
    monthly_rate: f64,
    max_installments: u32,
) -> Result<InstallmentsToBeat> {
    validate_inputs(total, discount_percent, monthly_rate, max_installments)?;

    let upfront_price = total * (1.0 - discount_percent / 100.0);
    let discount_value = total - upfront_price;

    for installments in 1..=max_installments {
        let net_gain = net_gain_from_installments(total, installments, monthly_rate)?;
        if net_gain >= discount_value {
            return Ok(InstallmentsToBeat::Viable {
                installments,
                net_gain,
            });
        }
    }
    Ok(InstallmentsToBeat::NotViable)
}

fn validate_inputs(
    total: f64,
    discount_percent: f64,
    monthly_rate: f64,
    max_installments: u32,
) -> Result<()> {
    ensure_total(total)?;
    ensure_rate("monthly rate", monthly_rate)?;
    if !discount_percent.is_finite() {
        return Err(EngineError::NonFinite {
            field: "discount",
            value: discount_percent,
        });
    }
    if !(0.0..=100.0).contains(&discount_percent) {
        return Err(EngineError::InvalidDiscount(discount_percent));
    }
    ensure_max_installments(max_installments)
}
