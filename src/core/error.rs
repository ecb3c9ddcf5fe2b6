use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("installment count must be > 0")]
    ZeroInstallments,

    #[error("installment count must be <= {max}, got {count}")]
    TooManyInstallments { count: u32, max: u32 },

    #[error("max installments must be > 0")]
    ZeroMaxInstallments,

    #[error("total must be > 0, got {0}")]
    NonPositiveTotal(f64),

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} overflowed; inputs are too large to compute")]
    Overflow { field: &'static str },

    #[error("rate must be > -1, got {0}")]
    InvalidRate(f64),

    #[error("discount must be between 0 and 100 percent, got {0}")]
    InvalidDiscount(f64),
}

pub type Result<T> = std::result::Result<T, EngineError>;
