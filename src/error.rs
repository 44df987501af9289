use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmortisationError {
    #[error("Invalid parameter: {field} - {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Schedule did not converge after {periods} periods (remaining balance: {remaining_balance})")]
    UnconvergedSchedule {
        periods: usize,
        remaining_balance: Decimal,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AmortisationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        AmortisationError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for AmortisationError {
    fn from(e: toml::de::Error) -> Self {
        AmortisationError::InvalidConfig(e.to_string())
    }
}
