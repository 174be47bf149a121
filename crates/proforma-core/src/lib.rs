pub mod error;
pub mod inputs;
pub mod mortgage;
pub mod time_value;
pub mod types;

pub mod analysis;
pub mod commercial;
pub mod equity;
pub mod metrics;
pub mod napkin;
pub mod projection;
pub mod sensitivity;

pub use error::ProFormaError;
pub use inputs::*;
pub use types::*;

/// Standard result type for all pro forma operations
pub type ProFormaResult<T> = Result<T, ProFormaError>;
