pub mod error;
pub mod model;
pub mod pipeline;
pub mod response;
pub mod types;

pub use error::CommissionsError;
pub use model::*;
pub use pipeline::process_deal;
pub use response::DealResult;
pub use types::{Money, Rate};

/// Standard result type for all commission-engine operations
pub type CommissionsResult<T> = Result<T, CommissionsError>;

/// Process a deal from a JSON request body and return the JSON response body.
///
/// Convenience wrapper for string transports (CLI, HTTP adapters). The typed
/// entry point is [`pipeline::process_deal`].
pub fn process_deal_json(input: &str) -> CommissionsResult<String> {
    let request: model::DealRequest = serde_json::from_str(input)?;
    let result = pipeline::process_deal(&request)?;
    Ok(serde_json::to_string_pretty(&result)?)
}
