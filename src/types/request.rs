use bon::Builder;
use serde::Serialize;

use super::ActionType;

/// Body of a points or score update.
///
/// # Example
///
/// ```
/// use tatsu_client_sdk::types::{ActionType, ModifyAmountRequest};
///
/// let request = ModifyAmountRequest::builder()
///     .action(ActionType::Remove)
///     .amount(25)
///     .build();
///
/// assert_eq!(
///     serde_json::to_value(&request).unwrap(),
///     serde_json::json!({"action": 1, "amount": 25})
/// );
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Builder)]
pub struct ModifyAmountRequest {
    pub action: ActionType,
    /// Between 1 and 100,000 inclusive.
    pub amount: u32,
}
