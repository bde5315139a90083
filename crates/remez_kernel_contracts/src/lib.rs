#![forbid(unsafe_code)]

pub mod common;
pub mod context;
pub mod route;

pub use common::{
    ContractViolation, ConversationId, CorrelationId, ReasonCodeId, SchemaVersion, TurnId,
    Validate,
};
