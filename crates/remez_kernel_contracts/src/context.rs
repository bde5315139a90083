#![forbid(unsafe_code)]

use crate::common::ConversationId;
use crate::route::ReferenceKind;
use crate::{ContractViolation, Validate};

/// Concrete entities recovered from conversation history by the external
/// context-resolution stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedReference {
    pub decision_number: Option<u64>,
    pub government_number: Option<u32>,
    pub topic: Option<String>,
}

impl Validate for ResolvedReference {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.decision_number == Some(0) {
            return Err(ContractViolation::InvalidValue {
                field: "resolved_reference.decision_number",
                reason: "must be > 0",
            });
        }
        if let Some(topic) = &self.topic {
            if topic.trim().is_empty() {
                return Err(ContractViolation::InvalidValue {
                    field: "resolved_reference.topic",
                    reason: "must not be empty when provided",
                });
            }
        }
        Ok(())
    }
}

/// Capability boundary for reference resolution. The routing engine only
/// classifies that context is needed and what kind; mapping "the last one"
/// to an actual prior result is the collaborator's job, so the engine
/// itself never holds conversation state.
pub trait ReferenceResolver {
    fn resolve(
        &self,
        kind: ReferenceKind,
        position: Option<u32>,
        conversation_id: &ConversationId,
    ) -> Option<ResolvedReference>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedResolver;

    impl ReferenceResolver for FixedResolver {
        fn resolve(
            &self,
            kind: ReferenceKind,
            position: Option<u32>,
            _conversation_id: &ConversationId,
        ) -> Option<ResolvedReference> {
            match (kind, position) {
                (ReferenceKind::Last, _) | (ReferenceKind::Specific, Some(1)) => {
                    Some(ResolvedReference {
                        decision_number: Some(2983),
                        government_number: None,
                        topic: None,
                    })
                }
                _ => None,
            }
        }
    }

    #[test]
    fn ct_context_01_resolver_boundary_round_trips() {
        let resolver = FixedResolver;
        let conversation = ConversationId::new("conv_01".to_string()).unwrap();
        let resolved = resolver
            .resolve(ReferenceKind::Last, Some(1), &conversation)
            .unwrap();
        assert!(resolved.validate().is_ok());
        assert_eq!(resolved.decision_number, Some(2983));
        assert!(resolver
            .resolve(ReferenceKind::Previous, None, &conversation)
            .is_none());
    }
}
