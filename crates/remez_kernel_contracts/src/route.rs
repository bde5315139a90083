#![forbid(unsafe_code)]

use chrono::NaiveDate;

use crate::common::ConversationId;
use crate::{ContractViolation, CorrelationId, ReasonCodeId, SchemaVersion, TurnId, Validate};

pub const ROUTE_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const GOVERNMENT_NUMBER_MIN: u32 = 20;
pub const GOVERNMENT_NUMBER_MAX: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum RouteCapabilityId {
    IntentRoute,
}

impl RouteCapabilityId {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteCapabilityId::IntentRoute => "INTENT_ROUTE",
        }
    }
}

/// Closed intent taxonomy. Downstream stages branch on this and nothing
/// else, so a fifth value must be a compile error, not a runtime surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum IntentKind {
    Query,
    Eval,
    Reference,
    Clarification,
}

impl IntentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IntentKind::Query => "QUERY",
            IntentKind::Eval => "EVAL",
            IntentKind::Reference => "REFERENCE",
            IntentKind::Clarification => "CLARIFICATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum QueryOperation {
    Search,
    Count,
    Compare,
}

impl QueryOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryOperation::Search => "SEARCH",
            QueryOperation::Count => "COUNT",
            QueryOperation::Compare => "COMPARE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ReferenceKind {
    Last,
    Previous,
    Specific,
    Context,
}

impl ReferenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceKind::Last => "LAST",
            ReferenceKind::Previous => "PREVIOUS",
            ReferenceKind::Specific => "SPECIFIC",
            ReferenceKind::Context => "CONTEXT",
        }
    }
}

/// Inclusive date window. Either bound may be open; a fully open window is
/// not a window and fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn v1(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, ContractViolation> {
        let r = Self { start, end };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for DateRange {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.start.is_none() && self.end.is_none() {
            return Err(ContractViolation::InvalidValue {
                field: "date_range",
                reason: "at least one bound must be present",
            });
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ContractViolation::InvalidValue {
                    field: "date_range.start",
                    reason: "must be <= end",
                });
            }
        }
        Ok(())
    }
}

/// Extracted parameters. Absence is `None` / empty vec, never an empty
/// string or zero, so downstream filter templates cannot bind a ghost value.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct EntitySet {
    pub government_number: Option<u32>,
    pub decision_number: Option<u64>,
    pub topic: Option<String>,
    pub ministries: Vec<String>,
    pub date_range: Option<DateRange>,
    pub limit: Option<u32>,
    pub operation: Option<QueryOperation>,
    pub comparison_target: Option<String>,
    pub reference_kind: Option<ReferenceKind>,
    pub reference_position: Option<u32>,
}

impl Validate for EntitySet {
    fn validate(&self) -> Result<(), ContractViolation> {
        if let Some(n) = self.government_number {
            if !(GOVERNMENT_NUMBER_MIN..=GOVERNMENT_NUMBER_MAX).contains(&n) {
                return Err(ContractViolation::InvalidRange {
                    field: "entity_set.government_number",
                    min: GOVERNMENT_NUMBER_MIN as f64,
                    max: GOVERNMENT_NUMBER_MAX as f64,
                    got: n as f64,
                });
            }
        }
        if self.decision_number == Some(0) {
            return Err(ContractViolation::InvalidValue {
                field: "entity_set.decision_number",
                reason: "must be > 0",
            });
        }
        if let Some(topic) = &self.topic {
            validate_text("entity_set.topic", topic, 256)?;
        }
        if self.ministries.len() > 16 {
            return Err(ContractViolation::InvalidValue {
                field: "entity_set.ministries",
                reason: "exceeds max length",
            });
        }
        for ministry in &self.ministries {
            validate_text("entity_set.ministries", ministry, 128)?;
        }
        if let Some(range) = &self.date_range {
            range.validate()?;
        }
        if self.limit == Some(0) {
            return Err(ContractViolation::InvalidValue {
                field: "entity_set.limit",
                reason: "must be > 0",
            });
        }
        if let Some(target) = &self.comparison_target {
            validate_text("entity_set.comparison_target", target, 256)?;
        }
        if self.reference_position == Some(0) {
            return Err(ContractViolation::InvalidValue {
                field: "entity_set.reference_position",
                reason: "must be >= 1",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct RouteFlags {
    pub needs_context: bool,
    pub is_statistical: bool,
    pub is_comparison: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequestEnvelope {
    pub schema_version: SchemaVersion,
    pub correlation_id: CorrelationId,
    pub turn_id: TurnId,
}

impl RouteRequestEnvelope {
    pub fn v1(correlation_id: CorrelationId, turn_id: TurnId) -> Result<Self, ContractViolation> {
        let env = Self {
            schema_version: ROUTE_CONTRACT_VERSION,
            correlation_id,
            turn_id,
        };
        env.validate()?;
        Ok(env)
    }
}

impl Validate for RouteRequestEnvelope {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ROUTE_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "route_request_envelope.schema_version",
                reason: "must match ROUTE_CONTRACT_VERSION",
            });
        }
        self.correlation_id.validate()?;
        self.turn_id.validate()?;
        Ok(())
    }
}

/// One turn of user text. `now` anchors relative-date words; when absent,
/// relative dates are simply not resolved. `conversation_id` is carried
/// through untouched for the context-resolution collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentRouteRequest {
    pub envelope: RouteRequestEnvelope,
    pub query_text: String,
    pub now: Option<NaiveDate>,
    pub conversation_id: Option<ConversationId>,
}

impl IntentRouteRequest {
    pub fn v1(
        envelope: RouteRequestEnvelope,
        query_text: String,
        now: Option<NaiveDate>,
        conversation_id: Option<ConversationId>,
    ) -> Result<Self, ContractViolation> {
        let req = Self {
            envelope,
            query_text,
            now,
            conversation_id,
        };
        req.validate()?;
        Ok(req)
    }
}

impl Validate for IntentRouteRequest {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.envelope.validate()?;
        if let Some(conversation_id) = &self.conversation_id {
            conversation_id.validate()?;
        }
        // query_text is deliberately unconstrained: empty or pathological
        // input is answered with a clarification result, never a refuse.
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct IntentRouteOk {
    pub schema_version: SchemaVersion,
    pub reason_code: ReasonCodeId,
    pub intent_kind: IntentKind,
    pub entities: EntitySet,
    pub confidence: f32,
    pub route_flags: RouteFlags,
    pub explanation: String,
}

impl IntentRouteOk {
    pub fn v1(
        reason_code: ReasonCodeId,
        intent_kind: IntentKind,
        entities: EntitySet,
        confidence: f32,
        route_flags: RouteFlags,
        explanation: String,
    ) -> Result<Self, ContractViolation> {
        let ok = Self {
            schema_version: ROUTE_CONTRACT_VERSION,
            reason_code,
            intent_kind,
            entities,
            confidence,
            route_flags,
            explanation,
        };
        ok.validate()?;
        Ok(ok)
    }
}

impl Validate for IntentRouteOk {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ROUTE_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "intent_route_ok.schema_version",
                reason: "must match ROUTE_CONTRACT_VERSION",
            });
        }
        self.entities.validate()?;
        if !self.confidence.is_finite() {
            return Err(ContractViolation::NotFinite {
                field: "intent_route_ok.confidence",
            });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ContractViolation::InvalidRange {
                field: "intent_route_ok.confidence",
                min: 0.0,
                max: 1.0,
                got: self.confidence as f64,
            });
        }
        validate_text("intent_route_ok.explanation", &self.explanation, 256)?;

        if self.route_flags.needs_context != (self.intent_kind == IntentKind::Reference) {
            return Err(ContractViolation::InvalidValue {
                field: "intent_route_ok.route_flags.needs_context",
                reason: "must be set iff intent_kind is REFERENCE",
            });
        }
        if self.route_flags.is_statistical && self.route_flags.is_comparison {
            return Err(ContractViolation::InvalidValue {
                field: "intent_route_ok.route_flags",
                reason: "is_statistical and is_comparison are mutually exclusive",
            });
        }
        if self.intent_kind != IntentKind::Query
            && (self.route_flags.is_statistical || self.route_flags.is_comparison)
        {
            return Err(ContractViolation::InvalidValue {
                field: "intent_route_ok.route_flags",
                reason: "statistical/comparison flags require intent_kind QUERY",
            });
        }
        if (self.intent_kind == IntentKind::Query) != self.entities.operation.is_some() {
            return Err(ContractViolation::InvalidValue {
                field: "intent_route_ok.entities.operation",
                reason: "must be present iff intent_kind is QUERY",
            });
        }
        if (self.intent_kind == IntentKind::Reference) != self.entities.reference_kind.is_some() {
            return Err(ContractViolation::InvalidValue {
                field: "intent_route_ok.entities.reference_kind",
                reason: "must be present iff intent_kind is REFERENCE",
            });
        }
        if self.intent_kind == IntentKind::Clarification && self.confidence >= 0.4 {
            return Err(ContractViolation::InvalidRange {
                field: "intent_route_ok.confidence",
                min: 0.0,
                max: 0.4,
                got: self.confidence as f64,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RouteRefuse {
    pub schema_version: SchemaVersion,
    pub capability_id: RouteCapabilityId,
    pub reason_code: ReasonCodeId,
    pub message: String,
}

impl RouteRefuse {
    pub fn v1(
        capability_id: RouteCapabilityId,
        reason_code: ReasonCodeId,
        message: String,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: ROUTE_CONTRACT_VERSION,
            capability_id,
            reason_code,
            message,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for RouteRefuse {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ROUTE_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "route_refuse.schema_version",
                reason: "must match ROUTE_CONTRACT_VERSION",
            });
        }
        validate_text("route_refuse.message", &self.message, 256)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum IntentRouteResponse {
    IntentRouteOk(IntentRouteOk),
    Refuse(RouteRefuse),
}

impl Validate for IntentRouteResponse {
    fn validate(&self) -> Result<(), ContractViolation> {
        match self {
            IntentRouteResponse::IntentRouteOk(o) => o.validate(),
            IntentRouteResponse::Refuse(r) => r.validate(),
        }
    }
}

fn validate_text(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ContractViolation> {
    if value.trim().is_empty() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must not be empty",
        });
    }
    if value.len() > max_len {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "exceeds max length",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> RouteRequestEnvelope {
        RouteRequestEnvelope::v1(CorrelationId(7), TurnId(1)).unwrap()
    }

    #[test]
    fn ct_route_01_envelope_rejects_zero_ids() {
        assert!(RouteRequestEnvelope::v1(CorrelationId(0), TurnId(1)).is_err());
        assert!(RouteRequestEnvelope::v1(CorrelationId(7), TurnId(0)).is_err());
    }

    #[test]
    fn ct_route_02_request_accepts_empty_text() {
        let req = IntentRouteRequest::v1(envelope(), String::new(), None, None);
        assert!(req.is_ok());
    }

    #[test]
    fn ct_route_03_needs_context_is_coupled_to_reference() {
        let mut entities = EntitySet::default();
        entities.reference_kind = Some(ReferenceKind::Last);
        entities.reference_position = Some(1);
        let ok = IntentRouteOk::v1(
            ReasonCodeId(1),
            IntentKind::Reference,
            entities.clone(),
            0.9,
            RouteFlags {
                needs_context: true,
                is_statistical: false,
                is_comparison: false,
            },
            "reference to previously shown result".to_string(),
        );
        assert!(ok.is_ok());

        let decoupled = IntentRouteOk::v1(
            ReasonCodeId(1),
            IntentKind::Reference,
            entities,
            0.9,
            RouteFlags::default(),
            "reference to previously shown result".to_string(),
        );
        assert!(decoupled.is_err());
    }

    #[test]
    fn ct_route_04_statistical_and_comparison_are_exclusive() {
        let mut entities = EntitySet::default();
        entities.operation = Some(QueryOperation::Count);
        let bad = IntentRouteOk::v1(
            ReasonCodeId(1),
            IntentKind::Query,
            entities,
            0.8,
            RouteFlags {
                needs_context: false,
                is_statistical: true,
                is_comparison: true,
            },
            "statistical count query".to_string(),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn ct_route_05_clarification_caps_confidence() {
        let bad = IntentRouteOk::v1(
            ReasonCodeId(1),
            IntentKind::Clarification,
            EntitySet::default(),
            0.5,
            RouteFlags::default(),
            "intent unclear".to_string(),
        );
        assert!(bad.is_err());

        let ok = IntentRouteOk::v1(
            ReasonCodeId(1),
            IntentKind::Clarification,
            EntitySet::default(),
            0.2,
            RouteFlags::default(),
            "intent unclear".to_string(),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn ct_route_06_government_number_is_bounded() {
        let mut entities = EntitySet::default();
        entities.government_number = Some(19);
        assert!(entities.validate().is_err());
        entities.government_number = Some(41);
        assert!(entities.validate().is_err());
        entities.government_number = Some(37);
        assert!(entities.validate().is_ok());
    }

    #[test]
    fn ct_route_07_date_range_requires_a_bound() {
        assert!(DateRange::v1(None, None).is_err());
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(DateRange::v1(Some(start), None).is_ok());
        let end = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        assert!(DateRange::v1(Some(start), Some(end)).is_err());
    }
}
