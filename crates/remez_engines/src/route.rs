#![forbid(unsafe_code)]

use chrono::NaiveDate;

use remez_kernel_contracts::route::{
    DateRange, EntitySet, IntentKind, IntentRouteOk, IntentRouteRequest, IntentRouteResponse,
    QueryOperation, RouteCapabilityId, RouteFlags, RouteRefuse,
};
use remez_kernel_contracts::{ReasonCodeId, Validate};

use crate::daterange::extract_date_range;
use crate::normalize::{normalize, truncate_chars};
use crate::numword::{extract_decision_number, extract_government_number, extract_limit};
use crate::orgunit::{canonicalize_ministry, extract_ministries};
use crate::reference::{detect_reference, ReferenceMatch};
use crate::topic::{extract_topic, strip_leading_triggers};

pub mod reason_codes {
    use remez_kernel_contracts::ReasonCodeId;

    // ROUTE reason-code namespace. Values are placeholders until global registry lock.
    pub const ROUTE_OK_QUERY: ReasonCodeId = ReasonCodeId(0x524F_0001);
    pub const ROUTE_OK_EVAL: ReasonCodeId = ReasonCodeId(0x524F_0002);
    pub const ROUTE_OK_REFERENCE: ReasonCodeId = ReasonCodeId(0x524F_0003);
    pub const ROUTE_OK_CLARIFICATION: ReasonCodeId = ReasonCodeId(0x524F_0004);

    pub const ROUTE_INPUT_SCHEMA_INVALID: ReasonCodeId = ReasonCodeId(0x524F_00F1);
    pub const ROUTE_INTERNAL_PIPELINE_ERROR: ReasonCodeId = ReasonCodeId(0x524F_00F2);
}

const STATISTICAL_TOKENS: &[&str] = &["כמה", "סה\"כ", "סהכ"];
const STATISTICAL_PHRASES: &[&str] = &["סך הכל", "מספר החלטות", "כמות החלטות"];
const COMPARISON_TOKENS: &[&str] = &["השווה", "השוואה", "תשווה", "לעומת", "מול"];
const COMPARISON_PHRASES: &[&str] = &["הבדל בין", "מה ההבדל"];
const ANALYSIS_VERBS: &[&str] = &["נתח", "נתחי", "תנתח", "נתחו", "ניתוח"];
const GENERIC_ANALYSIS_PHRASES: &[&str] = &["את כל", "כל ההחלטות"];
const DOMAIN_STEM_FRAGMENTS: &[&str] = &["החלט", "ממשל", "משרד"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentRouteConfig {
    pub min_tokens: usize,
    pub max_ministries: usize,
    pub max_topic_chars: usize,
    pub max_target_chars: usize,
}

impl IntentRouteConfig {
    pub fn mvp_v1() -> Self {
        Self {
            min_tokens: 3,
            max_ministries: 8,
            max_topic_chars: 120,
            max_target_chars: 160,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntentRouteRuntime {
    config: IntentRouteConfig,
}

#[derive(Debug, Clone, Default)]
struct Extraction {
    government_number: Option<u32>,
    decision_number: Option<u64>,
    topic: Option<String>,
    ministries: Vec<String>,
    date_range: Option<DateRange>,
    limit: Option<u32>,
    reference: Option<ReferenceMatch>,
    comparison_target: Option<String>,
}

/// Everything the cascade predicates are allowed to look at. Flattened to
/// presence bits so each step stays an order-independent pure predicate.
#[derive(Debug, Clone, Copy)]
struct ClassifyInput {
    min_tokens: usize,
    token_count: usize,
    has_identifier: bool,
    has_decision_number: bool,
    has_textual: bool,
    has_date: bool,
    has_limit: bool,
    reference: Option<ReferenceMatch>,
    statistical: bool,
    comparison: bool,
    analysis_verb: bool,
    generic_analysis: bool,
    domain_keyword: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Decision {
    kind: IntentKind,
    operation: Option<QueryOperation>,
    statistical: bool,
    comparison: bool,
    confidence: f32,
    explanation: &'static str,
}

struct CascadeStep {
    name: &'static str,
    applies: fn(&ClassifyInput) -> bool,
    decide: fn(&ClassifyInput) -> Decision,
}

/// The intent cascade, first match wins, no backtracking. Order is part of
/// the contract: a reference beats an analysis verb, which beats a plain
/// query, and the final step is a catch-all clarification.
const CASCADE: &[CascadeStep] = &[
    CascadeStep {
        name: "too_short",
        applies: |input| input.token_count < input.min_tokens,
        decide: |_| Decision {
            kind: IntentKind::Clarification,
            operation: None,
            statistical: false,
            comparison: false,
            confidence: 0.2,
            explanation: "query too short",
        },
    },
    CascadeStep {
        name: "reference",
        applies: |input| input.reference.is_some(),
        decide: |input| {
            let explicit = input.reference.map(|m| m.explicit).unwrap_or(false);
            Decision {
                kind: IntentKind::Reference,
                operation: None,
                statistical: false,
                comparison: false,
                confidence: if explicit { 0.9 } else { 0.7 },
                explanation: "reference to previously shown results",
            }
        },
    },
    CascadeStep {
        name: "deep_analysis",
        // A reference target ("analyze the last one") is already owned by
        // the step above; reaching here with an analysis verb requires a
        // concrete extracted decision number.
        applies: |input| {
            input.analysis_verb && !input.generic_analysis && input.has_decision_number
        },
        decide: |_| Decision {
            kind: IntentKind::Eval,
            operation: None,
            statistical: false,
            comparison: false,
            confidence: 0.9,
            explanation: "deep analysis of a single decision",
        },
    },
    CascadeStep {
        name: "query",
        applies: |input| {
            input.has_identifier
                || input.has_textual
                || input.has_date
                || input.has_limit
                || input.statistical
                || input.comparison
                || input.domain_keyword
        },
        decide: |input| {
            let (operation, explanation) = if input.statistical {
                (QueryOperation::Count, "statistical count query")
            } else if input.comparison {
                (QueryOperation::Compare, "comparison query")
            } else {
                (QueryOperation::Search, "search query")
            };
            Decision {
                kind: IntentKind::Query,
                operation: Some(operation),
                statistical: input.statistical,
                comparison: !input.statistical && input.comparison,
                confidence: query_confidence(input),
                explanation,
            }
        },
    },
    CascadeStep {
        name: "unclear",
        applies: |_| true,
        decide: |_| Decision {
            kind: IntentKind::Clarification,
            operation: None,
            statistical: false,
            comparison: false,
            confidence: 0.25,
            explanation: "intent unclear",
        },
    },
];

/// Deterministic per-branch score: more independent entity groups mean a
/// more specific query. Never a learned probability.
fn query_confidence(input: &ClassifyInput) -> f32 {
    let specificity = [
        input.has_identifier,
        input.has_textual,
        input.has_date,
        input.has_limit,
    ]
    .iter()
    .filter(|present| **present)
    .count();
    let base: f32 = match specificity {
        0 => 0.6,
        1 => 0.75,
        2 => 0.85,
        _ => 0.9,
    };
    let keyword_bonus = if input.statistical || input.comparison {
        0.05
    } else {
        0.0
    };
    (base + keyword_bonus).min(0.95)
}

impl IntentRouteRuntime {
    pub fn new(config: IntentRouteConfig) -> Self {
        Self { config }
    }

    /// Route one query. Never panics and never errors for a schema-valid
    /// request: every internal failure collapses into a low-confidence
    /// clarification result.
    pub fn run(&self, req: &IntentRouteRequest) -> IntentRouteResponse {
        if req.validate().is_err() {
            return self.refuse(
                reason_codes::ROUTE_INPUT_SCHEMA_INVALID,
                "route request failed contract validation",
            );
        }

        let normalized = normalize(&req.query_text);
        let ok = match self.route_normalized(&normalized, req.now) {
            Ok(ok) => ok,
            Err(_) => self.clarification_fallback(),
        };
        IntentRouteResponse::IntentRouteOk(ok)
    }

    fn route_normalized(
        &self,
        text: &str,
        now: Option<NaiveDate>,
    ) -> Result<IntentRouteOk, ReasonCodeId> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let extraction = extract(text, &tokens, now);
        let input = self.classify_input(text, &tokens, &extraction);

        for step in CASCADE {
            if (step.applies)(&input) {
                let decision = (step.decide)(&input);
                return self.assemble(decision, &extraction);
            }
        }
        // The last cascade step is a catch-all; falling through is a bug.
        Err(reason_codes::ROUTE_INTERNAL_PIPELINE_ERROR)
    }

    fn classify_input(
        &self,
        text: &str,
        tokens: &[&str],
        extraction: &Extraction,
    ) -> ClassifyInput {
        ClassifyInput {
            min_tokens: self.config.min_tokens,
            token_count: tokens.len(),
            has_identifier: extraction.government_number.is_some()
                || extraction.decision_number.is_some(),
            has_decision_number: extraction.decision_number.is_some(),
            has_textual: extraction.topic.is_some() || !extraction.ministries.is_empty(),
            has_date: extraction.date_range.is_some(),
            has_limit: extraction.limit.is_some(),
            reference: extraction.reference,
            statistical: has_statistical_marker(text, tokens),
            comparison: has_comparison_marker(text, tokens),
            analysis_verb: tokens.iter().any(|t| ANALYSIS_VERBS.contains(t)),
            generic_analysis: GENERIC_ANALYSIS_PHRASES.iter().any(|p| text.contains(p)),
            domain_keyword: has_domain_keyword(tokens),
        }
    }

    fn assemble(
        &self,
        decision: Decision,
        extraction: &Extraction,
    ) -> Result<IntentRouteOk, ReasonCodeId> {
        let mut entities = EntitySet {
            government_number: extraction.government_number,
            decision_number: extraction.decision_number,
            topic: assembled_topic(&extraction.topic, self.config.max_topic_chars),
            ministries: extraction
                .ministries
                .iter()
                .take(self.config.max_ministries)
                .map(|m| canonicalize_ministry(m))
                .collect(),
            date_range: extraction.date_range,
            limit: extraction.limit,
            operation: None,
            comparison_target: None,
            reference_kind: None,
            reference_position: None,
        };

        match decision.kind {
            IntentKind::Query => {
                entities.operation = decision.operation.or(Some(QueryOperation::Search));
                if entities.operation == Some(QueryOperation::Compare) {
                    entities.comparison_target = extraction
                        .comparison_target
                        .as_deref()
                        .map(|t| truncate_chars(t, self.config.max_target_chars).to_string())
                        .filter(|t| !t.is_empty());
                }
            }
            IntentKind::Reference => {
                let reference = extraction
                    .reference
                    .ok_or(reason_codes::ROUTE_INTERNAL_PIPELINE_ERROR)?;
                entities.reference_kind = Some(reference.kind);
                entities.reference_position = reference.position;
            }
            IntentKind::Eval | IntentKind::Clarification => {}
        }

        let route_flags = RouteFlags {
            needs_context: decision.kind == IntentKind::Reference,
            is_statistical: decision.kind == IntentKind::Query && decision.statistical,
            is_comparison: decision.kind == IntentKind::Query
                && decision.comparison
                && !decision.statistical,
        };

        IntentRouteOk::v1(
            reason_code_for(decision.kind),
            decision.kind,
            entities,
            decision.confidence,
            route_flags,
            decision.explanation.to_string(),
        )
        .map_err(|_| reason_codes::ROUTE_INTERNAL_PIPELINE_ERROR)
    }

    fn clarification_fallback(&self) -> IntentRouteOk {
        IntentRouteOk::v1(
            reason_codes::ROUTE_INTERNAL_PIPELINE_ERROR,
            IntentKind::Clarification,
            EntitySet::default(),
            0.1,
            RouteFlags::default(),
            "intent unclear".to_string(),
        )
        .expect("IntentRouteOk::v1 must construct for static clarification")
    }

    fn refuse(&self, reason_code: ReasonCodeId, message: &'static str) -> IntentRouteResponse {
        let r = RouteRefuse::v1(
            RouteCapabilityId::IntentRoute,
            reason_code,
            message.to_string(),
        )
        .expect("RouteRefuse::v1 must construct for static message");
        IntentRouteResponse::Refuse(r)
    }
}

fn extract(text: &str, tokens: &[&str], now: Option<NaiveDate>) -> Extraction {
    let government_number = extract_government_number(tokens);
    let decision_number = extract_decision_number(tokens);
    let topic = extract_topic(text);
    let ministries = extract_ministries(text);
    let date_range = extract_date_range(text, now);
    let limit = extract_limit(tokens);

    let has_standalone_filters = government_number.is_some()
        || topic.is_some()
        || !ministries.is_empty()
        || date_range.is_some();
    let reference = detect_reference(text, has_standalone_filters);
    let comparison_target = extract_comparison_target(text, tokens);

    Extraction {
        government_number,
        decision_number,
        topic,
        ministries,
        date_range,
        limit,
        reference,
        comparison_target,
    }
}

fn assembled_topic(topic: &Option<String>, max_chars: usize) -> Option<String> {
    topic
        .as_deref()
        .map(strip_leading_triggers)
        .map(|t| truncate_chars(t, max_chars).trim().to_string())
        .filter(|t| !t.is_empty())
}

fn has_statistical_marker(text: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| STATISTICAL_TOKENS.contains(t))
        || STATISTICAL_PHRASES.iter().any(|p| text.contains(p))
}

fn has_comparison_marker(text: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| COMPARISON_TOKENS.contains(t))
        || COMPARISON_PHRASES.iter().any(|p| text.contains(p))
}

fn has_domain_keyword(tokens: &[&str]) -> bool {
    tokens.iter().any(|t| {
        DOMAIN_STEM_FRAGMENTS
            .iter()
            .any(|fragment| t.contains(fragment))
    }) || tokens.iter().any(|t| ANALYSIS_VERBS.contains(t))
}

/// The free-form descriptor after the first comparison marker, bound later
/// by the query-building stage.
fn extract_comparison_target(text: &str, tokens: &[&str]) -> Option<String> {
    if !has_comparison_marker(text, tokens) {
        return None;
    }
    let marker_at = tokens.iter().position(|t| {
        COMPARISON_TOKENS.contains(t) || (*t == "בין" && text.contains("הבדל בין"))
    })?;
    let target = tokens[marker_at + 1..].join(" ");
    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}

fn reason_code_for(kind: IntentKind) -> ReasonCodeId {
    match kind {
        IntentKind::Query => reason_codes::ROUTE_OK_QUERY,
        IntentKind::Eval => reason_codes::ROUTE_OK_EVAL,
        IntentKind::Reference => reason_codes::ROUTE_OK_REFERENCE,
        IntentKind::Clarification => reason_codes::ROUTE_OK_CLARIFICATION,
    }
}
