#![forbid(unsafe_code)]

use chrono::NaiveDate;

use remez_engines::route::IntentRouteRuntime;
use remez_kernel_contracts::route::{IntentRouteRequest, RouteRequestEnvelope};
use remez_kernel_contracts::{ConversationId, CorrelationId, TurnId};

/// Run one query through the routing engine and render the full response as
/// pretty JSON. Development surface only; the ids are synthetic.
pub fn execute_route_command(
    runtime: &IntentRouteRuntime,
    query_text: &str,
    now: Option<NaiveDate>,
    conversation: Option<&str>,
) -> Result<String, String> {
    let envelope = RouteRequestEnvelope::v1(CorrelationId(1), TurnId(1))
        .map_err(|violation| format!("{violation:?}"))?;
    let conversation_id = conversation
        .map(|c| ConversationId::new(c.to_string()))
        .transpose()
        .map_err(|violation| format!("{violation:?}"))?;
    let req = IntentRouteRequest::v1(envelope, query_text.to_string(), now, conversation_id)
        .map_err(|violation| format!("{violation:?}"))?;

    let response = runtime.run(&req);
    serde_json::to_string_pretty(&response).map_err(|e| e.to_string())
}

pub fn parse_now_arg(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid --now value: {value} (expected YYYY-MM-DD)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use remez_engines::route::IntentRouteConfig;

    #[test]
    fn at_route_cli_01_renders_intent_json() {
        let runtime = IntentRouteRuntime::new(IntentRouteConfig::mvp_v1());
        let out = execute_route_command(&runtime, "החלטות של ממשלה 37", None, Some("conv_01"))
            .unwrap();
        assert!(out.contains("IntentRouteOk"));
        assert!(out.contains("Query"));
    }

    #[test]
    fn at_route_cli_02_rejects_bad_now() {
        assert!(parse_now_arg("2024-06-12").is_ok());
        assert!(parse_now_arg("12/06/2024").is_err());
    }
}
