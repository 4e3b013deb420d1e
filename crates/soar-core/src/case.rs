//! Case management requests.
//!
//! Every function here describes one SOAR REST call as an [`ApiCall`]. The
//! call is sent by a [`crate::SoarApi`] implementation and the response body
//! is relayed unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Case priority levels accepted by the SOAR platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CasePriority {
    PriorityUnspecified,
    PriorityInfo,
    PriorityLow,
    PriorityMedium,
    PriorityHigh,
    PriorityCritical,
}

impl CasePriority {
    pub const ALL: [CasePriority; 6] = [
        CasePriority::PriorityUnspecified,
        CasePriority::PriorityInfo,
        CasePriority::PriorityLow,
        CasePriority::PriorityMedium,
        CasePriority::PriorityHigh,
        CasePriority::PriorityCritical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CasePriority::PriorityUnspecified => "PriorityUnspecified",
            CasePriority::PriorityInfo => "PriorityInfo",
            CasePriority::PriorityLow => "PriorityLow",
            CasePriority::PriorityMedium => "PriorityMedium",
            CasePriority::PriorityHigh => "PriorityHigh",
            CasePriority::PriorityCritical => "PriorityCritical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

/// One request against the SOAR REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: Method,
    /// Path segments below the base URL, unencoded.
    pub path: Vec<String>,
    /// OData system options (`$select`, `$expand`). Sent verbatim.
    pub odata: Vec<(String, String)>,
    /// Ordinary query parameters, form encoded.
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiCall {
    fn new(method: Method, path: Vec<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path,
            odata: Vec::new(),
            query: Vec::new(),
            body,
        }
    }

    pub fn get(path: Vec<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    pub fn post(path: Vec<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    pub fn patch(path: Vec<String>, body: Value) -> Self {
        Self::new(Method::Patch, path, Some(body))
    }

    pub fn with_odata(mut self, key: &str, value: &str) -> Self {
        self.odata.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    fn with_page_token(self, page_token: Option<&str>) -> Self {
        match page_token {
            Some(token) => self.with_query("pageToken", token),
            None => self,
        }
    }
}

fn segments(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn cases_path() -> Vec<String> {
    segments(&["api", "1p", "external", "v1", "cases"])
}

fn case_path(case_id: &str) -> Vec<String> {
    let mut path = cases_path();
    path.push(case_id.to_string());
    path
}

fn comments_path(case_id: &str) -> Vec<String> {
    let mut path = case_path(case_id);
    path.push("comments".to_string());
    path
}

fn alerts_path(case_id: &str) -> Vec<String> {
    segments(&["api", "1p", "external", "v1.0", "cases", case_id, "caseAlerts"])
}

/// First page of cases, or the page `page_token` points at (tags expanded).
pub fn list_cases(page_token: Option<&str>) -> ApiCall {
    match page_token {
        Some(token) => ApiCall::get(cases_path())
            .with_odata("$expand", "tags")
            .with_query("pageToken", token),
        None => ApiCall::get(cases_path()),
    }
}

pub fn get_case(case_id: &str) -> ApiCall {
    ApiCall::get(case_path(case_id))
}

pub fn list_case_comments(case_id: &str) -> ApiCall {
    ApiCall::get(comments_path(case_id))
}

pub fn post_case_comment(case_id: &str, comment: &str) -> ApiCall {
    ApiCall::post(comments_path(case_id), json!({ "Comment": comment }))
}

pub fn list_alerts_by_case(case_id: &str, page_token: Option<&str>) -> ApiCall {
    ApiCall::get(alerts_path(case_id)).with_page_token(page_token)
}

pub fn list_alert_group_identifiers_by_case(case_id: &str, page_token: Option<&str>) -> ApiCall {
    ApiCall::get(alerts_path(case_id))
        .with_odata("$select", "alertGroupIdentifier")
        .with_page_token(page_token)
}

// The platform serves involved events under `alerts`, not `caseAlerts`.
pub fn list_events_by_alert(case_id: &str, alert_id: &str, page_token: Option<&str>) -> ApiCall {
    ApiCall::get(segments(&[
        "api",
        "1p",
        "external",
        "v1.0",
        "cases",
        case_id,
        "alerts",
        alert_id,
        "involvedEvents",
    ]))
    .with_page_token(page_token)
}

pub fn change_case_priority(case_id: &str, priority: CasePriority) -> ApiCall {
    ApiCall::patch(case_path(case_id), json!({ "Priority": priority.as_str() }))
}

pub fn get_entities_by_alert_group_identifiers(
    case_id: &str,
    alert_group_identifiers: &[String],
) -> ApiCall {
    ApiCall::post(
        segments(&["api", "external", "v1", "case-overview", "GetAlertsEntities"]),
        json!({
            "caseId": case_id,
            "alertGroupIdentifiers": alert_group_identifiers,
        }),
    )
}

pub fn get_entity_details(identifier: &str, entity_type: &str, environment: &str) -> ApiCall {
    ApiCall::post(
        segments(&["api", "external", "v1", "entities", "GetEntityData"]),
        json!({
            "EntityIdentifier": identifier,
            "EntityType": entity_type,
            "EntityEnvironment": environment,
            "LastCaseType": 0,
            "CaseDistributionType": 0,
        }),
    )
}

/// Entity search filters. Unset filters are sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntitySearch {
    pub term: Option<String>,
    #[serde(rename = "Type")]
    pub entity_types: Option<Vec<String>>,
    pub is_suspicious: Option<bool>,
    pub is_internal_asset: Option<bool>,
    pub is_enriched: Option<bool>,
    #[serde(rename = "NetworkName")]
    pub network_names: Option<Vec<String>>,
    #[serde(rename = "EnvironmentName")]
    pub environment_names: Option<Vec<String>>,
}

pub fn search_entity(search: &EntitySearch) -> ApiCall {
    ApiCall::post(
        segments(&["api", "external", "v1.0", "entity-search", "entities"]),
        json!(search),
    )
}
