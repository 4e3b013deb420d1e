//! SOAR REST API paths, as segment lists below the base URL.

pub const EXECUTE_MANUAL_ACTION: [&str; 5] = ["api", "external", "v1", "cases", "ExecuteManualAction"];

pub const GET_SCOPES: [&str; 5] = ["api", "external", "v1", "settings", "GetScopes"];

/// OData projection applied to the instance listing.
pub const SELECT_PARAM: &str = "$select";
pub const SELECT_IDENTIFIER: &str = "identifier";

/// `/api/1p/external/v1/integrations/{integration}/integrationInstances`
pub fn integration_instances(integration: &str) -> [&str; 7] {
    [
        "api",
        "1p",
        "external",
        "v1",
        "integrations",
        integration,
        "integrationInstances",
    ]
}
