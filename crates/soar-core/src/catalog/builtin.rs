//! Catalogs compiled into the binary.

pub(super) const CATALOGS: [(&str, &str); 5] = [
    (
        "crowdstrikefalcon.yaml",
        include_str!("../../catalog/crowdstrikefalcon.yaml"),
    ),
    ("endgame.yaml", include_str!("../../catalog/endgame.yaml")),
    (
        "microsoftgraphmail.yaml",
        include_str!("../../catalog/microsoftgraphmail.yaml"),
    ),
    ("servicenow.yaml", include_str!("../../catalog/servicenow.yaml")),
    ("slack.yaml", include_str!("../../catalog/slack.yaml")),
];
