use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Rules written by the user via the config file.
pub const SOURCE_USER_MANUAL: &str = "user_manual";
/// Rules written by the scan pipeline after a positive malware verdict.
pub const SOURCE_AI_MALWARE: &str = "ai_malware";
/// Rules written by the scan pipeline after a positive adware verdict.
pub const SOURCE_AI_ADWARE: &str = "ai_adware";

/// What to do with traffic towards a domain.
///
/// Stored in SQLite as the upper-case strings `BLOCK` / `ALLOW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleAction {
    Block,
    Allow,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Block => "BLOCK",
            RuleAction::Allow => "ALLOW",
        }
    }

    /// Parse the persisted representation. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BLOCK" => Some(RuleAction::Block),
            "ALLOW" => Some(RuleAction::Allow),
            _ => None,
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted filtering rule. One row per domain; the domain is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub domain: Arc<str>,
    pub action: RuleAction,
    pub source: Arc<str>,
    pub created_at: Option<String>,
    /// Unix epoch second of the last sync run that touched this rule.
    pub updated_at: Option<i64>,
}

/// One record streamed out of a blocklist feed parser towards the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub domain: String,
    pub action: RuleAction,
    pub source: Arc<str>,
}

impl FeedEntry {
    pub fn blocked(domain: String, source: Arc<str>) -> Self {
        Self {
            domain,
            action: RuleAction::Block,
            source,
        }
    }
}
