//! Push notification payload.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Prefix forges put in front of a branch name in the `ref` field.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// The part of a push notification the dispatcher cares about.
///
/// Forges send many more fields; they are ignored. Events that carry no
/// `ref` at all (e.g. `ping`) deserialize with an empty reference. Only a
/// JSON object is accepted: arrays, scalars and `null` are errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl<'de> Deserialize<'de> for PushEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PushEventVisitor)
    }
}

struct PushEventVisitor;

impl<'de> Visitor<'de> for PushEventVisitor {
    type Value = PushEvent;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a push event object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<PushEvent, A::Error> {
        let mut git_ref: Option<String> = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "ref" {
                if git_ref.is_some() {
                    return Err(de::Error::duplicate_field("ref"));
                }
                git_ref = Some(map.next_value()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(PushEvent {
            git_ref: git_ref.unwrap_or_default(),
        })
    }
}

impl PushEvent {
    pub fn new(git_ref: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
        }
    }

    /// Parse a push event from the raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Exact, case-sensitive comparison against `refs/heads/{branch}`.
    pub fn targets_branch(&self, branch: &str) -> bool {
        self.git_ref
            .strip_prefix(BRANCH_REF_PREFIX)
            .is_some_and(|name| name == branch)
    }
}

/// Build the full reference for a branch name.
pub fn branch_ref(branch: &str) -> String {
    format!("{BRANCH_REF_PREFIX}{branch}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_ref_and_ignores_other_fields() {
        let body = br#"{"ref":"refs/heads/main","before":"abc","repository":{"full_name":"org/repo"}}"#;
        let event = PushEvent::from_slice(body).unwrap();
        assert_eq!(event.git_ref, "refs/heads/main");
    }

    #[test]
    fn test_missing_ref_is_empty() {
        let event = PushEvent::from_slice(br#"{"zen":"Keep it logically awesome."}"#).unwrap();
        assert_eq!(event, PushEvent::default());
        assert!(!event.targets_branch(""));
        assert!(!event.targets_branch("main"));
    }

    #[test]
    fn test_non_string_ref_is_rejected() {
        assert!(PushEvent::from_slice(br#"{"ref":42}"#).is_err());
        assert!(PushEvent::from_slice(b"{not json").is_err());
        assert!(PushEvent::from_slice(br#"{"ref":"refs/heads/a","ref":"refs/heads/b"}"#).is_err());
    }

    #[test]
    fn test_non_object_bodies_are_rejected() {
        for body in [
            &b"[]"[..],
            br#"["refs/heads/main"]"#,
            b"null",
            b"42",
            b"true",
            br#""refs/heads/main""#,
        ] {
            assert!(
                PushEvent::from_slice(body).is_err(),
                "{:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_serializes_under_ref_key() {
        let json = serde_json::to_string(&PushEvent::new("refs/heads/main")).unwrap();
        assert_eq!(json, r#"{"ref":"refs/heads/main"}"#);
        assert_eq!(
            PushEvent::from_slice(json.as_bytes()).unwrap(),
            PushEvent::new("refs/heads/main")
        );
    }

    #[test]
    fn test_branch_match_is_exact() {
        let event = PushEvent::new("refs/heads/main");
        assert!(event.targets_branch("main"));
        assert!(!event.targets_branch("Main"));
        assert!(!event.targets_branch("mai"));
        assert!(!PushEvent::new("refs/heads/main2").targets_branch("main"));
        assert!(!PushEvent::new("refs/tags/main").targets_branch("main"));
        assert!(!PushEvent::new("main").targets_branch("main"));
    }

    #[test]
    fn test_branch_ref() {
        assert_eq!(branch_ref("release/1.x"), "refs/heads/release/1.x");
        assert!(PushEvent::new(branch_ref("release/1.x")).targets_branch("release/1.x"));
    }
}
