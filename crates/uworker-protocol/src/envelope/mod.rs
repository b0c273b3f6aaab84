//! Task envelopes - the request/response contract between the trusted
//! orchestrator and an untrusted worker.
//!
//! One [`UworkerInput`] per task, answered by exactly one [`UworkerOutput`].
//! Both are built once and never mutated after they are encoded.

pub mod input;
pub mod output;

pub use input::UworkerInput;
pub use output::UworkerOutput;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that is present on the wire as `Some`, including
/// an explicit `null`. Combined with `#[serde(default)]` an absent field
/// stays `None`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Entity, EntityChange, EntityKey, ErrorType, OpaquePayload, Patch};
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted() {
        let input = UworkerInput::new().with_testcase_id("T1");
        assert_eq!(serde_json::to_value(&input).unwrap(), json!({"testcase_id": "T1"}));
    }

    #[test]
    fn empty_string_is_not_absent() {
        let input = UworkerInput::new().with_fuzzer_name("");
        let back: UworkerInput =
            serde_json::from_value(serde_json::to_value(&input).unwrap()).unwrap();
        assert_eq!(back.fuzzer_name.as_deref(), Some(""));
        assert!(back.module_name.is_none());
    }

    #[test]
    fn null_env_survives_as_present() {
        let input: UworkerInput = serde_json::from_value(json!({"uworker_env": null})).unwrap();
        assert_eq!(input.uworker_env, Some(OpaquePayload::Null));

        let absent: UworkerInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.uworker_env, None);
    }

    #[test]
    fn output_error_defaults_to_no_error() {
        let out: UworkerOutput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(out.error, ErrorType::NoError);
        assert!(out.succeeded());
    }

    #[test]
    fn output_lists_present_changes() {
        let change = EntityChange::new(
            Entity::new(EntityKey::new("Testcase", "1")),
            Patch::new().with("status", "done"),
        );
        let out = UworkerOutput::new().with_variant(change);
        let names: Vec<_> = out.changes().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["variant"]);
    }

    #[test]
    fn failed_output_carries_only_error() {
        let out = UworkerOutput::failed(ErrorType::TestcaseSetup);
        assert_eq!(serde_json::to_value(&out).unwrap(), json!({"error": 3}));
    }
}
