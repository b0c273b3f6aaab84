use serde::{Deserialize, Serialize};

use crate::domain::{Entity, OpaquePayload};

/// Everything an untrusted worker needs to run one task.
///
/// Every field is independently optional. An absent field is omitted from
/// the wire form and decodes back as `None`; `Some("")` stays `Some("")`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UworkerInput {
    /// Target entity snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testcase: Option<Entity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testcase_upload_metadata: Option<Entity>,

    /// Identifier used when the snapshot is fetched separately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testcase_id: Option<String>,

    /// Environment map. A payload of `null` is kept as `Some(Null)`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::present"
    )]
    pub uworker_env: Option<OpaquePayload>,

    /// Alternative to embedding `testcase`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testcase_download_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,

    /// Where the output envelope goes. Only the I/O layer reads this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uworker_output_upload_url: Option<String>,

    /// Snapshot used for variant analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Entity>,

    /// Job type before substitution, when `job_type` was replaced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_job_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzer_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
}

impl UworkerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_testcase(mut self, testcase: Entity) -> Self {
        self.testcase = Some(testcase);
        self
    }

    pub fn with_testcase_upload_metadata(mut self, metadata: Entity) -> Self {
        self.testcase_upload_metadata = Some(metadata);
        self
    }

    pub fn with_testcase_id(mut self, id: impl Into<String>) -> Self {
        self.testcase_id = Some(id.into());
        self
    }

    pub fn with_uworker_env(mut self, env: OpaquePayload) -> Self {
        self.uworker_env = Some(env);
        self
    }

    pub fn with_testcase_download_url(mut self, url: impl Into<String>) -> Self {
        self.testcase_download_url = Some(url.into());
        self
    }

    pub fn with_job_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = Some(job_type.into());
        self
    }

    pub fn with_output_upload_url(mut self, url: impl Into<String>) -> Self {
        self.uworker_output_upload_url = Some(url.into());
        self
    }

    pub fn with_variant(mut self, variant: Entity) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_original_job_type(mut self, job_type: impl Into<String>) -> Self {
        self.original_job_type = Some(job_type.into());
        self
    }

    pub fn with_fuzzer_name(mut self, name: impl Into<String>) -> Self {
        self.fuzzer_name = Some(name.into());
        self
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    /// False if any entity or environment value holds a NaN or infinite float.
    pub fn is_finite(&self) -> bool {
        [&self.testcase, &self.testcase_upload_metadata, &self.variant]
            .into_iter()
            .flatten()
            .all(Entity::is_finite)
            && self.uworker_env.as_ref().map_or(true, OpaquePayload::is_finite)
    }
}
