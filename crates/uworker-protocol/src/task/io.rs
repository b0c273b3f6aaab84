//! Moving envelopes through an [`IoStore`].

use uworker_store::IoStore;

use crate::codec::{self, Envelope};
use crate::config::IoConfig;
use crate::envelope::{UworkerInput, UworkerOutput};
use crate::error::{ProtocolError, Result};
use crate::obs;

/// A fresh, random, lowercase I/O file name.
pub fn generate_io_file_name() -> String {
    uuid::Uuid::new_v4().to_string().to_lowercase()
}

/// A new `/<bucket>/<name>` path not yet used in `store`.
pub async fn new_io_path(store: &dyn IoStore, config: &IoConfig) -> Result<String> {
    let path = format!("/{}/{}", config.bucket, generate_io_file_name());
    if store.exists(&path).await? {
        return Err(ProtocolError::PathCollision { path });
    }
    Ok(path)
}

/// Reject an envelope that JSON cannot carry faithfully.
pub(crate) fn ensure_finite<E: Envelope>(envelope: &E) -> Result<()> {
    if envelope.is_finite() {
        Ok(())
    } else {
        Err(ProtocolError::NonFiniteFloat { kind: E::KIND })
    }
}

async fn upload<E: Envelope>(store: &dyn IoStore, path: &str, envelope: &E) -> Result<()> {
    ensure_finite(envelope)?;
    let bytes = codec::encode(envelope);
    store.put(path, &bytes).await?;
    obs::emit_envelope_uploaded(E::KIND, path, bytes.len(), &codec::digest(&bytes));
    Ok(())
}

async fn download<E: Envelope>(store: &dyn IoStore, path: &str) -> Result<E> {
    let bytes = store.get(path).await?;
    let envelope = codec::decode::<E>(&bytes).inspect_err(|e| obs::emit_decode_failed(E::KIND, e))?;
    obs::emit_envelope_downloaded(E::KIND, path, bytes.len());
    Ok(envelope)
}

/// Store an input at a fresh path and return that path.
pub async fn upload_input(
    store: &dyn IoStore,
    config: &IoConfig,
    input: &UworkerInput,
) -> Result<String> {
    let path = new_io_path(store, config).await?;
    upload(store, &path, input).await?;
    Ok(path)
}

/// Fill in the dispatch fields of `input`, then store it.
///
/// # Errors
///
/// `ProtocolError::FieldAlreadySet` if the task logic already set
/// `job_type` or `uworker_output_upload_url`; those belong to the I/O layer.
pub async fn serialize_and_upload_input(
    store: &dyn IoStore,
    config: &IoConfig,
    mut input: UworkerInput,
    job_type: &str,
    output_upload_url: &str,
) -> Result<String> {
    claim_dispatch_fields(&mut input, job_type, Some(output_upload_url))?;
    upload_input(store, config, &input).await
}

/// Set the fields owned by the dispatch layer on a freshly preprocessed
/// input. In-memory execution has no output url and passes `None`.
pub(crate) fn claim_dispatch_fields(
    input: &mut UworkerInput,
    job_type: &str,
    output_upload_url: Option<&str>,
) -> Result<()> {
    if input.job_type.is_some() {
        return Err(ProtocolError::FieldAlreadySet { field: "job_type" });
    }
    if input.uworker_output_upload_url.is_some() {
        return Err(ProtocolError::FieldAlreadySet {
            field: "uworker_output_upload_url",
        });
    }
    input.job_type = Some(job_type.to_string());
    input.uworker_output_upload_url = output_upload_url.map(str::to_string);
    Ok(())
}

pub async fn download_and_deserialize_input(
    store: &dyn IoStore,
    path: &str,
) -> Result<UworkerInput> {
    download(store, path).await
}

pub async fn serialize_and_upload_output(
    store: &dyn IoStore,
    output: &UworkerOutput,
    upload_url: &str,
) -> Result<()> {
    upload(store, upload_url, output).await
}

pub async fn download_and_deserialize_output(
    store: &dyn IoStore,
    path: &str,
) -> Result<UworkerOutput> {
    download(store, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use uworker_store::{MemoryIoStore, StoreResult};

    const OUTPUT_URL: &str = "/uworker-io/output";

    struct AlwaysExists;

    #[async_trait]
    impl IoStore for AlwaysExists {
        async fn put(&self, _path: &str, _data: &[u8]) -> StoreResult<()> {
            Ok(())
        }
        async fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
            Err(uworker_store::StoreError::NotFound {
                path: path.to_string(),
            })
        }
        async fn exists(&self, _path: &str) -> StoreResult<bool> {
            Ok(true)
        }
    }

    #[test]
    fn io_file_names_are_lowercase_uuids() {
        let name = generate_io_file_name();
        assert_eq!(name.len(), 36);
        assert_eq!(name, name.to_lowercase());
        assert_ne!(name, generate_io_file_name());
    }

    #[tokio::test]
    async fn io_path_uses_bucket() {
        let store = MemoryIoStore::new();
        let config = IoConfig::new("UWORKER_IO").unwrap();
        let path = new_io_path(&store, &config).await.unwrap();
        assert!(path.starts_with("/UWORKER_IO/"));
    }

    #[tokio::test]
    async fn collision_is_an_error() {
        let err = new_io_path(&AlwaysExists, &IoConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::PathCollision { .. }));
    }

    #[tokio::test]
    async fn upload_sets_dispatch_fields() {
        let store = MemoryIoStore::new();
        let config = IoConfig::default();
        let input = UworkerInput::new().with_testcase_id("testcase-id");

        let path = serialize_and_upload_input(&store, &config, input, "libfuzzer_asan", OUTPUT_URL)
            .await
            .unwrap();
        let back = download_and_deserialize_input(&store, &path).await.unwrap();

        assert_eq!(back.job_type.as_deref(), Some("libfuzzer_asan"));
        assert_eq!(back.uworker_output_upload_url.as_deref(), Some(OUTPUT_URL));
        assert_eq!(back.testcase_id.as_deref(), Some("testcase-id"));
    }

    #[tokio::test]
    async fn upload_refuses_preset_job_type() {
        let store = MemoryIoStore::new();
        let input = UworkerInput::new().with_job_type("already");
        let err = serialize_and_upload_input(&store, &IoConfig::default(), input, "j", OUTPUT_URL)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::FieldAlreadySet { field: "job_type" }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn upload_refuses_preset_output_url() {
        let store = MemoryIoStore::new();
        let input = UworkerInput::new().with_output_upload_url("/x/y");
        let err = serialize_and_upload_input(&store, &IoConfig::default(), input, "j", OUTPUT_URL)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::FieldAlreadySet {
                field: "uworker_output_upload_url"
            }
        ));
    }

    #[tokio::test]
    async fn output_round_trips_through_store() {
        let store = MemoryIoStore::new();
        let output = UworkerOutput::new().with_test_timeout(25.0);
        serialize_and_upload_output(&store, &output, OUTPUT_URL).await.unwrap();
        let back = download_and_deserialize_output(&store, OUTPUT_URL).await.unwrap();
        assert_eq!(back, output);
    }

    #[tokio::test]
    async fn non_finite_output_is_not_stored() {
        let store = MemoryIoStore::new();
        let output = UworkerOutput::new().with_crash_time(f64::NAN);
        let err = serialize_and_upload_output(&store, &output, OUTPUT_URL)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::NonFiniteFloat { kind: "output" }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn corrupt_blob_is_decode_error() {
        let store = MemoryIoStore::new();
        store.put(OUTPUT_URL, b"\x00garbage").await.unwrap();
        let err = download_and_deserialize_output(&store, OUTPUT_URL).await.unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }
}
