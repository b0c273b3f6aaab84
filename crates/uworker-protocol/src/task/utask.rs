//! Untrusted task lifecycle: preprocess → uworker main → postprocess.
//!
//! Preprocess and postprocess run on the trusted side and own the entity
//! store; `uworker_main` only ever sees the decoded input envelope and only
//! reports back through the output envelope. Every hop goes through the
//! codec, even in memory, so the worker never shares state with the
//! orchestrator.

use async_trait::async_trait;
use tracing::Instrument;
use uworker_store::IoStore;

use super::io;
use crate::codec;
use crate::config::IoConfig;
use crate::domain::{ErrorType, OpaquePayload};
use crate::envelope::{UworkerInput, UworkerOutput};
use crate::error::{ProtocolError, Result};
use crate::obs;

/// One untrusted task, split into its three phases.
#[async_trait]
pub trait UTask: Send + Sync {
    /// Command name, e.g. `"analyze"`.
    fn name(&self) -> &str;

    /// Build the input envelope. `Ok(None)` means there is nothing to do.
    async fn preprocess(
        &self,
        task_argument: &str,
        job_type: &str,
        uworker_env: &OpaquePayload,
    ) -> anyhow::Result<Option<UworkerInput>>;

    /// Run the untrusted work. Known failures are returned as an output
    /// with a non-`NoError` error type; `Err` is reported as `Unhandled`.
    async fn uworker_main(&self, input: UworkerInput) -> anyhow::Result<UworkerOutput>;

    /// Merge the results. `output.uworker_input` holds the trusted copy of
    /// the input that produced it.
    async fn postprocess(&self, output: UworkerOutput) -> anyhow::Result<()>;
}

/// Run main, folding an uncategorized failure into an `Unhandled` output.
/// An output that cannot be encoded faithfully counts as such a failure.
async fn run_main<T: UTask + ?Sized>(task: &T, input: UworkerInput) -> UworkerOutput {
    match task.uworker_main(input).await {
        Ok(output) if output.is_finite() => output,
        Ok(_) => {
            let e = ProtocolError::NonFiniteFloat { kind: "output" };
            obs::emit_worker_failure(task.name(), &e);
            UworkerOutput::failed(ErrorType::Unhandled)
        }
        Err(e) => {
            obs::emit_worker_failure(task.name(), &e);
            UworkerOutput::failed(ErrorType::Unhandled)
        }
    }
}

/// Validate the output and hand it to postprocess with the trusted input
/// attached as back-reference.
async fn finish<T: UTask + ?Sized>(
    task: &T,
    mut output: UworkerOutput,
    trusted_input: UworkerInput,
) -> Result<UworkerOutput> {
    output
        .validate()
        .inspect_err(|e| obs::emit_validation_failed(e))?;

    output.uworker_input = Some(Box::new(trusted_input));
    task.postprocess(output.clone()).await?;
    obs::emit_task_finished(task.name(), output.error);
    Ok(output)
}

/// Executes all three phases on this machine, in memory.
pub struct LocalExecutor<T> {
    task: T,
}

impl<T: UTask> LocalExecutor<T> {
    pub fn new(task: T) -> Self {
        Self { task }
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    /// Run the task. Returns the output handed to postprocess, or `None`
    /// when preprocess had nothing to do.
    pub async fn execute(
        &self,
        task_argument: &str,
        job_type: &str,
        uworker_env: &OpaquePayload,
    ) -> Result<Option<UworkerOutput>> {
        self.run(task_argument, job_type, uworker_env)
            .instrument(obs::task_span(self.task.name(), job_type))
            .await
    }

    async fn run(
        &self,
        task_argument: &str,
        job_type: &str,
        uworker_env: &OpaquePayload,
    ) -> Result<Option<UworkerOutput>> {
        let Some(mut input) = self
            .task
            .preprocess(task_argument, job_type, uworker_env)
            .await?
        else {
            obs::emit_preprocess_skipped(self.task.name());
            return Ok(None);
        };
        io::claim_dispatch_fields(&mut input, job_type, None)?;
        io::ensure_finite(&input)?;

        let worker_input = codec::decode_input(&codec::encode_input(&input))?;
        let output = run_main(&self.task, worker_input).await;
        let output = codec::decode_output(&codec::encode_output(&output))?;

        finish(&self.task, output, input).await.map(Some)
    }
}

/// Paths produced by a stored preprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessResult {
    /// Where the input envelope was written.
    pub input_path: String,
    /// Where the worker must write the output envelope.
    pub output_path: String,
}

/// Executes phases against an [`IoStore`], so each phase can run on a
/// different machine.
pub struct StoredExecutor<T, S> {
    task: T,
    store: S,
    config: IoConfig,
}

impl<T: UTask, S: IoStore> StoredExecutor<T, S> {
    pub fn new(task: T, store: S, config: IoConfig) -> Self {
        Self {
            task,
            store,
            config,
        }
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Trusted phase 1: build and store the input.
    pub async fn preprocess(
        &self,
        task_argument: &str,
        job_type: &str,
        uworker_env: &OpaquePayload,
    ) -> Result<Option<PreprocessResult>> {
        let Some(input) = self
            .task
            .preprocess(task_argument, job_type, uworker_env)
            .await?
        else {
            obs::emit_preprocess_skipped(self.task.name());
            return Ok(None);
        };

        let output_path = io::new_io_path(&self.store, &self.config).await?;
        let input_path =
            io::serialize_and_upload_input(&self.store, &self.config, input, job_type, &output_path)
                .await?;

        Ok(Some(PreprocessResult {
            input_path,
            output_path,
        }))
    }

    /// Untrusted phase: run main from the stored input and store the output
    /// where the input says.
    pub async fn uworker_main(&self, input_path: &str) -> Result<()> {
        let input = io::download_and_deserialize_input(&self.store, input_path).await?;
        let upload_url = input
            .uworker_output_upload_url
            .clone()
            .ok_or(ProtocolError::MissingOutputUploadUrl)?;

        let output = run_main(&self.task, input).await;
        io::serialize_and_upload_output(&self.store, &output, &upload_url).await
    }

    /// Trusted phase 2: fetch, validate and postprocess the output.
    pub async fn postprocess(&self, paths: &PreprocessResult) -> Result<UworkerOutput> {
        let input = io::download_and_deserialize_input(&self.store, &paths.input_path).await?;
        let output = io::download_and_deserialize_output(&self.store, &paths.output_path).await?;
        finish(&self.task, output, input).await
    }

    /// Preprocess, main and postprocess in sequence on this machine.
    pub async fn execute(
        &self,
        task_argument: &str,
        job_type: &str,
        uworker_env: &OpaquePayload,
    ) -> Result<Option<UworkerOutput>> {
        self.run(task_argument, job_type, uworker_env)
            .instrument(obs::task_span(self.task.name(), job_type))
            .await
    }

    async fn run(
        &self,
        task_argument: &str,
        job_type: &str,
        uworker_env: &OpaquePayload,
    ) -> Result<Option<UworkerOutput>> {
        let Some(paths) = self.preprocess(task_argument, job_type, uworker_env).await? else {
            return Ok(None);
        };
        self.uworker_main(&paths.input_path).await?;
        self.postprocess(&paths).await.map(Some)
    }
}
