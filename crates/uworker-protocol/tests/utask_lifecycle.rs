use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::join_all;
use tempfile::TempDir;
use uworker_protocol::{
    apply_change, diff_entity, validate_output, Entity, EntityKey, ErrorType, IoConfig,
    LocalExecutor, OpaquePayload, StoredExecutor, UTask, UworkerInput, UworkerOutput,
};
use uworker_store::FsIoStore;

type Datastore = Arc<Mutex<HashMap<String, Entity>>>;

fn datastore(ids: &[&str]) -> Datastore {
    let entities = ids
        .iter()
        .map(|id| {
            let entity = Entity::new(EntityKey::new("Testcase", *id))
                .with("status", "pending")
                .with("crash_count", 0);
            (id.to_string(), entity)
        })
        .collect();
    Arc::new(Mutex::new(entities))
}

/// Progression-like task: bumps the crash count and marks the testcase.
struct Progression {
    datastore: Datastore,
}

#[async_trait]
impl UTask for Progression {
    fn name(&self) -> &str {
        "progression"
    }

    async fn preprocess(
        &self,
        task_argument: &str,
        _job_type: &str,
        uworker_env: &OpaquePayload,
    ) -> anyhow::Result<Option<UworkerInput>> {
        let testcase = self.datastore.lock().unwrap().get(task_argument).cloned();
        Ok(testcase.map(|testcase| {
            UworkerInput::new()
                .with_testcase_id(task_argument)
                .with_testcase(testcase)
                .with_uworker_env(uworker_env.clone())
        }))
    }

    async fn uworker_main(&self, input: UworkerInput) -> anyhow::Result<UworkerOutput> {
        let base = input
            .testcase
            .ok_or_else(|| anyhow::anyhow!("input has no testcase"))?;
        let id = input.testcase_id.unwrap_or_default();
        let mutated = base
            .clone()
            .with("status", format!("processed-{id}"))
            .with("crash_count", 1);
        Ok(UworkerOutput::new().with_testcase(diff_entity(&base, &mutated)))
    }

    async fn postprocess(&self, output: UworkerOutput) -> anyhow::Result<()> {
        let Some(change) = output.testcase else {
            return Ok(());
        };
        let mut datastore = self.datastore.lock().unwrap();
        let id = change.key().id.clone();
        let merged = apply_change(&datastore[&id], &change)?;
        datastore.insert(id, merged);
        Ok(())
    }
}

#[tokio::test]
async fn concurrent_tasks_do_not_interfere() {
    let ids = ["T1", "T2", "T3", "T4"];
    let store = datastore(&ids);
    let executor = LocalExecutor::new(Progression {
        datastore: store.clone(),
    });
    let env = OpaquePayload::Null;

    let runs = ids
        .iter()
        .map(|id| executor.execute(id, "libfuzzer_asan", &env));
    let outputs = join_all(runs).await;

    for (id, output) in ids.iter().zip(outputs) {
        let output = output.unwrap().unwrap();
        let back_ref = output.uworker_input.as_deref().unwrap();
        assert_eq!(back_ref.testcase_id.as_deref(), Some(*id));
        assert_eq!(output.testcase.unwrap().key().id, *id);
    }

    let store = store.lock().unwrap();
    for id in ids {
        assert_eq!(
            store[id].get("status"),
            Some(&OpaquePayload::from(format!("processed-{id}")))
        );
        assert_eq!(store[id].get("crash_count"), Some(&OpaquePayload::from(1)));
    }
}

#[tokio::test]
async fn stored_executor_runs_on_filesystem() {
    let dir = TempDir::new().unwrap();
    let store = datastore(&["T1"]);
    let executor = StoredExecutor::new(
        Progression {
            datastore: store.clone(),
        },
        FsIoStore::new(dir.path()).unwrap(),
        IoConfig::new("io-test").unwrap(),
    );

    let paths = executor
        .preprocess("T1", "libfuzzer_asan", &OpaquePayload::Null)
        .await
        .unwrap()
        .unwrap();
    assert!(paths.input_path.starts_with("/io-test/"));

    executor.uworker_main(&paths.input_path).await.unwrap();
    let output = executor.postprocess(&paths).await.unwrap();

    assert!(validate_output(&output).is_ok());
    assert_eq!(
        store.lock().unwrap()["T1"].get("status"),
        Some(&OpaquePayload::from("processed-T1"))
    );
}

#[tokio::test]
async fn failed_output_leaves_datastore_alone() {
    struct AlwaysSetupFails;

    #[async_trait]
    impl UTask for AlwaysSetupFails {
        fn name(&self) -> &str {
            "analyze"
        }

        async fn preprocess(
            &self,
            task_argument: &str,
            _job_type: &str,
            _uworker_env: &OpaquePayload,
        ) -> anyhow::Result<Option<UworkerInput>> {
            Ok(Some(UworkerInput::new().with_testcase_id(task_argument)))
        }

        async fn uworker_main(&self, _input: UworkerInput) -> anyhow::Result<UworkerOutput> {
            Ok(UworkerOutput::failed(ErrorType::AnalyzeBuildSetup))
        }

        async fn postprocess(&self, output: UworkerOutput) -> anyhow::Result<()> {
            anyhow::ensure!(output.changes().next().is_none(), "unexpected changes");
            Ok(())
        }
    }

    let output = LocalExecutor::new(AlwaysSetupFails)
        .execute("T1", "libfuzzer_asan", &OpaquePayload::Null)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(output.error, ErrorType::AnalyzeBuildSetup);
}
