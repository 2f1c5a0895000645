use crate::*;

use gizo_client::{Error, ExecParams, Gizo, JobRequest, JobRequests, KeyPair, Priority};
use gizo_core::{ConnectionState, StateStore};

async fn connected(test: &str) -> (MockDispatcher, Gizo) {
    let dispatcher = MockDispatcher::spawn("rpc").await.unwrap();
    let state = state_path(test);
    let mut cfg = config(&state, None);
    cfg.dispatcher = Some(dispatcher.url());
    let gizo = Gizo::connect(cfg).await.unwrap();
    (dispatcher, gizo)
}

fn job_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gizo-integration-jobs-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_scalar_and_json_results_decode() {
    let (_d, gizo) = connected("facade-decode").await;

    assert_eq!(gizo.peer_count().await.unwrap(), 3);
    assert_eq!(gizo.score().await.unwrap(), 12.5);
    assert_eq!(gizo.latest_block_height().await.unwrap(), 7);
    assert_eq!(gizo.peers().await.unwrap().len(), 2);

    let version = gizo.version().await.unwrap();
    assert_eq!(version["Height"], 7);

    let block = gizo.block_by_height(5).await.unwrap();
    assert_eq!(block["Height"], 5);
    assert_eq!(block["Hash"], "ab12");

    let blocks = gizo.latest_15_blocks().await.unwrap();
    assert_eq!(blocks.len(), 2);
}

#[tokio::test]
async fn test_remote_errors_pass_through() {
    let (_d, gizo) = connected("facade-errors").await;

    let err = gizo.connection().call("Explode", vec![]).await.unwrap_err();
    match err {
        Error::RemoteProcedure { method, message } => {
            assert_eq!(method, "Explode");
            assert_eq!(message, "dispatcher exploded");
        }
        other => panic!("expected RemoteProcedure, got {other}"),
    }

    // The mock does not implement JobName.
    let err = gizo.job_name("job-1").await.unwrap_err();
    assert!(matches!(err, Error::RemoteProcedure { .. }), "{err}");
}

#[tokio::test]
async fn test_new_job_rejects_non_anko_files_locally() {
    let (d, gizo) = connected("facade-new-job-reject").await;
    let path = job_file("task.js", "print(1)");

    let err = gizo.new_job(&path, "task", false).await.unwrap_err();

    assert!(matches!(err, Error::InvalidJobFile(_)), "{err}");
    assert!(d.last_call("NewJob").is_none());
}

#[tokio::test]
async fn test_new_job_sends_source_and_private_key() {
    let (d, gizo) = connected("facade-new-job").await;
    let path = job_file("hello.ank", "func main() { return 1 }");

    let id = gizo.new_job(&path, "hello", true).await.unwrap();

    assert_eq!(id, "job-42");
    let params = d.last_call("NewJob").unwrap();
    assert_eq!(params[0], "func main() { return 1 }");
    assert_eq!(params[1], "hello");
    assert_eq!(params[2], true);
    assert_eq!(params[3], gizo.keys().private);
}

#[tokio::test]
async fn test_new_job_missing_file() {
    let (_d, gizo) = connected("facade-new-job-missing").await;
    let err = gizo.new_job("/nonexistent/job.ank", "x", false).await.unwrap_err();
    assert!(matches!(err, Error::JobFile(..)), "{err}");
}

#[tokio::test]
async fn test_new_exec_bundles_envs_as_json_string() {
    let (d, gizo) = connected("facade-new-exec").await;
    let params = ExecParams::new()
        .arg(10)
        .retries(2)
        .priority(Priority::High)
        .ttl(30)
        .env("MODE", "fast");

    let exec = gizo.new_exec(&params).await.unwrap();
    assert_eq!(exec["Status"], "QUEUED");

    let sent = d.last_call("NewExec").unwrap();
    assert_eq!(sent.len(), 9);
    assert_eq!(sent[0], json!([10]));
    assert_eq!(sent[1], 2);
    assert_eq!(sent[2], 3);
    assert!(sent[3].is_null(), "unset backoff is sent as null");
    assert_eq!(sent[6], 30);
    assert_eq!(sent[7], gizo.keys().public);
    let envs: Value = serde_json::from_str(sent[8].as_str().unwrap()).unwrap();
    assert_eq!(envs, json!([{"MODE": "fast"}]));
}

#[tokio::test]
async fn test_exec_queries_send_job_id_and_hash_bytes() {
    let (d, gizo) = connected("facade-exec").await;
    let hash = [0xde, 0xad, 0xbe, 0xef];

    assert_eq!(gizo.exec_status("job-1", &hash).await.unwrap(), "RUNNING");
    assert_eq!(gizo.exec_duration_seconds("job-1", &hash).await.unwrap(), 1.5);
    assert!(gizo.cancel_exec(&hash).await.unwrap().is_null());

    let sent = d.last_call("ExecStatus").unwrap();
    assert_eq!(sent, vec![json!("job-1"), json!([222, 173, 190, 239])]);
    assert_eq!(d.last_call("CancelExec").unwrap(), vec![json!([222, 173, 190, 239])]);
}

#[tokio::test]
async fn test_composition_sends_encoded_requests() {
    let (d, gizo) = connected("facade-compose").await;
    let requests = vec![
        JobRequests::new("job-a").exec(json!({"Priority": 1})),
        JobRequests::new("job-b").exec(json!({})).exec(json!({})),
    ];
    let callback = JobRequest::new("job-cb", json!({}));

    gizo.chord(&requests, &callback).await.unwrap();
    let sent = d.last_call("Chord").unwrap();
    let encoded = sent[0].as_array().unwrap();
    assert_eq!(encoded.len(), 2);
    let first: Value = serde_json::from_str(encoded[0].as_str().unwrap()).unwrap();
    assert_eq!(first, json!({"ID": "job-a", "Exec": [{"Priority": 1}]}));
    let cb: Value = serde_json::from_str(sent[1].as_str().unwrap()).unwrap();
    assert_eq!(cb["ID"], "job-cb");

    gizo.solo(&callback).await.unwrap();
    let solo = d.last_call("Solo").unwrap();
    assert_eq!(solo.len(), 1);
    assert!(solo[0].as_str().unwrap().contains("job-cb"));

    gizo.chain(&requests, &callback).await.unwrap();
    gizo.batch(&requests, &callback).await.unwrap();
    assert!(d.last_call("Chain").is_some());
    assert!(d.last_call("Batch").is_some());
}

#[tokio::test]
async fn test_key_pair_does_not_replace_session_keys() {
    let (d, gizo) = connected("facade-key-pair").await;
    let before = gizo.keys().clone();

    let extra = gizo.key_pair().await.unwrap();

    assert_eq!(extra.public, "rpc-pub-2");
    assert_eq!(gizo.keys(), &before);
    assert_eq!(d.key_requests(), 2);
}

/// A dispatcher that answers RPCs with HTTP 500 and a body that is not a
/// JSON-RPC response must not look like a successful null result.
#[tokio::test]
async fn test_http_error_without_rpc_error_is_not_success() {
    let stub = StubDispatcher::failing_rpc().await.unwrap();
    let state = state_path("facade-http-500");
    StateStore::new(&state)
        .save(&ConnectionState {
            dispatcher: stub.url(),
            keys: Some(KeyPair {
                public: "pub".into(),
                private: "priv".into(),
            }),
        })
        .unwrap();
    let gizo = Gizo::connect(config(&state, None)).await.unwrap();

    let err = gizo.cancel_exec(&[1, 2]).await.unwrap_err();
    match err {
        Error::InvalidResponse { context, reason } => {
            assert_eq!(context, "CancelExec");
            assert!(reason.contains("500"), "{reason}");
        }
        other => panic!("expected InvalidResponse, got {other}"),
    }

    let err = gizo
        .solo(&JobRequest::new("job-1", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse { .. }), "{err}");
}

#[tokio::test]
async fn test_latest_exec_null_is_distinct_from_failure() {
    let (_d, gizo) = connected("facade-latest-exec").await;

    let latest = gizo.job_latest_exec("job-42").await.unwrap();
    assert_eq!(latest["Status"], "FINISHED");

    assert!(gizo.job_latest_exec("job-empty").await.unwrap().is_null());

    // JobExecs is not served by the mock and must fail rather than read as empty.
    let err = gizo.job_execs("job-42").await.unwrap_err();
    assert!(matches!(err, Error::RemoteProcedure { .. }), "{err}");
}
