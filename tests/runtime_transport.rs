// tests/runtime_transport.rs

use std::error::Error;

use serde_json::json;
use tokio::sync::mpsc;

use dagbisect::engine::{CoreSession, Runtime, SearchParams};
use dagbisect::errors::BisectError;
use dagbisect::protocol::Credentials;
use dagbisect::transport::LocalTransport;
use dagbisect_test_utils::builders::{DagBuilder, diamond};
use dagbisect_test_utils::scripted_transport::ScriptedTransport;
use dagbisect_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn chain_dag() -> serde_json::Value {
    json!([["A", []], ["B", ["A"]], ["C", ["B"]], ["D", ["C"]]])
}

fn runtime<T: dagbisect::transport::Transport>(transport: T) -> Runtime<T> {
    Runtime::new(
        CoreSession::new(SearchParams::default()),
        transport,
        Credentials::new("abc12", Some("tok".to_string())),
    )
}

#[tokio::test]
async fn scripted_session_sends_questions_and_solution() -> TestResult {
    init_tracing();

    let transport = ScriptedTransport::from_json(vec![
        json!({"Repo": {"name": "pb0", "instance_count": 1, "dag": chain_dag()}}),
        json!({"Instance": {"good": "A", "bad": "D"}}),
        json!({"Answer": "Bad"}),
        json!({"Answer": "Good"}),
        json!({"Score": {"pb0": [2]}}),
        // Never read: the score ends the session.
        json!({"Answer": "Good"}),
    ]);
    let sent = transport.sent();
    let closed = transport.closed();

    let stats = with_timeout(runtime(transport).run()).await?;

    assert_eq!(
        *sent.lock().unwrap(),
        vec![
            r#"{"User":["abc12","tok"]}"#,
            r#"{"Question":"C"}"#,
            r#"{"Question":"B"}"#,
            r#"{"Solution":"C"}"#,
        ]
    );
    assert!(*closed.lock().unwrap());
    assert_eq!(stats.questions_per_instance, vec![2]);
    Ok(())
}

#[tokio::test]
async fn legacy_problem_message_is_supported() -> TestResult {
    let transport = ScriptedTransport::from_json(vec![
        json!({"Problem": {"good": "A", "bad": "D", "dag": chain_dag()}}),
        json!({"Answer": "Good"}),
    ]);
    let sent = transport.sent();

    // The oracle hangs up without a score; that still ends cleanly.
    let stats = with_timeout(runtime(transport).run()).await?;

    assert_eq!(
        sent.lock().unwrap()[1..],
        [r#"{"Question":"C"}"#, r#"{"Solution":"D"}"#]
    );
    assert_eq!(stats.instances_solved(), 1);
    Ok(())
}

#[tokio::test]
async fn shutdown_closes_the_transport_and_keeps_stats() -> TestResult {
    let transport = ScriptedTransport::from_json(vec![
        json!({"Repo": {"name": "pb0", "dag": chain_dag()}}),
        json!({"Instance": {"good": "A", "bad": "D"}}),
    ])
    .hold_open();
    let sent = transport.sent();
    let closed = transport.closed();

    let (stop_tx, stop_rx) = mpsc::channel(1);
    let session = tokio::spawn(runtime(transport).with_shutdown(stop_rx).run());

    // Wait for the first question, then interrupt while the answer is pending.
    with_timeout(async {
        loop {
            let count = sent.lock().unwrap().len();
            if count == 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
    })
    .await;
    stop_tx.send(()).await?;

    let stats = with_timeout(session).await??;

    assert!(*closed.lock().unwrap());
    assert_eq!(sent.lock().unwrap()[1], r#"{"Question":"C"}"#);
    assert_eq!(stats.repositories, 1);
    assert_eq!(stats.instances_solved(), 0);
    Ok(())
}

#[tokio::test]
async fn dropped_shutdown_sender_is_ignored() -> TestResult {
    let transport = ScriptedTransport::from_json(vec![
        json!({"Repo": {"name": "pb0", "dag": chain_dag()}}),
        json!({"Instance": {"good": "A", "bad": "C"}}),
        json!({"Answer": "Good"}),
        json!({"Score": {}}),
    ]);
    let (stop_tx, stop_rx) = mpsc::channel::<()>(1);
    drop(stop_tx);

    let stats = with_timeout(runtime(transport).with_shutdown(stop_rx).run()).await?;

    assert_eq!(stats.questions_per_instance, vec![1]);
    Ok(())
}

#[tokio::test]
async fn protocol_violation_aborts_and_closes() {
    let transport =
        ScriptedTransport::from_json(vec![json!({"Instance": {"good": "A", "bad": "D"}})]);
    let sent = transport.sent();
    let closed = transport.closed();

    let result = with_timeout(runtime(transport).run()).await;

    assert!(matches!(result, Err(BisectError::Protocol(_))));
    assert_eq!(sent.lock().unwrap().len(), 1);
    assert!(*closed.lock().unwrap());
}

#[tokio::test]
async fn undecodable_frame_aborts() {
    let transport = ScriptedTransport::new(["{\"Answer\":"]);
    let closed = transport.closed();

    let result = with_timeout(runtime(transport).run()).await;

    assert!(matches!(result, Err(BisectError::Protocol(_))));
    assert!(*closed.lock().unwrap());
}

#[tokio::test]
async fn local_transport_drives_a_full_run() -> TestResult {
    init_tracing();

    for split in [true, false] {
        for culprit in ["B", "C", "D"] {
            let transport = LocalTransport::new(diamond().problem("A", "D"), culprit, split)?;
            let report = transport.report();

            let stats = with_timeout(runtime(transport).run()).await?;

            let report = report.lock().unwrap().clone();
            assert_eq!(report.user.as_deref(), Some("abc12"));
            assert_eq!(report.solution.as_deref(), Some(culprit));
            assert_eq!(stats.total_questions(), report.questions.len());
            assert_eq!(stats.repositories, 1);
        }
    }
    Ok(())
}

#[tokio::test]
async fn local_transport_on_long_history() -> TestResult {
    let problem = DagBuilder::numbered_chain(3000).problem("n0", "n2999");
    let transport = LocalTransport::new(problem, "n1234", true)?;
    let report = transport.report();

    let core = CoreSession::new(SearchParams {
        threshold: 500,
        batch: 8,
        validate_repository: true,
    });
    let runtime = Runtime::new(core, transport, Credentials::new("u", None));
    let stats = with_timeout(runtime.run()).await?;

    assert_eq!(report.lock().unwrap().solution.as_deref(), Some("n1234"));
    assert_eq!(stats.instances_solved(), 1);
    Ok(())
}
