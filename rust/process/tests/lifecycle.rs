//! Process lifecycle state machine behavior.

mod common;

use std::time::Duration;

use common::{Behavior, StubProcess, record_events};
use vessel_process::{Process, ProcessError, ProcessEvent, ProcessState, run};

#[tokio::test]
async fn completion_sets_exit_code_zero() {
    let process = StubProcess::new(1, Behavior::Complete);
    let events = record_events(process.core());

    run(process.clone()).await;

    let core = process.core();
    assert_eq!(core.state(), ProcessState::Completed);
    assert_eq!(core.exit_code(), Some(0));
    let (start, end) = (core.start_time(), core.end_time());
    assert!(start.is_some() && end.is_some());
    assert!(end >= start);

    let events = events.lock().expect("not poisoned");
    assert!(matches!(events[0], ProcessEvent::Start { pid: 1 }));
    assert!(matches!(
        events.last(),
        Some(ProcessEvent::Exit {
            pid: 1,
            exit_code: 0,
            ..
        })
    ));
}

#[tokio::test]
async fn failure_emits_error_then_exit() {
    let process = StubProcess::new(2, Behavior::Fail("boom".into()));
    let events = record_events(process.core());

    run(process.clone()).await;

    assert_eq!(process.core().state(), ProcessState::Failed);
    assert_eq!(process.core().exit_code(), Some(1));

    let events = events.lock().expect("not poisoned");
    let kinds: Vec<_> = events.iter().map(ProcessEvent::kind).collect();
    assert_eq!(
        kinds.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["START", "ERROR", "EXIT"]
    );
    match &events[1] {
        ProcessEvent::Error { message } => assert!(message.contains("boom")),
        other => panic!("expected error event, got {other:?}"),
    }
}

#[tokio::test]
async fn exit_code_is_absent_before_terminal_state() {
    let process = StubProcess::new(3, Behavior::Complete);
    assert_eq!(process.core().state(), ProcessState::Created);
    assert_eq!(process.core().exit_code(), None);
}

#[tokio::test]
async fn terminate_is_idempotent() {
    let process = StubProcess::new(4, Behavior::EchoInput);
    let events = record_events(process.core());

    let task = tokio::spawn(run(process.clone()));
    tokio::task::yield_now().await;

    process.terminate().await;
    process.terminate().await;
    task.await.expect("task");

    assert_eq!(process.core().state(), ProcessState::Terminated);
    assert_eq!(process.core().exit_code(), Some(-1));

    let exits = events
        .lock()
        .expect("not poisoned")
        .iter()
        .filter(|event| matches!(event, ProcessEvent::Exit { .. }))
        .count();
    assert_eq!(exits, 1, "exactly one exit event");
}

#[tokio::test(start_paused = true)]
async fn terminate_racing_completion_emits_one_exit() {
    let process = StubProcess::new(5, Behavior::Sleep(Duration::from_millis(50)));
    let events = record_events(process.core());

    let task = tokio::spawn(run(process.clone()));
    tokio::task::yield_now().await;
    process.terminate().await;
    task.await.expect("task");

    assert_eq!(process.core().state(), ProcessState::Terminated);
    assert_eq!(process.core().exit_code(), Some(-1));
    let exits = events
        .lock()
        .expect("not poisoned")
        .iter()
        .filter(|event| matches!(event, ProcessEvent::Exit { exit_code: -1, .. }))
        .count();
    assert_eq!(exits, 1);
}

#[tokio::test]
async fn terminate_before_start_is_a_no_op() {
    let process = StubProcess::new(6, Behavior::Complete);
    process.terminate().await;
    assert_eq!(process.core().state(), ProcessState::Created);
}

#[tokio::test]
async fn input_is_delivered_in_fifo_order() {
    let process = StubProcess::new(7, Behavior::EchoInput);
    let events = record_events(process.core());

    let task = tokio::spawn(run(process.clone()));
    tokio::task::yield_now().await;

    for chunk in ["a", "b", "c", "stop"] {
        process.core().write_input(chunk).expect("write input");
    }
    task.await.expect("task");

    let outputs: Vec<String> = events
        .lock()
        .expect("not poisoned")
        .iter()
        .filter_map(|event| match event {
            ProcessEvent::Message { output } => Some(output.text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(outputs, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn write_input_requires_running() {
    let process = StubProcess::new(8, Behavior::Complete);
    assert!(matches!(
        process.core().write_input("early"),
        Err(ProcessError::InvalidState { .. })
    ));

    run(process.clone()).await;
    assert!(matches!(
        process.core().write_input("late"),
        Err(ProcessError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn running_twice_does_not_reset_state() {
    let process = StubProcess::new(9, Behavior::Complete);
    run(process.clone()).await;
    let first_end = process.core().end_time();

    run(process.clone()).await;
    assert_eq!(process.core().state(), ProcessState::Completed);
    assert_eq!(process.core().end_time(), first_end);
}
