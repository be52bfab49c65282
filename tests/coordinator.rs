//! End-to-end tests over the coordinator core, without the HTTP layer.

use std::sync::Arc;

use limpet::server::coordinator::Coordinator;
use limpet::server::error::CoordinatorError;
use limpet::server::tasks::TaskStatus;

async fn register_test_agent(coordinator: &Coordinator) -> String {
    coordinator
        .register_agent(
            "DESKTOP-X\\user".to_string(),
            "Windows 10.0".to_string(),
            "127.0.0.1:50000".to_string(),
        )
        .await
        .id
}

#[tokio::test]
async fn fresh_agent_beacons_empty() {
    let coordinator = Coordinator::new();
    let agent_id = register_test_agent(&coordinator).await;

    let deliveries = coordinator.beacon(&agent_id).await.unwrap();
    assert!(deliveries.is_empty());
}

#[tokio::test]
async fn beacon_for_unknown_agent_is_not_found() {
    let coordinator = Coordinator::new();
    let err = coordinator.beacon("agent_ghost").await.unwrap_err();
    assert!(matches!(err, CoordinatorError::NotFound(_)));
}

#[tokio::test]
async fn enqueued_command_is_delivered_once_with_catalog_string() {
    let coordinator = Coordinator::new();
    let agent_id = register_test_agent(&coordinator).await;

    let task = coordinator.enqueue_command(&agent_id, "whoami").await.unwrap();

    let deliveries = coordinator.beacon(&agent_id).await.unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].task_id, task.id);
    assert_eq!(deliveries[0].command, "whoami /all");

    // No re-delivery without an intervening enqueue.
    let again = coordinator.beacon(&agent_id).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn result_lifecycle_and_idempotency_rules() {
    let coordinator = Coordinator::new();
    let agent_id = register_test_agent(&coordinator).await;

    let task = coordinator.enqueue_command(&agent_id, "whoami").await.unwrap();

    // A result cannot precede dispatch.
    let err = coordinator
        .submit_result(&task.id, &agent_id, "early".to_string(), "success".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::InvalidState(_)));

    // An unknown task is not found.
    let err = coordinator
        .submit_result("task_ghost", &agent_id, "out".to_string(), "success".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::NotFound(_)));

    coordinator.beacon(&agent_id).await.unwrap();

    coordinator
        .submit_result(
            &task.id,
            &agent_id,
            "DESKTOP-X\\user".to_string(),
            "success".to_string(),
        )
        .await
        .unwrap();

    // A second submission is rejected, not overwritten.
    let err = coordinator
        .submit_result(&task.id, &agent_id, "late".to_string(), "success".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::Conflict(_)));

    let stored = coordinator.get_result(&task.id).await.unwrap();
    assert_eq!(stored.output, "DESKTOP-X\\user");
}

#[tokio::test]
async fn full_tasking_scenario() {
    let coordinator = Coordinator::new();
    let agent_id = register_test_agent(&coordinator).await;

    let task = coordinator.enqueue_command(&agent_id, "whoami").await.unwrap();
    assert_eq!(task.command, "whoami /all");

    let deliveries = coordinator.beacon(&agent_id).await.unwrap();
    assert_eq!(deliveries.len(), 1);

    coordinator
        .submit_result(
            &task.id,
            &agent_id,
            "DESKTOP-X\\user".to_string(),
            "success".to_string(),
        )
        .await
        .unwrap();

    let detail = coordinator.agent_detail(&agent_id).await.unwrap();
    assert_eq!(detail.tasks.len(), 1);

    let (joined_task, joined_result) = &detail.tasks[0];
    assert_eq!(joined_task.id, task.id);
    assert_eq!(joined_task.status, TaskStatus::Completed);
    assert_eq!(joined_result.as_ref().unwrap().output, "DESKTOP-X\\user");

    let again = coordinator.beacon(&agent_id).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn agent_detail_lists_tasks_most_recent_first() {
    let coordinator = Coordinator::new();
    let agent_id = register_test_agent(&coordinator).await;

    let first = coordinator.enqueue_command(&agent_id, "dir").await.unwrap();
    let second = coordinator.enqueue_command(&agent_id, "tasklist").await.unwrap();

    let detail = coordinator.agent_detail(&agent_id).await.unwrap();
    assert_eq!(detail.tasks[0].0.id, second.id);
    assert_eq!(detail.tasks[1].0.id, first.id);
}

#[tokio::test]
async fn concurrent_enqueues_mint_distinct_tasks() {
    let coordinator = Arc::new(Coordinator::new());
    let agent_id = register_test_agent(&coordinator).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let coordinator = Arc::clone(&coordinator);
        let agent_id = agent_id.to_owned();
        handles.push(tokio::spawn(async move {
            coordinator.enqueue_command(&agent_id, "dir").await.unwrap().id
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 10);

    let detail = coordinator.agent_detail(&agent_id).await.unwrap();
    assert_eq!(detail.tasks.len(), 10);
}

#[tokio::test]
async fn concurrent_beacons_never_deliver_a_task_twice() {
    let coordinator = Arc::new(Coordinator::new());
    let agent_id = register_test_agent(&coordinator).await;

    let first = coordinator.enqueue_command(&agent_id, "dir").await.unwrap();
    let second = coordinator.enqueue_command(&agent_id, "tasklist").await.unwrap();

    let handle_a = {
        let coordinator = Arc::clone(&coordinator);
        let agent_id = agent_id.to_owned();
        tokio::spawn(async move { coordinator.beacon(&agent_id).await.unwrap() })
    };
    let handle_b = {
        let coordinator = Arc::clone(&coordinator);
        let agent_id = agent_id.to_owned();
        tokio::spawn(async move { coordinator.beacon(&agent_id).await.unwrap() })
    };

    let mut delivered: Vec<String> = Vec::new();
    delivered.extend(handle_a.await.unwrap().into_iter().map(|d| d.task_id));
    delivered.extend(handle_b.await.unwrap().into_iter().map(|d| d.task_id));

    delivered.sort();
    let mut expected = vec![first.id, second.id];
    expected.sort();

    // Both tasks delivered exactly once between the two beacons.
    assert_eq!(delivered, expected);
}

#[tokio::test]
async fn unknown_result_is_not_found() {
    let coordinator = Coordinator::new();
    let err = coordinator.get_result("task_ghost").await.unwrap_err();
    assert!(matches!(err, CoordinatorError::NotFound(_)));
}

#[tokio::test]
async fn enqueue_rejects_raw_command_strings() {
    let coordinator = Coordinator::new();
    let agent_id = register_test_agent(&coordinator).await;

    let err = coordinator
        .enqueue_command(&agent_id, "powershell -enc ...")
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::UnknownCommand(_)));
}
