use std::time::Duration;
use tilegrab::capture_events::*;
use tokio::time::timeout;
use uuid::Uuid;

#[tokio::test]
async fn test_event_bus_creation() {
    let bus = CaptureEventBus::new(100);
    assert_eq!(bus.subscriber_count(), 0);
    assert!(!bus.has_subscribers());
}

#[tokio::test]
async fn test_publish_with_no_subscribers() {
    let bus = CaptureEventBus::new(10);
    let event = CaptureEvent::run_started(Uuid::new_v4(), 12);

    let result = bus.publish(event);
    assert!(
        result.is_err(),
        "Publishing to empty bus should return error"
    );
    match result {
        Err(EventBusError::NoSubscribers) => {}
        other => panic!("Expected EventBusError::NoSubscribers, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_subscribe_and_publish() {
    let bus = CaptureEventBus::new(10);
    let mut receiver = bus.subscribe();

    assert_eq!(bus.subscriber_count(), 1);
    assert!(bus.has_subscribers());

    let run_id = Uuid::new_v4();
    let result = bus.publish(CaptureEvent::run_started(run_id, 7));
    assert!(result.is_ok());
    if let Ok(count) = result {
        assert_eq!(count, 1);
    }

    let received = match timeout(Duration::from_millis(100), receiver.recv()).await {
        Ok(Ok(event)) => event,
        Ok(Err(e)) => panic!("Failed to receive event: {e}"),
        Err(_) => panic!("Timeout waiting for event"),
    };

    match received {
        CaptureEvent::RunStarted {
            run_id: received_id,
            total_pages,
            ..
        } => {
            assert_eq!(received_id, run_id);
            assert_eq!(total_pages, 7);
        }
        other => panic!("Event types don't match: {other:?}"),
    }
}

#[tokio::test]
async fn test_multiple_subscribers() {
    let bus = CaptureEventBus::new(10);
    let mut receiver1 = bus.subscribe();
    let mut receiver2 = bus.subscribe();

    assert_eq!(bus.subscriber_count(), 2);

    let result = bus.publish(CaptureEvent::page_captured(3, "3_doc.png".to_string()));
    assert!(result.is_ok());
    if let Ok(count) = result {
        assert_eq!(count, 2);
    }

    for receiver in [&mut receiver1, &mut receiver2] {
        match timeout(Duration::from_millis(100), receiver.recv()).await {
            Ok(Ok(CaptureEvent::PageCaptured { display_id, .. })) => {
                assert_eq!(display_id, 3);
            }
            Ok(Ok(other)) => panic!("Unexpected event: {other:?}"),
            Ok(Err(e)) => panic!("Failed to receive event: {e}"),
            Err(_) => panic!("Timeout waiting for event"),
        }
    }
}

#[tokio::test]
async fn test_filtered_subscription_only_sees_matching_events() {
    let bus = CaptureEventBus::new(10);
    let mut waiting_only =
        bus.subscribe_filtered(|event| matches!(event, CaptureEvent::WaitingPages { .. }));

    assert!(waiting_only.would_receive(&CaptureEvent::waiting_pages(vec![1])));
    assert!(!waiting_only.would_receive(&CaptureEvent::status("hello")));

    bus.publish(CaptureEvent::status("cycle 1"))
        .expect("subscriber present");
    bus.publish(CaptureEvent::waiting_pages(vec![2, 3]))
        .expect("subscriber present");

    let received = timeout(Duration::from_millis(100), waiting_only.recv())
        .await
        .expect("no timeout")
        .expect("event received");
    match received {
        CaptureEvent::WaitingPages { display_ids, .. } => assert_eq!(display_ids, vec![2, 3]),
        other => panic!("filter leaked event: {other:?}"),
    }

    assert!(matches!(waiting_only.try_recv(), Ok(None)));
}

#[tokio::test]
async fn test_graceful_shutdown_emits_shutdown_event() {
    let bus = CaptureEventBus::new(10);
    let mut receiver = bus.subscribe();

    bus.shutdown_gracefully(ShutdownReason::RunCompleted).await;
    assert!(bus.is_shutdown());

    let received = timeout(Duration::from_millis(100), receiver.recv())
        .await
        .expect("no timeout")
        .expect("event received");
    assert!(matches!(
        received,
        CaptureEvent::Shutdown {
            reason: ShutdownReason::RunCompleted,
            ..
        }
    ));
}

#[tokio::test]
async fn test_metrics_track_publishes_and_drops() {
    let bus = CaptureEventBus::new(10);

    // No subscriber: the publish fails and is counted as such.
    let _ = bus.publish(CaptureEvent::status("into the void"));

    let _receiver = bus.subscribe();
    bus.publish(CaptureEvent::status("heard"))
        .expect("subscriber present");

    let snapshot = bus.metrics().snapshot();
    assert_eq!(snapshot.events_published, 1);
    assert_eq!(snapshot.events_failed, 1);
    assert_eq!(snapshot.active_subscribers, 1);
    assert_eq!(snapshot.total_events(), 2);
}
