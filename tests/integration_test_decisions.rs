mod common;

use carshare_backend::domain::models::booking::BookingStatus;
use carshare_backend::domain::services::booking_service::Decision;
use carshare_backend::error::AppError;
use common::TestApp;

#[tokio::test]
async fn test_accept_sets_status_price_and_notifies_renter() {
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;
    let booking = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;

    let accepted = app
        .service
        .decide(&booking.id, Decision::Accept, None)
        .await
        .unwrap();

    assert_eq!(accepted.status, BookingStatus::Accepted);
    assert!(accepted.rejection_reason.is_none());
    // total = base + insurance + fee (5000 + 700 + 300 from the harness)
    assert_eq!(accepted.total_price, 6000);

    let notifications = app
        .state
        .notification_repo
        .list_by_booking(&booking.id)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].receiver_id, "renter-1");
    assert_eq!(notifications[0].sender_id, "host-1");
}

#[tokio::test]
async fn test_reject_sets_reason_and_notifies_renter() {
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;
    let booking = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;

    let rejected = app
        .service
        .decide(&booking.id, Decision::Reject, Some("Car is in the shop".to_string()))
        .await
        .unwrap();

    assert_eq!(rejected.status, BookingStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Car is in the shop"));

    let notifications = app
        .state
        .notification_repo
        .list_by_booking(&booking.id)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].receiver_id, "renter-1");
    assert!(notifications[0].body.contains("Car is in the shop"));
}

#[tokio::test]
async fn test_reject_without_reason_gets_a_default() {
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;
    let booking = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;

    let rejected = app
        .service
        .decide(&booking.id, Decision::Reject, None)
        .await
        .unwrap();

    assert_eq!(rejected.status, BookingStatus::Rejected);
    assert!(rejected.rejection_reason.is_some());
}

#[tokio::test]
async fn test_accept_overlapping_pending_fails_with_conflict() {
    // Scenario A: accepted 2025-06-10..15, accepting 2025-06-14..20 conflicts.
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;

    let first = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;
    app.service
        .decide(&first.id, Decision::Accept, None)
        .await
        .unwrap();

    let second = app.create_request(&car, "renter-2", "2025-06-14", "2025-06-20").await;
    let result = app.service.decide(&second.id, Decision::Accept, None).await;

    match result {
        Err(AppError::Conflict(msg)) => {
            assert!(msg.contains("2025-06-10"), "conflict message should name the window: {msg}");
            assert!(msg.contains("2025-06-15"), "conflict message should name the window: {msg}");
        }
        other => panic!("Expected Conflict, got {:?}", other.map(|b| b.status)),
    }

    // The losing request must stay pending and untouched.
    let reloaded = app
        .state
        .booking_repo
        .find_by_id(&second.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_competing_pendings_only_first_accept_wins() {
    // Scenario B: two pendings for identical dates; one acceptance, one conflict.
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;

    let first = app.create_request(&car, "renter-1", "2025-07-01", "2025-07-05").await;
    let second = app.create_request(&car, "renter-2", "2025-07-01", "2025-07-05").await;

    app.service
        .decide(&first.id, Decision::Accept, None)
        .await
        .unwrap();

    let result = app.service.decide(&second.id, Decision::Accept, None).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let winner = app
        .state
        .booking_repo
        .find_by_id(&first.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(winner.status, BookingStatus::Accepted);
}

#[tokio::test]
async fn test_terminal_bookings_never_transition_again() {
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;

    let rejected = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;
    app.service
        .decide(&rejected.id, Decision::Reject, None)
        .await
        .unwrap();

    let accept_again = app.service.decide(&rejected.id, Decision::Accept, None).await;
    match accept_again {
        Err(AppError::InvalidTransition(msg)) => assert!(msg.contains("finalized")),
        other => panic!("Expected InvalidTransition, got {:?}", other.map(|b| b.status)),
    }

    let cancelled = app.create_request(&car, "renter-2", "2025-06-10", "2025-06-15").await;
    app.service.cancel(&cancelled.id, "renter-2").await.unwrap();

    assert!(matches!(
        app.service.cancel(&cancelled.id, "renter-2").await,
        Err(AppError::InvalidTransition(_))
    ));
    assert!(matches!(
        app.service.decide(&cancelled.id, Decision::Reject, None).await,
        Err(AppError::InvalidTransition(_))
    ));

    let reloaded = app
        .state
        .booking_repo
        .find_by_id(&cancelled.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_accepted_booking_cannot_be_accepted_again() {
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;
    let booking = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;

    app.service
        .decide(&booking.id, Decision::Accept, None)
        .await
        .unwrap();

    assert!(matches!(
        app.service.decide(&booking.id, Decision::Accept, None).await,
        Err(AppError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn test_cancel_by_renter_notifies_host() {
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;
    let booking = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;

    let cancelled = app.service.cancel(&booking.id, "renter-1").await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let notifications = app
        .state
        .notification_repo
        .list_by_booking(&booking.id)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].receiver_id, "host-1");
    assert_eq!(notifications[0].sender_id, "renter-1");
}

#[tokio::test]
async fn test_cancel_accepted_booking_by_host_notifies_renter() {
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;
    let booking = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;

    app.service
        .decide(&booking.id, Decision::Accept, None)
        .await
        .unwrap();

    let cancelled = app.service.cancel(&booking.id, "host-1").await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let notifications = app
        .state
        .notification_repo
        .list_for_receiver("renter-1")
        .await
        .unwrap();
    // Accept notification plus the cancellation.
    assert_eq!(notifications.len(), 2);
    assert_eq!(
        notifications.iter().filter(|n| n.body.contains("cancelled")).count(),
        1
    );
}

#[tokio::test]
async fn test_cancel_by_stranger_is_forbidden() {
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;
    let booking = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;

    let result = app.service.cancel(&booking.id, "someone-else").await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let reloaded = app
        .state
        .booking_repo
        .find_by_id(&booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_decide_unknown_booking_is_not_found() {
    let app = TestApp::new().await;

    let result = app.service.decide("no-such-id", Decision::Accept, None).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_price_invariant_holds_after_accept() {
    let app = TestApp::new().await;
    let car = app.create_car("host-1").await;
    let booking = app.create_request(&car, "renter-1", "2025-06-10", "2025-06-15").await;

    let accepted = app
        .service
        .decide(&booking.id, Decision::Accept, None)
        .await
        .unwrap();

    assert_eq!(
        accepted.total_price,
        accepted.base_price
            + accepted.insurance_amount.unwrap_or(0)
            + accepted.platform_fee.unwrap_or(0)
    );
}
