//! Tests for domain_reclamation: SLA policy, lifecycle, history and service

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use core_kernel::{ClientId, Clock, FixedClock, ReclamationId};

use domain_reclamation::history::HistoryLog;
use domain_reclamation::lifecycle::{self, TransitionRequest};
use domain_reclamation::sla::{compute_sla_deadline, sla_offset, sla_status, SlaStatus};
use domain_reclamation::{
    InMemoryReclamationPort, LifecycleError, NewReclamation, Priority, Reclamation,
    ReclamationPort, ReclamationQuery, ReclamationService, ReclamationStatus,
    TransitionRejection,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn new_request(priority: Option<Priority>) -> NewReclamation {
    NewReclamation {
        client_id: ClientId::new_v7(),
        article_id: None,
        title: "Lave-vaisselle en fuite".to_string(),
        description: Some("Fuite sous la porte".to_string()),
        priority,
    }
}

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
        Just(Priority::Urgent),
    ]
}

fn status_strategy() -> impl Strategy<Value = ReclamationStatus> {
    prop::sample::select(ReclamationStatus::ALL.to_vec())
}

// ============================================================================
// SLA Policy
// ============================================================================

mod sla_tests {
    use super::*;

    #[test]
    fn test_offset_table() {
        let expected = [
            (Priority::Urgent, 4),
            (Priority::High, 24),
            (Priority::Medium, 72),
            (Priority::Low, 168),
        ];
        for (priority, hours) in expected {
            assert_eq!(compute_sla_deadline(t0(), priority) - t0(), Duration::hours(hours));
        }
    }

    #[test]
    fn test_urgent_ticket_example() {
        let rec = Reclamation::open(new_request(Some(Priority::Urgent)), t0()).unwrap();
        assert_eq!(rec.sla_deadline, Some(Utc.with_ymd_and_hms(2024, 1, 1, 4, 0, 0).unwrap()));

        let at = Utc.with_ymd_and_hms(2024, 1, 1, 3, 30, 0).unwrap();
        assert_eq!(sla_status(at, rec.sla_deadline, rec.status), SlaStatus::NearDeadline);
    }

    #[test]
    fn test_boundaries_around_24h() {
        let now = t0();
        let st = ReclamationStatus::InProgress;
        assert_eq!(sla_status(now, Some(now + Duration::hours(24)), st), SlaStatus::NearDeadline);
        assert_eq!(
            sla_status(now, Some(now + Duration::hours(24) + Duration::seconds(1)), st),
            SlaStatus::OnTime
        );
        assert_eq!(sla_status(now, Some(now - Duration::seconds(1)), st), SlaStatus::Overdue);
    }

    proptest! {
        #[test]
        fn deadline_offset_matches_table(
            secs in 0i64..4_000_000_000i64,
            priority in priority_strategy()
        ) {
            let created = Utc.timestamp_opt(secs, 0).unwrap();
            prop_assert_eq!(compute_sla_deadline(created, priority) - created, sla_offset(priority));
        }

        #[test]
        fn terminal_status_is_always_on_time(
            offset_secs in -1_000_000i64..1_000_000i64,
            closed in any::<bool>()
        ) {
            let status = if closed { ReclamationStatus::Closed } else { ReclamationStatus::Cancelled };
            let deadline = t0() + Duration::seconds(offset_secs);
            prop_assert_eq!(sla_status(t0(), Some(deadline), status), SlaStatus::OnTime);
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle_tests {
    use super::*;

    fn closed_reclamation() -> Reclamation {
        let rec = Reclamation::open(new_request(None), t0()).unwrap();
        let steps = [
            ReclamationStatus::InProgress,
            ReclamationStatus::Resolved,
            ReclamationStatus::Closed,
        ];
        steps.iter().fold(rec, |rec, status| {
            lifecycle::transition(&rec, &TransitionRequest::status(*status), "tech", t0())
                .unwrap()
                .0
        })
    }

    #[test]
    fn test_full_happy_path() {
        let rec = closed_reclamation();
        assert_eq!(rec.status, ReclamationStatus::Closed);
        assert_eq!(rec.version, 4);
        assert!(rec.closed_at.is_some());
    }

    #[test]
    fn test_waiting_for_parts_round_trip() {
        let mut rec = Reclamation::open(new_request(None), t0()).unwrap();
        for status in [
            ReclamationStatus::InProgress,
            ReclamationStatus::PendingParts,
            ReclamationStatus::InProgress,
        ] {
            let request = TransitionRequest::status(status);
            rec = lifecycle::transition(&rec, &request, "t", t0()).unwrap().0;
        }
        assert_eq!(rec.status, ReclamationStatus::InProgress);
    }

    #[test]
    fn test_cancel_from_new() {
        let rec = Reclamation::open(new_request(None), t0()).unwrap();
        let (rec, entry) = lifecycle::transition(
            &rec,
            &TransitionRequest::status(ReclamationStatus::Cancelled)
                .with_comment("Client injoignable"),
            "agent",
            t0(),
        )
        .unwrap();
        assert_eq!(rec.status, ReclamationStatus::Cancelled);
        assert_eq!(entry.comment.as_deref(), Some("Client injoignable"));
    }

    #[test]
    fn test_same_status_with_priority_is_priority_only() {
        let rec = Reclamation::open(new_request(None), t0()).unwrap();
        let request = TransitionRequest {
            new_status: Some(ReclamationStatus::New),
            new_priority: Some(Priority::High),
            comment: None,
        };
        let (rec, entry) = lifecycle::transition(&rec, &request, "agent", t0()).unwrap();
        assert_eq!(rec.status, ReclamationStatus::New);
        assert!(!entry.status_changed());
        assert!(entry.priority_changed());
    }

    proptest! {
        #[test]
        fn closed_reclamation_rejects_every_transition(
            status in proptest::option::of(status_strategy()),
            priority in proptest::option::of(priority_strategy()),
            comment in proptest::option::of("[a-z ]{0,20}")
        ) {
            let rec = closed_reclamation();
            let request = TransitionRequest { new_status: status, new_priority: priority, comment };
            let result = lifecycle::transition(&rec, &request, "anyone", t0());
            let is_terminal_rejection = matches!(
                result,
                Err(LifecycleError::InvalidTransition {
                    rejection: TransitionRejection::Terminal(ReclamationStatus::Closed),
                    ..
                })
            );
            prop_assert!(is_terminal_rejection);
        }

        #[test]
        fn every_successful_transition_adds_one_entry(
            steps in proptest::collection::vec(
                (
                    proptest::option::of(status_strategy()),
                    proptest::option::of(priority_strategy()),
                ),
                1..30
            )
        ) {
            let mut rec = Reclamation::open(new_request(None), t0()).unwrap();
            let mut log = HistoryLog::new();
            let mut now = t0();

            for (status, priority) in steps {
                let before = log.count(rec.id);
                let request = TransitionRequest {
                    new_status: status,
                    new_priority: priority,
                    comment: None,
                };
                match lifecycle::transition(&rec, &request, "prop", now) {
                    Ok((updated, entry)) => {
                        log.append(entry);
                        prop_assert_eq!(log.count(rec.id), before + 1);
                        rec = updated;
                    }
                    Err(_) => {
                        prop_assert_eq!(log.count(rec.id), before);
                    }
                }
                now += Duration::seconds(1);
            }

            let entries = log.entries(rec.id);
            prop_assert!(entries.windows(2).all(|w| w[0].changed_at < w[1].changed_at));
        }
    }
}

// ============================================================================
// Service
// ============================================================================

mod service_tests {
    use super::*;

    fn service() -> (ReclamationService, Arc<InMemoryReclamationPort>, Arc<FixedClock>) {
        let port = Arc::new(InMemoryReclamationPort::new());
        let clock = Arc::new(FixedClock::new(t0()));
        let service = ReclamationService::new(port.clone(), clock.clone());
        (service, port, clock)
    }

    #[tokio::test]
    async fn test_open_and_transition() {
        let (service, port, clock) = service();
        let rec = service.open(new_request(Some(Priority::High)), "agent").await.unwrap();
        assert_eq!(port.history_count(rec.id).await, 0);

        clock.advance(Duration::hours(2));
        let outcome = service
            .transition(rec.id, TransitionRequest::status(ReclamationStatus::InProgress), "tech.leroy")
            .await
            .unwrap();

        assert_eq!(outcome.reclamation.status, ReclamationStatus::InProgress);
        assert_eq!(outcome.entry.actor, "tech.leroy");
        assert_eq!(outcome.entry.changed_at, t0() + Duration::hours(2));
        assert_eq!(port.history_count(rec.id).await, 1);
    }

    #[tokio::test]
    async fn test_history_timestamps_strictly_increase_with_frozen_clock() {
        let (service, _port, _clock) = service();
        let rec = service.open(new_request(None), "agent").await.unwrap();

        for priority in [Priority::High, Priority::Low, Priority::Urgent] {
            service
                .transition(rec.id, TransitionRequest::priority(priority), "manager")
                .await
                .unwrap();
        }

        let history = service.history(rec.id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].changed_at < w[1].changed_at));
    }

    #[tokio::test]
    async fn test_unknown_reclamation_is_not_found() {
        let (service, _, _) = service();
        let id = ReclamationId::new();

        let err = service
            .transition(id, TransitionRequest::status(ReclamationStatus::InProgress), "t")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
        assert!(matches!(service.history(id).await, Err(LifecycleError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rejected_transition_writes_nothing() {
        let (service, port, _) = service();
        let rec = service.open(new_request(None), "agent").await.unwrap();

        let err = service
            .transition(rec.id, TransitionRequest::status(ReclamationStatus::Closed), "t")
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
        assert_eq!(port.history_count(rec.id).await, 0);
        assert_eq!(port.load_reclamation(rec.id).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_stale_writer_gets_concurrent_modification() {
        let (service, port, clock) = service();
        let rec = service.open(new_request(None), "agent").await.unwrap();

        // Another caller commits first
        service
            .transition(rec.id, TransitionRequest::status(ReclamationStatus::InProgress), "a")
            .await
            .unwrap();

        // A writer that loaded before that commit
        let (stale, entry) = lifecycle::transition(
            &rec,
            &TransitionRequest::status(ReclamationStatus::Cancelled),
            "b",
            clock.now(),
        )
        .unwrap();
        let err: LifecycleError = port
            .commit_transition(&stale, rec.version, entry)
            .await
            .unwrap_err()
            .into();

        assert!(err.is_retryable());
        assert!(matches!(err, LifecycleError::ConcurrentModification { expected_version: 1, .. }));
        assert_eq!(port.history_count(rec.id).await, 1);
    }

    #[tokio::test]
    async fn test_priority_change_then_explicit_recompute() {
        let (service, _, clock) = service();
        let rec = service.open(new_request(Some(Priority::Low)), "agent").await.unwrap();
        let original_deadline = rec.sla_deadline;

        clock.advance(Duration::minutes(30));
        let escalated = service
            .transition(rec.id, TransitionRequest::priority(Priority::Urgent), "manager")
            .await
            .unwrap();
        assert_eq!(escalated.reclamation.sla_deadline, original_deadline);

        let recomputed = service.recompute_sla_deadline(rec.id, "manager").await.unwrap();
        assert_eq!(recomputed.reclamation.sla_deadline, Some(t0() + Duration::hours(4)));

        let sla = service.sla(rec.id).await.unwrap();
        assert_eq!(sla.status, SlaStatus::NearDeadline);
        assert_eq!(sla.remaining_seconds, Some(Duration::minutes(210).num_seconds()));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_list_and_freezes() {
        let (service, _, _) = service();
        let rec = service.open(new_request(None), "agent").await.unwrap();

        service.soft_delete(rec.id, "admin", Some("doublon")).await.unwrap();

        assert!(service.list(&ReclamationQuery::default()).await.unwrap().is_empty());
        assert!(service.get(rec.id).await.unwrap().is_deleted);

        let err = service
            .transition(rec.id, TransitionRequest::status(ReclamationStatus::InProgress), "t")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition { rejection: TransitionRejection::Deleted, .. }
        ));
        assert_eq!(service.history(rec.id).await.unwrap().len(), 1);
    }
}
