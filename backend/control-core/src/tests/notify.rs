// Unit tests for advisory de-duplication and dismissal

use crate::notify::{AdvisoryEvent, NotificationMediator, home_region_advisory, offline_advisory};

use common::{Advisory, AdvisoryId, AdvisoryLifetime, Theme};

fn advisory_with_text(text: &str) -> Advisory {
    Advisory {
        text: text.to_string(),
        ..home_region_advisory(Theme::Light)
    }
}

/// **VALUE**: Verifies showing an active id replaces content instead of
/// stacking a second notice.
///
/// **WHY THIS MATTERS**: Identity is the dedup key. The original toast
/// layer relied on the renderer for this; here the active set is
/// explicit state and must enforce it itself.
///
/// **BUG THIS CATCHES**: Would catch an insert that appends rather than
/// replaces, or a dedup keyed on payload instead of id.
#[tokio::test]
async fn given_active_id_when_shown_again_then_single_advisory_with_latest_payload() {
    let mediator = NotificationMediator::new();

    mediator.show(advisory_with_text("first")).await;
    mediator.show(advisory_with_text("second")).await;

    let active = mediator.active().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, AdvisoryId::HomeRegion);
    assert_eq!(active[0].text, "second");
}

#[tokio::test]
async fn given_inactive_id_when_dismissed_then_noop_and_no_event() {
    let mediator = NotificationMediator::new();
    let mut events = mediator.subscribe();

    mediator.dismiss(AdvisoryId::Offline).await;
    mediator.dismiss(AdvisoryId::Offline).await;

    assert!(mediator.active().await.is_empty());
    assert!(
        events.try_recv().is_err(),
        "dismissing an inactive id must not emit an event"
    );
}

#[tokio::test]
async fn given_shown_advisory_when_dismissed_then_removed_regardless_of_show_count() {
    let mediator = NotificationMediator::new();

    mediator.show(advisory_with_text("first")).await;
    mediator.show(advisory_with_text("second")).await;
    mediator.dismiss(AdvisoryId::HomeRegion).await;

    assert!(!mediator.is_active(AdvisoryId::HomeRegion).await);
}

#[tokio::test]
async fn given_subscriber_when_shown_and_dismissed_then_events_in_order() {
    let mediator = NotificationMediator::new();
    let mut events = mediator.subscribe();

    mediator.show(offline_advisory(Theme::Dark)).await;
    mediator.dismiss(AdvisoryId::Offline).await;

    assert!(matches!(
        events.recv().await.unwrap(),
        AdvisoryEvent::Shown(advisory) if advisory.id == AdvisoryId::Offline
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        AdvisoryEvent::Dismissed(AdvisoryId::Offline)
    ));
}

#[test]
fn given_theme_when_building_advisories_then_style_tracks_theme() {
    let light = offline_advisory(Theme::Light);
    let dark = offline_advisory(Theme::Dark);

    assert_ne!(light.style.background, dark.style.background);
    assert_eq!(light.lifetime, AdvisoryLifetime::Persistent);
    assert_eq!(dark.lifetime, AdvisoryLifetime::Persistent);
}
