//! View-model integration tests
//!
//! Reaction control, reaction summary (with polling under paused time),
//! comment thread and save toggle wired to in-memory collaborators.
//!
//! Run with: cargo test -p integration-tests --test view_model_tests

use std::sync::Arc;
use std::time::Duration;

use adda_common::EngagementSettings;
use adda_core::{
    CommentId, DomainError, EntityRef, NotifyLevel, ReactionKind, Reactor, RewardEvent,
};
use adda_engagement::{
    CommentThread, ReactionControl, ReactionSummary, ReactorsState, SaveOutcome, SaveToggle,
    ToggleOutcome,
};
use chrono::Utc;
use integration_tests::{counts, TestHarness};
use ReactionKind::{Fire, Laugh, Like, Love, Sad};

fn post(id: &str) -> EntityRef {
    EntityRef::post(id)
}

/// Let spawned tasks run; with paused time this also advances the clock a tick
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn reactor(name: &str, kind: ReactionKind) -> Reactor {
    Reactor {
        user_id: format!("u-{name}"),
        name: name.to_string(),
        picture_url: None,
        reaction_kind: kind,
        reacted_at: Utc::now(),
    }
}

// ============================================================================
// ReactionControl
// ============================================================================

#[tokio::test]
async fn test_control_mount_loads_state() {
    let h = TestHarness::new();
    let entity = post("p1");
    h.api.seed(&entity, Some(Love), counts(&[(Love, 4)]));

    let control = ReactionControl::mount(&h.ctx, entity.clone()).await;
    let view = control.view();

    assert!(control.is_mounted());
    assert_eq!(view.active, Some(Love));
    assert_eq!(view.counts.get(Love), 4);
    assert!(!view.picker_open);
    assert_eq!(view.reactors, ReactorsState::Closed);
}

#[tokio::test]
async fn test_control_load_failure_leaves_neutral_view() {
    let h = TestHarness::new();
    h.api.fail_checks(Some(DomainError::api(503, "maintenance")));

    let control = ReactionControl::mount(&h.ctx, post("p1")).await;

    assert!(control.is_mounted());
    assert_eq!(control.view().active, None);
    assert!(control.view().counts.is_empty());
    assert!(h.notifier.toasts().is_empty());
}

#[tokio::test]
async fn test_press_likes_then_removes_held_reaction() {
    let h = TestHarness::new();
    let entity = post("p1");
    let control = ReactionControl::mount(&h.ctx, entity.clone()).await;

    let outcome = control.press().await.unwrap();
    assert_eq!(
        outcome,
        ToggleOutcome::Applied {
            previous: None,
            current: Some(Like)
        }
    );
    assert_eq!(control.view().active, Some(Like));

    control.select(Laugh).await.unwrap();
    assert_eq!(control.view().active, Some(Laugh));

    // press removes whatever is held, not just likes
    control.press().await.unwrap();
    assert_eq!(control.view().active, None);
    assert!(control.view().counts.is_empty());
}

#[tokio::test]
async fn test_picker_flags_active_kind_and_closes_on_select() {
    let h = TestHarness::new();
    let entity = post("p1");
    h.api.seed(&entity, Some(Sad), counts(&[(Sad, 1)]));
    let control = ReactionControl::mount(&h.ctx, entity).await;

    control.open_picker();
    assert!(control.view().picker_open);

    let options = control.picker_options();
    assert_eq!(options.len(), 6);
    assert_eq!(
        options.iter().map(|o| o.kind).collect::<Vec<_>>(),
        ReactionKind::ALL.to_vec()
    );
    let active: Vec<_> = options.iter().filter(|o| o.active).map(|o| o.kind).collect();
    assert_eq!(active, vec![Sad]);

    // selecting the held kind removes it
    let outcome = control.select(Sad).await.unwrap();
    assert!(!outcome.added());
    assert!(!control.view().picker_open);
    assert_eq!(control.view().active, None);
}

#[tokio::test]
async fn test_signed_out_prompts_without_mutating() {
    let h = TestHarness::new();
    let entity = post("p1");
    h.api.seed(&entity, None, counts(&[(Like, 2)]));
    let control = ReactionControl::mount(&h.ctx, entity.clone()).await;
    h.identity.set_signed_in(false);

    assert_eq!(control.press().await.unwrap(), ToggleOutcome::SignInRequired);
    assert_eq!(control.select(Fire).await.unwrap(), ToggleOutcome::SignInRequired);

    assert_eq!(h.identity.prompts(), 2);
    assert_eq!(h.api.calls("set_reaction"), 0);
    assert_eq!(control.view().counts, counts(&[(Like, 2)]));
    assert_eq!(control.view().active, None);
}

#[tokio::test]
async fn test_reward_only_on_addition() {
    let h = TestHarness::new();
    let entity = post("p1");
    let control = ReactionControl::mount(&h.ctx, entity.clone()).await;

    control.select(Fire).await.unwrap();
    let rewards = h.rewards.wait_for(1).await;
    assert_eq!(rewards, vec![(RewardEvent::Reaction, entity.clone())]);

    control.select(Fire).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(h.rewards.events().len(), 1);
}

#[tokio::test]
async fn test_reward_failure_keeps_reaction() {
    let h = TestHarness::new();
    h.rewards.set_failing(true);
    let entity = post("p1");
    let control = ReactionControl::mount(&h.ctx, entity.clone()).await;

    control.select(Love).await.unwrap();
    h.rewards.wait_for(1).await;
    settle().await;

    assert_eq!(control.view().active, Some(Love));
    assert_eq!(h.ctx.store().current_reaction(&entity), Some(Love));
    assert!(h.notifier.errors().is_empty());
}

#[tokio::test]
async fn test_failed_toggle_notifies_and_rolls_back() {
    let h = TestHarness::new();
    let entity = post("p1");
    h.api.seed(&entity, None, counts(&[(Love, 2)]));
    let control = ReactionControl::mount(&h.ctx, entity).await;

    h.api.fail_next_mutation(DomainError::api(500, "Could not save reaction"));
    let err = control.select(Love).await.unwrap_err();

    assert_eq!(err.code(), "API_ERROR");
    assert_eq!(h.notifier.errors(), vec!["Could not save reaction".to_string()]);
    assert_eq!(control.view().active, None);
    assert_eq!(control.view().counts, counts(&[(Love, 2)]));
    assert_eq!(h.identity.prompts(), 0);
}

#[tokio::test]
async fn test_expired_session_prompts_sign_in() {
    let h = TestHarness::new();
    let control = ReactionControl::mount(&h.ctx, post("p1")).await;

    h.api.fail_next_mutation(DomainError::AuthRequired);
    assert_eq!(control.press().await.unwrap_err(), DomainError::AuthRequired);

    assert_eq!(h.identity.prompts(), 1);
    assert_eq!(h.notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_reactors_are_fetched_on_every_open() {
    let h = TestHarness::new();
    let entity = post("p1");
    h.api.set_reactors(&entity, vec![reactor("rafi", Love)]);
    let control = ReactionControl::mount(&h.ctx, entity.clone()).await;

    let first = control.open_reactors().await.unwrap();
    assert_eq!(first.len(), 1);
    assert!(matches!(control.view().reactors, ReactorsState::Loaded(ref list) if list.len() == 1));

    h.api.set_reactors(&entity, vec![reactor("rafi", Love), reactor("mita", Fire)]);
    control.close_reactors();
    assert_eq!(control.view().reactors, ReactorsState::Closed);

    let second = control.open_reactors().await.unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(h.api.calls("list_reactors"), 2);
}

#[tokio::test]
async fn test_unmounted_control_ignores_events() {
    let h = TestHarness::new();
    let entity = post("p1");
    let watcher = ReactionControl::mount(&h.ctx, entity.clone()).await;
    let actor = ReactionControl::mount(&h.ctx, entity.clone()).await;
    let subscribers = h.ctx.bus().subscriber_count();

    watcher.unmount();
    watcher.unmount();
    assert!(!watcher.is_mounted());
    assert_eq!(h.ctx.bus().subscriber_count(), subscribers - 1);

    actor.press().await.unwrap();
    assert!(watcher.view().counts.is_empty());
    assert_eq!(actor.view().counts.get(Like), 1);

    drop(actor);
    assert_eq!(h.ctx.bus().subscriber_count(), subscribers - 2);
}

#[tokio::test]
async fn test_last_unmount_drops_store_state() {
    let h = TestHarness::new();
    let entity = post("p1");
    h.api.seed(&entity, None, counts(&[(Like, 1)]));
    let control = ReactionControl::mount(&h.ctx, entity.clone()).await;
    let summary = ReactionSummary::mount(&h.ctx, entity.clone());
    settle().await;

    control.unmount();
    assert_eq!(h.ctx.store().counts(&entity).get(Like), 1);

    summary.unmount();
    assert!(h.ctx.store().snapshot(&entity).is_none());
}

// ============================================================================
// Cross-component propagation
// ============================================================================

#[tokio::test]
async fn test_toggle_propagates_to_siblings_before_response() {
    let h = TestHarness::new();
    let entity = post("p1");
    h.api.seed(&entity, None, counts(&[(Love, 1)]));

    let first = Arc::new(ReactionControl::mount(&h.ctx, entity.clone()).await);
    let second = ReactionControl::mount(&h.ctx, entity.clone()).await;
    let summary = ReactionSummary::mount(&h.ctx, entity.clone());
    settle().await;
    assert_eq!(summary.render().unwrap().total, 1);

    h.api.hold_responses();
    let pending = tokio::spawn({
        let first = Arc::clone(&first);
        async move { first.select(Love).await }
    });
    h.api.wait_for_held(1).await;

    // no response yet, every view already shows the prediction
    assert_eq!(first.view().counts.get(Love), 2);
    assert_eq!(second.view().counts.get(Love), 2);
    assert_eq!(second.view().active, Some(Love));
    let rendered = summary.render().unwrap();
    assert_eq!(rendered.total, 2);
    assert_eq!(rendered.badges[0].kind, Love);

    h.api.release(0);
    pending.await.unwrap().unwrap();
    assert_eq!(second.view().counts.get(Love), 2);
    assert_eq!(summary.counts().get(Love), 2);
}

// ============================================================================
// ReactionSummary
// ============================================================================

fn poll_settings() -> EngagementSettings {
    EngagementSettings {
        poll_interval: Duration::from_secs(5),
        summary_top_n: 3,
    }
}

#[tokio::test(start_paused = true)]
async fn test_summary_polls_until_unmounted() {
    let h = TestHarness::with_settings(poll_settings());
    let entity = post("p1");
    h.api.seed(&entity, None, counts(&[(Like, 2)]));

    let summary = ReactionSummary::mount(&h.ctx, entity.clone());
    settle().await;
    assert!(summary.is_polling());
    assert_eq!(h.api.calls("check_reaction"), 1);
    assert_eq!(summary.render().unwrap().total, 2);

    h.api.set_counts(&entity, counts(&[(Like, 2), (Fire, 3), (Love, 1), (Sad, 1)]));
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(h.api.calls("check_reaction"), 2);

    let view = summary.render().unwrap();
    assert_eq!(view.total, 7);
    let kinds: Vec<_> = view.badges.iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![Fire, Like, Love]);

    summary.unmount();
    assert!(!summary.is_polling());
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.api.calls("check_reaction"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_summary_drop_stops_polling() {
    let h = TestHarness::with_settings(poll_settings());
    let entity = post("p1");

    let summary = ReactionSummary::mount(&h.ctx, entity.clone());
    settle().await;
    let subscribers = h.ctx.bus().subscriber_count();
    drop(summary);

    assert_eq!(h.ctx.bus().subscriber_count(), subscribers - 1);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.api.calls("check_reaction"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_summary_skips_polls_while_signed_out() {
    let h = TestHarness::with_settings(poll_settings());
    let entity = post("p1");
    h.identity.set_signed_in(false);

    let summary = ReactionSummary::mount(&h.ctx, entity.clone());
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(h.api.calls("check_reaction"), 0);
    assert!(summary.is_polling());

    h.identity.set_signed_in(true);
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(h.api.calls("check_reaction"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_summary_poll_failure_is_retried() {
    let h = TestHarness::with_settings(poll_settings());
    let entity = post("p1");
    h.api.seed(&entity, None, counts(&[(Love, 1)]));
    h.api.fail_checks(Some(DomainError::network("connection refused")));

    let summary = ReactionSummary::mount(&h.ctx, entity.clone());
    settle().await;
    assert!(summary.render().is_none());
    assert!(summary.is_polling());

    h.api.fail_checks(None);
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(summary.render().unwrap().total, 1);
    assert!(h.notifier.toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_summary_zero_state_renders_nothing() {
    let h = TestHarness::with_settings(poll_settings());
    let entity = post("p1");
    h.api.seed(&entity, None, counts(&[(Like, 1)]));

    let summary = ReactionSummary::mount(&h.ctx, entity.clone());
    settle().await;
    assert!(summary.render().is_some());

    h.api.set_counts(&entity, counts(&[]));
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert!(summary.render().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_summary_respects_top_n() {
    let h = TestHarness::with_settings(EngagementSettings {
        poll_interval: Duration::from_secs(5),
        summary_top_n: 1,
    });
    let entity = post("p1");
    h.api.seed(&entity, None, counts(&[(Like, 1), (Fire, 4)]));

    let summary = ReactionSummary::mount(&h.ctx, entity);
    settle().await;

    let view = summary.render().unwrap();
    assert_eq!(view.badges.len(), 1);
    assert_eq!(view.badges[0].kind, Fire);
    assert_eq!(view.badges[0].emoji, "🔥");
    assert_eq!(view.total, 5);
}

#[tokio::test]
async fn test_summary_reactors_panel() {
    let h = TestHarness::new();
    let entity = post("p1");
    h.api.set_reactors(&entity, vec![reactor("rafi", Like)]);
    let summary = ReactionSummary::mount(&h.ctx, entity);

    summary.open_reactors().await.unwrap();
    assert!(summary.reactors().is_open());
    summary.close_reactors();
    assert!(!summary.reactors().is_open());
}

// ============================================================================
// CommentThread
// ============================================================================

#[tokio::test]
async fn test_comment_submit_replaces_list_with_server_copy() {
    let h = TestHarness::new();
    let entity = post("p1");
    let thread = CommentThread::new(&h.ctx, entity.clone());
    assert!(thread.load().await.unwrap().is_empty());

    thread.set_input("  first!  ");
    let created = thread.submit_input().await.unwrap();

    assert_eq!(created.body, "first!");
    assert!(!created.is_pending());
    assert_eq!(thread.input(), "");
    let comments = thread.comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, created.id);
    assert_eq!(h.api.calls("list_comments"), 2);

    let rewards = h.rewards.wait_for(1).await;
    assert_eq!(rewards, vec![(RewardEvent::Comment, entity)]);
}

#[tokio::test]
async fn test_failed_comment_removes_draft() {
    let h = TestHarness::new();
    let thread = CommentThread::new(&h.ctx, post("p1"));
    thread.load().await.unwrap();

    h.api.fail_next_mutation(DomainError::api(500, "Comment failed"));
    thread.set_input("hello");
    let err = thread.submit_input().await.unwrap_err();

    assert_eq!(err, DomainError::api(500, "Comment failed"));
    assert!(thread.comments().iter().all(|c| !c.id.is_temporary()));
    assert!(thread.comments().is_empty());
    assert_eq!(h.notifier.errors(), vec!["Comment failed".to_string()]);
    assert!(h.rewards.events().is_empty());
}

#[tokio::test]
async fn test_refetch_failure_swaps_draft_in_place() {
    let h = TestHarness::new();
    let entity = post("p1");
    let thread = CommentThread::new(&h.ctx, entity);
    thread.load().await.unwrap();

    h.api.fail_list_comments(Some(DomainError::network("reset")));
    let created = thread.submit("kept").await.unwrap();

    let comments = thread.comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, created.id);
    assert!(matches!(comments[0].id, CommentId::Server(_)));
    assert!(h.notifier.errors().is_empty());
}

#[tokio::test]
async fn test_invalid_comment_changes_nothing() {
    let h = TestHarness::new();
    let thread = CommentThread::new(&h.ctx, post("p1"));
    thread.set_input("   ");

    let err = thread.submit_input().await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(thread.input(), "   ");

    let err = thread.submit(&"x".repeat(2001)).await.unwrap_err();
    assert!(err.is_validation());

    assert!(thread.comments().is_empty());
    assert_eq!(h.api.calls("add_comment"), 0);
    assert!(h.notifier.toasts().is_empty());
}

#[tokio::test]
async fn test_comment_requires_sign_in() {
    let h = TestHarness::new();
    h.identity.set_signed_in(false);
    let thread = CommentThread::new(&h.ctx, post("p1"));

    let err = thread.submit("hi").await.unwrap_err();

    assert_eq!(err, DomainError::AuthRequired);
    assert_eq!(h.identity.prompts(), 1);
    assert!(thread.comments().is_empty());
    assert_eq!(h.api.calls("add_comment"), 0);
}

#[tokio::test]
async fn test_unmounted_thread_keeps_its_list() {
    let h = TestHarness::new();
    let thread = CommentThread::new(&h.ctx, post("p1"));
    thread.unmount();

    thread.submit("late").await.unwrap();

    // the draft was appended before the call; the completion leaves it alone
    assert_eq!(thread.comments().len(), 1);
    assert!(thread.comments()[0].is_pending());
}

// ============================================================================
// SaveToggle
// ============================================================================

#[tokio::test]
async fn test_save_and_unsave() {
    let h = TestHarness::new();
    let entity = EntityRef::meme("m1");
    let toggle = SaveToggle::new(&h.ctx, entity.clone(), false);

    assert_eq!(toggle.toggle().await.unwrap(), SaveOutcome::Saved);
    assert!(toggle.is_saved());
    assert!(h.api.server_saved(&entity));
    assert_eq!(h.rewards.wait_for(1).await, vec![(RewardEvent::Save, entity.clone())]);

    assert_eq!(toggle.toggle().await.unwrap(), SaveOutcome::Unsaved);
    assert!(!toggle.is_saved());

    let levels: Vec<_> = h.notifier.toasts().into_iter().map(|(level, _)| level).collect();
    assert_eq!(levels, vec![NotifyLevel::Success, NotifyLevel::Success]);
}

#[tokio::test]
async fn test_failed_save_rolls_back() {
    let h = TestHarness::new();
    let entity = EntityRef::meme("m1");
    let toggle = SaveToggle::new(&h.ctx, entity.clone(), true);

    h.api.fail_next_mutation(DomainError::network("offline"));
    assert!(toggle.toggle().await.is_err());

    assert!(toggle.is_saved());
    assert_eq!(h.notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_save_requires_sign_in() {
    let h = TestHarness::new();
    h.identity.set_signed_in(false);
    let toggle = SaveToggle::new(&h.ctx, post("p1"), false);

    assert_eq!(toggle.toggle().await.unwrap(), SaveOutcome::SignInRequired);
    assert!(!toggle.is_saved());
    assert_eq!(h.api.calls("set_saved"), 0);
}
