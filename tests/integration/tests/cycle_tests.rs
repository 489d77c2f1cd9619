//! Cycle resets, cleanup of stale user records and the reset job

use std::time::Duration as StdDuration;

use chrono::Duration;
use tokio::sync::watch;

use market_core::{Category, Clock, ReactionField, UserId, VenueId};
use market_integration_tests::*;
use market_service::{CycleResetJob, EngineSettings, ResetReport};
use market_store::{paths, MemoryDocumentStore};

async fn vote<S: market_core::DocumentStore + 'static>(
    t: &TestContext<S>,
    venue: &VenueId,
    voters: &[UserId],
    field: ReactionField,
    category: Category,
) {
    for user in voters {
        t.reactions()
            .update_reaction(venue, user, field, Some(category))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_cycle_not_due_is_a_no_op() {
    let t = TestContext::new();
    let venue = unique_venue();
    vote(&t, &venue, &users(2), ReactionField::Toilet, Category::Yes).await;

    t.clock.advance(Duration::days(6));
    let reset = t
        .cycles()
        .reset_cycle_if_due(&venue, t.clock.now())
        .await
        .unwrap();
    assert!(!reset);

    let info = t.reactions().venue_info(&venue).await.unwrap();
    assert_eq!(info.counters(ReactionField::Toilet).current.get(Category::Yes), 2);
    assert_eq!(info.generation(), 0);
}

#[tokio::test]
async fn test_reset_moves_counts_to_previous_cycle() {
    let t = TestContext::new();
    let venue = unique_venue();
    let voters = users(3);
    vote(&t, &venue, &voters[..2], ReactionField::Toilet, Category::Yes).await;
    vote(&t, &venue, &voters[2..], ReactionField::Toilet, Category::No).await;

    t.clock.advance(Duration::days(7));
    let now = t.clock.now();
    assert!(t.cycles().reset_cycle_if_due(&venue, now).await.unwrap());

    let info = t.reactions().venue_info(&venue).await.unwrap();
    let toilet = info.counters(ReactionField::Toilet);
    assert!(toilet.current.is_empty());
    assert_eq!(toilet.previous.get(Category::Yes), 2);
    assert_eq!(toilet.previous.get(Category::No), 1);

    let cycle = info.cycle.unwrap();
    assert_eq!(cycle.generation, 1);
    assert_eq!(cycle.last_reset_at, Some(now));
    assert_eq!(cycle.next_reset_at, now + test_cycle_length());
    assert!(!cycle.cleanup_pending);

    // The previous winner is still shown, with nothing new to flag
    let summary = t
        .reactions()
        .field_summaries(&venue)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.field == ReactionField::Toilet)
        .unwrap();
    assert_eq!(summary.displayed, Some(Category::Yes));
    assert!(!summary.has_new_information);

    // Stored in the canonical shape
    let doc = t.raw(&paths::market_info(&venue)).await.unwrap();
    assert_eq!(doc["previousCycle"]["toilet"]["Yes"], 2);
    assert_eq!(doc["cycle"]["generation"], 1);
}

#[tokio::test]
async fn test_reset_deletes_user_records_in_both_indexes() {
    let t = TestContext::new();
    let venue = unique_venue();
    let voters = users(3);
    vote(&t, &venue, &voters, ReactionField::Reusable, Category::Yes).await;
    assert_eq!(t.count(&paths::venue_user_reactions(&venue)).await, 3);

    t.clock.advance(Duration::days(7));
    assert!(t
        .cycles()
        .reset_cycle_if_due(&venue, t.clock.now())
        .await
        .unwrap());

    assert_eq!(t.count(&paths::venue_user_reactions(&venue)).await, 0);
    for user in &voters {
        assert_eq!(t.count(&paths::user_reaction_index(user)).await, 0);
        assert_eq!(
            t.reactions()
                .user_reaction(&venue, user, ReactionField::Reusable)
                .await
                .unwrap(),
            None
        );
        assert!(t.reactions().my_reactions(user).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_second_reset_right_away_is_a_no_op() {
    let t = TestContext::new();
    let venue = unique_venue();
    vote(&t, &venue, &users(2), ReactionField::Toilet, Category::No).await;

    t.clock.advance(Duration::days(7));
    let now = t.clock.now();
    assert!(t.cycles().reset_cycle_if_due(&venue, now).await.unwrap());
    let before = t.reactions().venue_info(&venue).await.unwrap();

    assert!(!t.cycles().reset_cycle_if_due(&venue, now).await.unwrap());
    let after = t.reactions().venue_info(&venue).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_zero_length_cycle_resets_once_per_instant() {
    let settings = EngineSettings {
        cycle_length: Duration::zero(),
        ..test_settings(5)
    };
    let t = TestContext::with_store_and_settings(MemoryDocumentStore::new(), settings);
    let venue = unique_venue();
    vote(&t, &venue, &users(1), ReactionField::Toilet, Category::Yes).await;

    let now = t.clock.now();
    assert!(t.cycles().reset_cycle_if_due(&venue, now).await.unwrap());
    assert!(!t.cycles().reset_cycle_if_due(&venue, now).await.unwrap());

    let cycle = t.reactions().venue_info(&venue).await.unwrap().cycle.unwrap();
    assert_eq!(cycle.generation, 1);
    assert!(cycle.next_reset_at > now);
}

#[tokio::test]
async fn test_cycle_length_comes_from_configuration() -> anyhow::Result<()> {
    let t = TestContext::from_vars(&[("REACTION_CYCLE_DAYS", "3")])?;
    let venue = unique_venue();
    vote(&t, &venue, &users(1), ReactionField::Toilet, Category::Yes).await;

    t.clock.advance(Duration::days(2));
    assert!(!t.cycles().reset_cycle_if_due(&venue, t.clock.now()).await?);
    t.clock.advance(Duration::days(1));
    assert!(t.cycles().reset_cycle_if_due(&venue, t.clock.now()).await?);

    assert!(TestContext::from_vars(&[("REACTION_CYCLE_DAYS", "0")]).is_err());
    Ok(())
}

#[tokio::test]
async fn test_reaction_after_reset_counts_in_new_cycle() {
    let t = TestContext::new();
    let venue = unique_venue();
    let user = unique_user();
    vote(&t, &venue, std::slice::from_ref(&user), ReactionField::Toilet, Category::Yes).await;

    t.clock.advance(Duration::days(7));
    assert!(t
        .cycles()
        .reset_cycle_if_due(&venue, t.clock.now())
        .await
        .unwrap());

    // Same selection as last cycle is a fresh vote, not a no-op
    vote(&t, &venue, std::slice::from_ref(&user), ReactionField::Toilet, Category::Yes).await;

    let toilet = t
        .reactions()
        .venue_info(&venue)
        .await
        .unwrap()
        .counters(ReactionField::Toilet);
    assert_eq!(toilet.current.get(Category::Yes), 1);
    assert_eq!(toilet.previous.get(Category::Yes), 1);

    let record = t
        .raw(&paths::venue_user_reaction(&venue, &user))
        .await
        .unwrap();
    assert_eq!(record["generation"], 1);
    assert_counters_consistent(t.ctx.store(), &venue).await;
}

#[tokio::test]
async fn test_fields_without_votes_keep_their_snapshot() {
    let t = TestContext::new();
    let venue = unique_venue();
    let voters = users(2);
    vote(&t, &venue, &voters, ReactionField::Toilet, Category::Yes).await;

    t.clock.advance(Duration::days(7));
    assert!(t
        .cycles()
        .reset_cycle_if_due(&venue, t.clock.now())
        .await
        .unwrap());

    vote(&t, &venue, &voters[..1], ReactionField::Parking, Category::Free).await;
    t.clock.advance(Duration::days(7));
    assert!(t
        .cycles()
        .reset_cycle_if_due(&venue, t.clock.now())
        .await
        .unwrap());

    let info = t.reactions().venue_info(&venue).await.unwrap();
    assert_eq!(info.counters(ReactionField::Toilet).previous.get(Category::Yes), 2);
    assert_eq!(info.counters(ReactionField::Parking).previous.get(Category::Free), 1);
    assert_eq!(info.generation(), 2);
}

#[tokio::test]
async fn test_late_reset_keeps_the_cadence() {
    let t = TestContext::new();
    let venue = unique_venue();
    let start = t.clock.now();
    vote(&t, &venue, &users(1), ReactionField::LiveMusic, Category::Yes).await;

    t.clock.advance(Duration::days(20));
    assert!(t
        .cycles()
        .reset_cycle_if_due(&venue, t.clock.now())
        .await
        .unwrap());

    let cycle = t.reactions().venue_info(&venue).await.unwrap().cycle.unwrap();
    assert_eq!(cycle.generation, 1);
    assert_eq!(cycle.next_reset_at, start + Duration::days(21));
}

#[tokio::test]
async fn test_cleanup_is_chunked_to_the_commit_limit() {
    // 4 writes per commit: two users per cleanup chunk
    let t = TestContext::with_store(MemoryDocumentStore::with_max_writes(4));
    let venue = unique_venue();
    let voters = users(9);
    vote(&t, &venue, &voters, ReactionField::PetFriendly, Category::No).await;

    t.clock.advance(Duration::days(7));
    assert!(t
        .cycles()
        .reset_cycle_if_due(&venue, t.clock.now())
        .await
        .unwrap());

    assert_eq!(t.count(&paths::venue_user_reactions(&venue)).await, 0);
    for user in &voters {
        assert_eq!(t.count(&paths::user_reaction_index(user)).await, 0);
    }
}

#[tokio::test]
async fn test_batch_size_setting_bounds_cleanup_commits() {
    let settings = EngineSettings {
        reset_batch_size: 2,
        ..test_settings(5)
    };
    let t = TestContext::with_store_and_settings(
        FaultInjectingStore::new(MemoryDocumentStore::new()),
        settings,
    );
    let venue = unique_venue();
    vote(&t, &venue, &users(3), ReactionField::Toilet, Category::Yes).await;
    let before = t.store.commits();

    t.clock.advance(Duration::days(7));
    assert!(t
        .cycles()
        .reset_cycle_if_due(&venue, t.clock.now())
        .await
        .unwrap());

    // advance + one chunk per user + clearing the pending flag
    assert_eq!(t.store.commits() - before, 5);
    assert_eq!(t.count(&paths::venue_user_reactions(&venue)).await, 0);
}

#[tokio::test]
async fn test_interrupted_cleanup_resumes_without_a_second_reset() {
    let t = TestContext::with_store(FaultInjectingStore::new(
        MemoryDocumentStore::with_max_writes(4),
    ));
    let venue = unique_venue();
    let voters = users(6);
    vote(&t, &venue, &voters, ReactionField::Toilet, Category::Yes).await;

    // Advance and the first chunk succeed, the second chunk fails
    t.store.fail_after(2);
    t.clock.advance(Duration::days(7));
    let now = t.clock.now();
    let err = t.cycles().reset_cycle_if_due(&venue, now).await.unwrap_err();
    assert_eq!(err.error_code(), "INTERNAL_ERROR");

    let info = t.reactions().venue_info(&venue).await.unwrap();
    let cycle = info.cycle.clone().unwrap();
    assert_eq!(cycle.generation, 1);
    assert!(cycle.cleanup_pending);
    assert!(info.counters(ReactionField::Toilet).current.is_empty());
    assert_eq!(t.count(&paths::venue_user_reactions(&venue)).await, 4);

    // Votes in the new cycle land before the cleanup finishes
    let late = unique_user();
    vote(&t, &venue, std::slice::from_ref(&late), ReactionField::Toilet, Category::No).await;
    vote(&t, &venue, &voters[5..], ReactionField::Toilet, Category::No).await;

    assert!(!t.cycles().reset_cycle_if_due(&venue, now).await.unwrap());

    let info = t.reactions().venue_info(&venue).await.unwrap();
    let cycle = info.cycle.clone().unwrap();
    assert_eq!(cycle.generation, 1);
    assert!(!cycle.cleanup_pending);

    let toilet = info.counters(ReactionField::Toilet);
    assert_eq!(toilet.previous.get(Category::Yes), 6);
    assert_eq!(toilet.current.get(Category::No), 2);

    // Only the new-cycle records survive
    assert_eq!(t.count(&paths::venue_user_reactions(&venue)).await, 2);
    assert_eq!(t.count(&paths::user_reaction_index(&late)).await, 1);
    assert_eq!(t.count(&paths::user_reaction_index(&voters[5])).await, 1);
    for user in &voters[..5] {
        assert_eq!(t.count(&paths::user_reaction_index(user)).await, 0);
    }
    assert_counters_consistent(t.ctx.store(), &venue).await;
}

#[tokio::test]
async fn test_reset_all_due_reports_each_venue() {
    let t = TestContext::new();
    let (a, b, quiet) = (unique_venue(), unique_venue(), unique_venue());
    for venue in [&a, &b, &quiet] {
        t.markets()
            .register_market(venue, "Harbour Market", weekend_market_periods())
            .await
            .unwrap();
    }
    vote(&t, &a, &users(2), ReactionField::Toilet, Category::Yes).await;
    vote(&t, &b, &users(1), ReactionField::Parking, Category::Street).await;

    t.clock.advance(Duration::days(8));
    let report = t.cycles().reset_all_due(t.clock.now()).await.unwrap();
    assert_eq!(
        report,
        ResetReport {
            reset: 2,
            skipped: 1,
            failed: 0
        }
    );

    let again = t.cycles().reset_all_due(t.clock.now()).await.unwrap();
    assert_eq!(again.reset, 0);
    assert_eq!(again.skipped, 3);
}

#[tokio::test]
async fn test_job_run_once_uses_the_clock() {
    let t = TestContext::new();
    let venue = unique_venue();
    t.markets()
        .register_market(&venue, "Night Market", night_market_periods())
        .await
        .unwrap();
    vote(&t, &venue, &users(1), ReactionField::Toilet, Category::Yes).await;

    let job = CycleResetJob::new(t.ctx.clone(), StdDuration::from_secs(60));
    assert_eq!(job.run_once().await.unwrap().reset, 0);

    t.clock.advance(Duration::days(7));
    assert_eq!(job.run_once().await.unwrap().reset, 1);
}

#[tokio::test]
async fn test_job_sweeps_until_shutdown() {
    let t = TestContext::new();
    let venue = unique_venue();
    t.markets()
        .register_market(&venue, "Night Market", night_market_periods())
        .await
        .unwrap();
    vote(&t, &venue, &users(2), ReactionField::Toilet, Category::Yes).await;
    t.clock.advance(Duration::days(7));

    let (tx, rx) = watch::channel(false);
    let handle = CycleResetJob::new(t.ctx.clone(), StdDuration::from_millis(10)).spawn(rx);

    let mut generation = 0;
    for _ in 0..200 {
        generation = t.reactions().venue_info(&venue).await.unwrap().generation();
        if generation == 1 {
            break;
        }
        tokio::time::sleep(StdDuration::from_millis(5)).await;
    }
    assert_eq!(generation, 1);

    tx.send(true).unwrap();
    tokio::time::timeout(StdDuration::from_secs(1), handle)
        .await
        .expect("job stops on shutdown")
        .unwrap();
}
