//! Reaction updates, consensus and counter consistency

use chrono::Duration;
use serde_json::json;

use market_core::{Category, ReactionField};
use market_integration_tests::*;
use market_service::{ReactionChange, ReactionService, ServiceError};
use market_store::{paths, MemoryDocumentStore};

#[tokio::test]
async fn test_first_reaction_counts_once() {
    let t = TestContext::new();
    let venue = unique_venue();
    let user = unique_user();

    let change = t
        .reactions()
        .update_reaction(&venue, &user, ReactionField::Toilet, Some(Category::Yes))
        .await
        .unwrap();
    assert_eq!(
        change,
        ReactionChange::Changed {
            from: None,
            to: Some(Category::Yes)
        }
    );

    let again = t
        .reactions()
        .update_reaction(&venue, &user, ReactionField::Toilet, Some(Category::Yes))
        .await
        .unwrap();
    assert_eq!(again, ReactionChange::Unchanged);

    let info = t.reactions().venue_info(&venue).await.unwrap();
    let toilet = info.counters(ReactionField::Toilet);
    assert_eq!(toilet.current.get(Category::Yes), 1);
    assert_eq!(toilet.current.get(Category::No), 0);
    assert!(toilet.last_updated.is_some());

    // First reaction starts the venue's cycle
    let cycle = info.cycle.expect("cycle started");
    assert_eq!(cycle.generation, 0);
    assert_eq!(cycle.next_reset_at, friday_morning() + test_cycle_length());

    assert_counters_consistent(t.ctx.store(), &venue).await;
}

#[tokio::test]
async fn test_switching_selection_moves_the_vote() {
    let t = TestContext::new();
    let venue = unique_venue();
    let user = unique_user();
    let reactions = t.reactions();

    reactions
        .update_reaction(&venue, &user, ReactionField::Toilet, Some(Category::Yes))
        .await
        .unwrap();
    let change = reactions
        .update_reaction(&venue, &user, ReactionField::Toilet, Some(Category::No))
        .await
        .unwrap();
    assert_eq!(
        change,
        ReactionChange::Changed {
            from: Some(Category::Yes),
            to: Some(Category::No)
        }
    );

    let toilet = reactions
        .venue_info(&venue)
        .await
        .unwrap()
        .counters(ReactionField::Toilet);
    assert_eq!(toilet.current.get(Category::Yes), 0);
    assert_eq!(toilet.current.get(Category::No), 1);
    assert_eq!(
        reactions
            .user_reaction(&venue, &user, ReactionField::Toilet)
            .await
            .unwrap(),
        Some(Category::No)
    );
}

#[tokio::test]
async fn test_clearing_selection() {
    let t = TestContext::new();
    let venue = unique_venue();
    let user = unique_user();
    let reactions = t.reactions();

    reactions
        .update_reaction(&venue, &user, ReactionField::Parking, Some(Category::Paid))
        .await
        .unwrap();
    reactions
        .update_reaction(&venue, &user, ReactionField::Parking, None)
        .await
        .unwrap();

    let parking = reactions
        .venue_info(&venue)
        .await
        .unwrap()
        .counters(ReactionField::Parking);
    assert_eq!(parking.current.get(Category::Paid), 0);
    assert_eq!(
        reactions
            .user_reaction(&venue, &user, ReactionField::Parking)
            .await
            .unwrap(),
        None
    );

    // Cleared key is kept as null in both records
    let record = t
        .raw(&paths::venue_user_reaction(&venue, &user))
        .await
        .unwrap();
    assert!(record["parking"].is_null());
    let index = t
        .raw(&paths::user_reaction_index_entry(&user, &venue))
        .await
        .unwrap();
    assert!(index["parking"].is_null());
    assert_eq!(index["placeId"], venue.as_str());

    // Clearing again writes nothing
    let again = reactions
        .update_reaction(&venue, &user, ReactionField::Parking, None)
        .await
        .unwrap();
    assert_eq!(again, ReactionChange::Unchanged);
}

#[tokio::test]
async fn test_category_outside_field_is_rejected() {
    let t = TestContext::new();
    let venue = unique_venue();
    let user = unique_user();

    let err = t
        .reactions()
        .update_reaction(&venue, &user, ReactionField::Toilet, Some(Category::Free))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CATEGORY");
    assert!(!err.is_retryable());

    // Nothing was written
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn test_consensus_uses_previous_cycle_until_current_has_a_winner() {
    let t = TestContext::new();
    let venue = unique_venue();
    t.seed(
        paths::market_info(&venue),
        json!({
            "toilet": { "Yes": 0, "No": 0 },
            "previousCycle": { "toilet": { "Yes": 4, "No": 1 } }
        }),
    )
    .await;

    let summary = |fields: Vec<market_core::FieldSummary>| {
        fields
            .into_iter()
            .find(|s| s.field == ReactionField::Toilet)
            .unwrap()
    };

    let toilet = summary(t.reactions().field_summaries(&venue).await.unwrap());
    assert_eq!(toilet.displayed, Some(Category::Yes));
    assert!(!toilet.has_new_information);
    assert!(!toilet.is_empty);

    // A tie in the current cycle still shows the previous winner
    let (a, b) = (unique_user(), unique_user());
    let reactions = t.reactions();
    reactions
        .update_reaction(&venue, &a, ReactionField::Toilet, Some(Category::No))
        .await
        .unwrap();
    reactions
        .update_reaction(&venue, &b, ReactionField::Toilet, Some(Category::Yes))
        .await
        .unwrap();
    let toilet = summary(reactions.field_summaries(&venue).await.unwrap());
    assert_eq!(toilet.displayed, Some(Category::Yes));

    // A strict current majority takes over
    let c = unique_user();
    reactions
        .update_reaction(&venue, &c, ReactionField::Toilet, Some(Category::No))
        .await
        .unwrap();
    let toilet = summary(reactions.field_summaries(&venue).await.unwrap());
    assert_eq!(toilet.displayed, Some(Category::No));
    assert!(toilet.has_new_information);

    // Untouched fields are empty
    let music = reactions
        .field_summaries(&venue)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.field == ReactionField::LiveMusic)
        .unwrap();
    assert!(music.is_empty);
    assert_eq!(music.displayed, None);
}

#[tokio::test]
async fn test_legacy_lowercase_documents_are_normalized() {
    let t = TestContext::new();
    let venue = unique_venue();
    let user = unique_user();
    t.seed(
        paths::market_info(&venue),
        json!({ "toilet": { "yes": 2, "no": 0 }, "vicinity": "Harbour" }),
    )
    .await;
    t.seed(
        paths::venue_user_reaction(&venue, &user),
        json!({ "toilet": "yes" }),
    )
    .await;

    assert_eq!(
        t.reactions()
            .venue_info(&venue)
            .await
            .unwrap()
            .counters(ReactionField::Toilet)
            .current
            .get(Category::Yes),
        2
    );

    t.reactions()
        .update_reaction(&venue, &user, ReactionField::Toilet, Some(Category::No))
        .await
        .unwrap();

    let doc = t.raw(&paths::market_info(&venue)).await.unwrap();
    assert_eq!(doc["toilet"]["Yes"], 1);
    assert_eq!(doc["toilet"]["No"], 1);
    assert!(doc["toilet"].get("yes").is_none());
    assert_eq!(doc["vicinity"], "Harbour");
}

#[tokio::test]
async fn test_my_reactions_lists_live_selections_newest_first() {
    let t = TestContext::new();
    let user = unique_user();
    let (older, newer, cleared) = (unique_venue(), unique_venue(), unique_venue());
    let reactions = t.reactions();

    reactions
        .update_reaction(&older, &user, ReactionField::PetFriendly, Some(Category::Yes))
        .await
        .unwrap();
    t.clock.advance(Duration::minutes(5));
    reactions
        .update_reaction(&newer, &user, ReactionField::Parking, Some(Category::Street))
        .await
        .unwrap();
    reactions
        .update_reaction(&cleared, &user, ReactionField::Reusable, Some(Category::No))
        .await
        .unwrap();
    reactions
        .update_reaction(&cleared, &user, ReactionField::Reusable, None)
        .await
        .unwrap();

    let mine = reactions.my_reactions(&user).await.unwrap();
    let venues: Vec<_> = mine.iter().map(|r| r.venue_id.clone()).collect();
    assert_eq!(venues, vec![newer.clone(), older.clone()]);
    assert_eq!(
        mine[0].selections.get(&ReactionField::Parking),
        Some(&Category::Street)
    );

    assert!(reactions.my_reactions(&unique_user()).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_lose_no_votes() {
    let t = TestContext::with_store_and_settings(MemoryDocumentStore::new(), test_settings(100));
    let venue = unique_venue();
    let voters = users(24);

    let tasks = voters.iter().enumerate().map(|(i, user)| {
        let ctx = t.ctx.clone();
        let venue = venue.clone();
        let user = user.clone();
        tokio::spawn(async move {
            let category = if i % 3 == 0 { Category::No } else { Category::Yes };
            ReactionService::new(&ctx)
                .update_reaction(&venue, &user, ReactionField::Toilet, Some(category))
                .await
        })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let toilet = t
        .reactions()
        .venue_info(&venue)
        .await
        .unwrap()
        .counters(ReactionField::Toilet);
    assert_eq!(toilet.current.get(Category::Yes), 16);
    assert_eq!(toilet.current.get(Category::No), 8);
    assert_counters_consistent(t.ctx.store(), &venue).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_switches_by_one_user_stay_consistent() {
    let t = TestContext::with_store_and_settings(MemoryDocumentStore::new(), test_settings(100));
    let venue = unique_venue();
    let user = unique_user();

    let tasks = (0..12).map(|i| {
        let ctx = t.ctx.clone();
        let venue = venue.clone();
        let user = user.clone();
        tokio::spawn(async move {
            let category = if i % 2 == 0 { Category::Yes } else { Category::No };
            ReactionService::new(&ctx)
                .update_reaction(&venue, &user, ReactionField::Toilet, Some(category))
                .await
        })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let toilet = t
        .reactions()
        .venue_info(&venue)
        .await
        .unwrap()
        .counters(ReactionField::Toilet);
    assert_eq!(toilet.current.total(), 1);
    assert_counters_consistent(t.ctx.store(), &venue).await;
}

#[tokio::test]
async fn test_conflicts_are_retried_transparently() {
    let store = FaultInjectingStore::new(MemoryDocumentStore::new());
    store.conflict_next(2);
    let t = TestContext::with_store(store);
    let venue = unique_venue();
    let user = unique_user();

    t.reactions()
        .update_reaction(&venue, &user, ReactionField::LiveMusic, Some(Category::Yes))
        .await
        .unwrap();

    assert_eq!(t.store.commits(), 3);
    assert_eq!(t.store.applied(), 1);
    assert_counters_consistent(t.ctx.store(), &venue).await;
}

#[tokio::test]
async fn test_exhausted_retries_apply_nothing() {
    let store = FaultInjectingStore::new(MemoryDocumentStore::new());
    store.conflict_next(10);
    let t = TestContext::with_store_and_settings(store, test_settings(3));
    let venue = unique_venue();
    let user = unique_user();

    let err = t
        .reactions()
        .update_reaction(&venue, &user, ReactionField::Toilet, Some(Category::Yes))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::RetriesExhausted {
            operation: "update_reaction",
            attempts: 3
        }
    ));
    assert!(err.is_retryable());

    assert_eq!(t.store.applied(), 0);
    assert!(t.raw(&paths::market_info(&venue)).await.is_none());
    assert!(t
        .raw(&paths::venue_user_reaction(&venue, &user))
        .await
        .is_none());
}
