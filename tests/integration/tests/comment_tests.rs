//! Anonymous market comments and the own-comment index

use chrono::Duration;
use serde_json::json;

use market_core::{CommentId, UserId, VenueId};
use market_integration_tests::*;
use market_service::dto::{AddCommentRequest, CommentPageRequest};
use market_store::{paths, MemoryDocumentStore};

async fn market<S: market_core::DocumentStore + 'static>(t: &TestContext<S>) -> VenueId {
    let venue = unique_venue();
    t.markets()
        .register_market(&venue, "Night Market", night_market_periods())
        .await
        .unwrap();
    venue
}

async fn comment<S: market_core::DocumentStore + 'static>(
    t: &TestContext<S>,
    venue: &VenueId,
    author: &UserId,
    text: &str,
) -> CommentId {
    t.comments()
        .add_comment(venue, author, &AddCommentRequest::new(text))
        .await
        .unwrap()
        .id
}

fn page(limit: Option<usize>, start_after: Option<&CommentId>) -> CommentPageRequest {
    CommentPageRequest {
        limit,
        start_after: start_after.map(|c| c.to_string()),
    }
}

#[tokio::test]
async fn test_add_comment_writes_comment_and_index() {
    let t = TestContext::new();
    let venue = market(&t).await;
    let user = unique_user();

    let added = t
        .comments()
        .add_comment(&venue, &user, &AddCommentRequest::new("  Cash only  "))
        .await
        .unwrap();
    assert_eq!(added.text, "Cash only");
    assert!(added.anonymous);
    assert_eq!(added.created_at, friday_morning());

    let doc = t.raw(&paths::market_comment(&venue, &added.id)).await.unwrap();
    assert_eq!(doc["text"], "Cash only");
    assert_eq!(doc["userId"], user.as_str());
    assert_eq!(doc["anonymous"], true);

    let entry = t.raw(&paths::user_comment(&user, &added.id)).await.unwrap();
    assert_eq!(entry["placeId"], venue.as_str());
    assert_eq!(entry["commentId"], added.id.as_str());

    assert!(t
        .comments()
        .is_user_comment(&user, &venue, &added.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_add_comment_rejects_bad_input() {
    let t = TestContext::new();
    let venue = market(&t).await;
    let user = unique_user();

    let err = t
        .comments()
        .add_comment(&unique_venue(), &user, &AddCommentRequest::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_MARKET");

    let too_long = "x".repeat(1001);
    for text in ["", "   ", too_long.as_str()] {
        let err = t
            .comments()
            .add_comment(&venue, &user, &AddCommentRequest::new(text))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    assert_eq!(t.count(&paths::market_comments(&venue)).await, 0);
    assert_eq!(t.count(&paths::user_comments(&user)).await, 0);
}

#[tokio::test]
async fn test_comments_are_paged_newest_first() {
    let t = TestContext::new();
    let venue = market(&t).await;
    let voters = users(25);

    let mut ids = Vec::new();
    for (i, user) in voters.iter().enumerate() {
        ids.push(comment(&t, &venue, user, &format!("comment {i}")).await);
        t.clock.advance(Duration::minutes(1));
    }
    ids.reverse();

    let first = t.comments().list_comments(&venue, &page(None, None)).await.unwrap();
    assert_eq!(first.len(), 20);
    assert_eq!(first[0].text, "comment 24");
    let first_ids: Vec<_> = first.iter().map(|c| c.id.clone()).collect();
    assert_eq!(first_ids, ids[..20]);

    let second = t
        .comments()
        .list_comments(&venue, &page(None, first_ids.last()))
        .await
        .unwrap();
    let second_ids: Vec<_> = second.iter().map(|c| c.id.clone()).collect();
    assert_eq!(second_ids, ids[20..]);

    let small = t
        .comments()
        .list_comments(&venue, &page(Some(3), Some(&ids[1])))
        .await
        .unwrap();
    assert_eq!(small.len(), 3);
    assert_eq!(small[0].id, ids[2]);
}

#[tokio::test]
async fn test_unknown_cursor_starts_from_the_top() {
    let t = TestContext::new();
    let venue = market(&t).await;
    let newest = {
        comment(&t, &venue, &unique_user(), "first").await;
        t.clock.advance(Duration::minutes(1));
        comment(&t, &venue, &unique_user(), "second").await
    };

    let gone = CommentId::new("deleted-long-ago").unwrap();
    let listed = t
        .comments()
        .list_comments(&venue, &page(Some(5), Some(&gone)))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, newest);

    let err = t
        .comments()
        .list_comments(&venue, &page(Some(0), None))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_stored_comments_are_read_leniently() {
    let t = TestContext::new();
    let venue = market(&t).await;
    let legacy = CommentId::new("legacy1").unwrap();
    t.seed(
        paths::market_comment(&venue, &legacy),
        json!({
            "text": "Try the hotteok",
            "userId": null,
            "anonymous": true,
            "createdAt": { "_seconds": 1717660800, "_nanoseconds": 0 }
        }),
    )
    .await;
    t.seed(
        paths::market_comment(&venue, &CommentId::new("broken").unwrap()),
        json!({ "text": "no timestamp" }),
    )
    .await;
    let fresh = comment(&t, &venue, &unique_user(), "Busy tonight").await;

    let listed = t.comments().list_comments(&venue, &page(None, None)).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids, vec![fresh, legacy]);
    assert!(listed[1].author.is_none());
}

#[tokio::test]
async fn test_author_deletes_comment_and_index_entry() {
    let t = TestContext::new();
    let venue = market(&t).await;
    let user = unique_user();
    let id = comment(&t, &venue, &user, "Closed for rain").await;

    t.comments().delete_comment(&venue, &user, &id).await.unwrap();

    assert!(t.raw(&paths::market_comment(&venue, &id)).await.is_none());
    assert!(t.raw(&paths::user_comment(&user, &id)).await.is_none());
    assert!(t
        .comments()
        .list_comments(&venue, &page(None, None))
        .await
        .unwrap()
        .is_empty());

    let err = t
        .comments()
        .delete_comment(&venue, &user, &id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_COMMENT");
}

#[tokio::test]
async fn test_only_the_author_may_delete() {
    let t = TestContext::new();
    let venue = market(&t).await;
    let (author, other) = (unique_user(), unique_user());
    let id = comment(&t, &venue, &author, "Parking is full").await;

    let err = t
        .comments()
        .delete_comment(&venue, &other, &id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_COMMENT_AUTHOR");
    assert!(t.raw(&paths::market_comment(&venue, &id)).await.is_some());
    assert!(!t.comments().is_user_comment(&other, &venue, &id).await.unwrap());
}

#[tokio::test]
async fn test_index_entry_for_another_market_does_not_authorize() {
    let t = TestContext::new();
    let (here, elsewhere) = (market(&t).await, market(&t).await);
    let user = unique_user();
    let id = comment(&t, &here, &unique_user(), "Lovely").await;

    // An entry with the same id that points at a different market
    t.seed(
        paths::user_comment(&user, &id),
        json!({ "commentId": id.as_str(), "placeId": elsewhere.as_str() }),
    )
    .await;

    let err = t
        .comments()
        .delete_comment(&here, &user, &id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_COMMENT_AUTHOR");
}

#[tokio::test]
async fn test_user_comment_ids_are_per_market() {
    let t = TestContext::new();
    let (first, second) = (market(&t).await, market(&t).await);
    let user = unique_user();

    let a = comment(&t, &first, &user, "one").await;
    let b = comment(&t, &first, &user, "two").await;
    comment(&t, &second, &user, "three").await;
    comment(&t, &first, &unique_user(), "someone else").await;

    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(
        t.comments().user_comment_ids(&user, &first).await.unwrap(),
        expected
    );
    assert_eq!(
        t.comments().user_comment_ids(&user, &second).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_delete_is_retried_on_conflict() {
    let t = TestContext::with_store(FaultInjectingStore::new(MemoryDocumentStore::new()));
    let venue = market(&t).await;
    let user = unique_user();
    let id = comment(&t, &venue, &user, "Retry me").await;

    t.store.conflict_next(2);
    let before = t.store.commits();
    t.comments().delete_comment(&venue, &user, &id).await.unwrap();

    assert_eq!(t.store.commits() - before, 3);
    assert!(t.raw(&paths::market_comment(&venue, &id)).await.is_none());
    assert!(t.raw(&paths::user_comment(&user, &id)).await.is_none());
}
