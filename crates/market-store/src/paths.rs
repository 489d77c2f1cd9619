//! Document layout
//!
//! ```text
//! markets/{venue}                                     market record
//! markets/{venue}/details/info                        counters + cycle
//! markets/{venue}/details/info/userReactions/{user}   venue-indexed user reaction
//! userReactions/{user}/reactions/{venue}              user-indexed reaction snapshot
//! markets/{venue}/details/info/comments/{comment}     anonymous comment
//! users/{user}/savedMarkets/{venue}                   saved market + alert settings
//! users/{user}/comments/{comment}                     comments the user wrote
//! ```

use market_core::{CollectionPath, CommentId, DocPath, UserId, VenueId};

pub const MARKETS: &str = "markets";
pub const DETAILS: &str = "details";
pub const INFO: &str = "info";
pub const USER_REACTIONS: &str = "userReactions";
pub const REACTIONS: &str = "reactions";
pub const USERS: &str = "users";
pub const SAVED_MARKETS: &str = "savedMarkets";
pub const COMMENTS: &str = "comments";

pub fn markets() -> CollectionPath {
    CollectionPath::root(MARKETS)
}

pub fn market(venue: &VenueId) -> DocPath {
    markets().doc(venue.as_str())
}

pub fn market_info(venue: &VenueId) -> DocPath {
    market(venue).collection(DETAILS).doc(INFO)
}

pub fn venue_user_reactions(venue: &VenueId) -> CollectionPath {
    market_info(venue).collection(USER_REACTIONS)
}

pub fn venue_user_reaction(venue: &VenueId, user: &UserId) -> DocPath {
    venue_user_reactions(venue).doc(user.as_str())
}

pub fn user_reaction_index(user: &UserId) -> CollectionPath {
    CollectionPath::root(USER_REACTIONS)
        .doc(user.as_str())
        .collection(REACTIONS)
}

pub fn user_reaction_index_entry(user: &UserId, venue: &VenueId) -> DocPath {
    user_reaction_index(user).doc(venue.as_str())
}

pub fn saved_markets(user: &UserId) -> CollectionPath {
    CollectionPath::root(USERS)
        .doc(user.as_str())
        .collection(SAVED_MARKETS)
}

pub fn saved_market(user: &UserId, venue: &VenueId) -> DocPath {
    saved_markets(user).doc(venue.as_str())
}

pub fn market_comments(venue: &VenueId) -> CollectionPath {
    market_info(venue).collection(COMMENTS)
}

pub fn market_comment(venue: &VenueId, comment: &CommentId) -> DocPath {
    market_comments(venue).doc(comment.as_str())
}

pub fn user_comments(user: &UserId) -> CollectionPath {
    CollectionPath::root(USERS)
        .doc(user.as_str())
        .collection(COMMENTS)
}

pub fn user_comment(user: &UserId, comment: &CommentId) -> DocPath {
    user_comments(user).doc(comment.as_str())
}
