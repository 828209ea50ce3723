pub mod client;
pub mod feed;
pub mod listing;

pub use client::{FetchError, RedditClient, Sort};
pub use feed::{FeedLoaded, FeedStatus, RedditFeed, RedditFeeds};
pub use listing::{Listing, Post};
