//! sale-board Crate
//!
//! Renders a static JSON feed of sale listings into localized HTML pages. A feed is loaded
//! from disk or over HTTP, every item is turned into a card showing its store, rating,
//! price, discount, point rate and a countdown to the end of the sale, and the cards are
//! filtered by content rating (all, adult-only or safe).
//!
//! Failures never produce an empty page: the page then carries a "load failed" status and
//! the error text instead of the list.
pub mod app;
pub mod countdown;
mod errors;
pub mod feed;
pub mod fetch;
pub mod filter;
pub mod locale;
pub mod page;
mod retry;
pub mod render;

pub use errors::{Error, Result};
pub use retry::RetryPolicy;
