//! State module for tracking how each crawled URL ended
//!
//! `PageState` is the terminal outcome a worker records for every URL it takes
//! off the frontier.

mod page_state;

pub use page_state::PageState;
