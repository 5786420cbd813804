//! Extraction of match data from Forza Football pages.
//!
//! Three kinds of pages are read:
//!
//! | Page | Used for |
//! |------|----------|
//! | Team schedule | locating the live or next match |
//! | Match | clock, score, team names, period labels, event timeline |
//! | Match lineups tab | starting elevens |
//!
//! # Modules
//!
//! - [`forza`]: one function per labelled region of a page
//! - [`events`]: goals, cards and substitutions merged into one timeline
//!
//! All functions are generic over [`DocNode`](crate::document::DocNode) and
//! do no I/O.

pub mod events;
pub mod forza;
