//! Text rendering for the match thread.
//!
//! # Submodules
//!
//! - [`markdown`]: score banner, lineup table, event log and period phrase
//!
//! # Post Layout
//!
//! ```text
//! #### River Plate 1 45+2 0 Boca Juniors     <- score banner (after first poll)
//!
//! | River Plate | Boca Juniors |             <- lineup table
//! |:-----------:|:------------:|
//! |   Armani    |   Andrada    |
//!
//! * 23' - GOOOO...OL de River Plate Borré, Enzo Pérez   <- event log
//! * 40' - tarjeta Amarilla para Tevez
//! ```

pub mod markdown;
