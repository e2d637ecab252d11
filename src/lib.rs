//! Live country clock: look up a country, then watch its local time tick.
//!
//! The pieces, leaf first: [`time_format`] turns an instant into a wall-clock
//! string, [`countries`] talks to the restcountries service, [`debounce`]
//! coalesces keystrokes into lookups, [`clock`] republishes the time every
//! second, and [`live_timer`] ties them together behind one controller.

pub mod browse;
pub mod clock;
pub mod config;
pub mod countries;
pub mod debounce;
pub mod error;
pub mod live_timer;
pub mod session;
pub mod time_format;
