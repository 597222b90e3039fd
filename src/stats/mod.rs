//! Derived statistics the API does not provide: team box-score totals,
//! season records and standings.

pub mod season;
pub mod standings;
pub mod team_game;
