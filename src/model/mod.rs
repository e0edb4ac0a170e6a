pub mod config;
pub mod guessers;
pub mod question;
pub mod stats;
pub mod summary;
