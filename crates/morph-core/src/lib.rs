pub mod broadcast;
pub mod config;
pub mod dictionary;
pub mod duel;
pub mod error;
pub mod feedback;
pub mod graph;
pub mod hint;
pub mod insight;
pub mod oracle;
pub mod protocol;
pub mod store;
pub mod word;
