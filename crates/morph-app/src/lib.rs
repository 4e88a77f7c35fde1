// Library root for the morph-duel driver, exposed so the command loop can be
// exercised from integration tests.

pub mod app;
