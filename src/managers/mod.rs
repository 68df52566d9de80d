// Threatmark state managers
// Managers handle stateful store operations over the database.

pub mod bookmark_manager;
