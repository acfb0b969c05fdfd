/// League persistence trait and its backends.
pub mod league_store;
/// Backend-neutral entity definitions.
pub mod models;
/// Storage error type shared by every backend.
pub mod storage;
