pub mod common;

mod token_acquire_and_retry;
