pub mod acquirer;
pub mod token;
