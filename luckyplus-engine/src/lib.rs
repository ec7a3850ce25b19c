pub mod aggregate;
pub mod check;
pub mod error;
pub mod history;
pub mod matcher;
pub mod predictor;
pub mod prize;
pub mod round;
pub mod source;
pub mod tally;
