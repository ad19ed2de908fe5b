pub mod dispatch;
pub mod evaluation;
pub mod generation;
