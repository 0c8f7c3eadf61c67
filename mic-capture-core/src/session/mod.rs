pub mod engine;
pub mod manual;
