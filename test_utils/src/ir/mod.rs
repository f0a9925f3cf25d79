pub mod documents;
pub mod fixture;
pub mod generator;
