pub mod diagnostics;
pub mod features;
