pub mod parse;
pub mod status;
