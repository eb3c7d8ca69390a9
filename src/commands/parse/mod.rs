mod accumulator;
mod grid;
mod labels;
mod outline;
mod run;
mod state;

pub use run::run;
