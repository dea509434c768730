pub mod outcome;
pub mod run;
