mod bootstrap;
mod gameplay;
mod loop_runner;
mod preferences;

pub(crate) use loop_runner::run;
