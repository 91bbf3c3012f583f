mod headless;
mod keys;
mod player;
mod runner;

#[cfg(test)]
mod tests;

pub(crate) use runner::run_replay;
