pub mod calculators;
pub mod commands;
pub mod effectiveness;
pub mod engine;
pub mod rules;
pub mod state;

#[cfg(test)]
pub(crate) mod tests;
