#[cfg(test)]
pub mod blinks_action_tests;
