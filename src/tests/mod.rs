
#[cfg(test)]
mod controller_persist_tests;
