pub mod api;
pub mod snippets;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
