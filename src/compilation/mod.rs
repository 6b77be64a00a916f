//! Sessions of chained submissions.

pub mod compilation;

#[cfg(test)]
mod tests;
