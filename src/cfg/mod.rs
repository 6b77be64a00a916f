//! Control-flow graphs over lowered statement lists.

pub mod graph;
