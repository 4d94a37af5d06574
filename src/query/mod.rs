// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query module - ranking, snippets, and corpus listing

pub mod scan;
pub mod search;
pub mod snippet;
