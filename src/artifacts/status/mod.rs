//! Working tree status inspection
//!
//! Compares the working tree against the staging area and the tip of the
//! current branch. `status_info` gathers the five report sections.

pub mod status_info;
