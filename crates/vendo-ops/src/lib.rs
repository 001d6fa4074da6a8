pub mod descriptor;
pub mod ops_sync;
pub mod ops_tree;
