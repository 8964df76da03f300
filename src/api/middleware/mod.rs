pub mod edge_guard;

pub use edge_guard::EdgeGuard;
