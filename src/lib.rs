//! Growth Allocator Library
//!
//! Splits a fixed acquisition budget across marketing channels.
//! Exposes the allocation engine and its configuration layer for use by the
//! CLI binary and tests.

pub mod allocation;
pub mod config;

pub use allocation::{
    AllocationComparator, AllocationError, AllocationReport, AllocationRun, Allocator,
    BaselineAllocator, OptimalAllocator,
};
pub use config::AllocatorConfig;
