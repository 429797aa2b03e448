//! Common test utilities for tenantgate
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{cluster::TestCluster, fixtures};
//!
//! #[actix_web::test]
//! async fn my_test() {
//!     let cluster = TestCluster::start(3, 0, AckPolicy::All, None);
//!     let token = fixtures::token("alice", &["admin"]);
//!     // ...
//! }
//! ```

pub mod cluster;
pub mod fixtures;

pub use cluster::{TestCluster, TestNode};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err matching a pattern
#[macro_export]
macro_rules! assert_err {
    ($expr:expr, $pattern:pat) => {
        match $expr {
            Err(e) => assert!(matches!(e, $pattern), "Unexpected error: {:?}", e),
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
        }
    };
}
