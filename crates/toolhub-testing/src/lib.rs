//! # Toolhub Testing
//!
//! Test doubles shared by the toolhub test suites.
//!
//! - **Mock Tools**: [`MockTool`] answers with canned content and records its calls
//! - **Fakes**: deterministic stand-ins for every standard tool collaborator
//!
//! ## Usage
//!
//! ```rust
//! use toolhub_core::ToolRegistry;
//! use toolhub_testing::MockTool;
//!
//! # tokio_test::block_on(async {
//! let spy = MockTool::new("spy");
//! let registry = ToolRegistry::new().with_tool(spy.clone()).unwrap();
//!
//! assert!(registry.invoke("other", serde_json::json!({})).await.is_err());
//! assert_eq!(spy.call_count(), 0);
//! # });
//! ```

/// Fake collaborators for the standard tools
pub mod fakes;
/// Mock tools for predictable testing
pub mod mock_tools;

pub use fakes::{
    CannedRunner, FailAt, FakeBrowser, PagedBlockSource, RecordingTrash, StubNewsSource,
};
pub use mock_tools::MockTool;
