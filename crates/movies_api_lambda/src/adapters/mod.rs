pub mod dynamo;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
pub mod table_store;
pub mod translate;
