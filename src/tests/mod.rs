// Test modules for recovery-engine
//
// Test organization: each source module has a corresponding test file that
// focuses on behavior verification.

// Shared fixtures
pub mod helpers;

pub mod auto_retry;
pub mod strategy;
