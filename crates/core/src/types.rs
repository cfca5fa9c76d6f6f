//! Shared type aliases used across the workspace.

/// Session primary keys are v4 UUIDs, generated server-side at sign-in.
pub type SessionId = uuid::Uuid;

/// User identifiers are opaque text issued by an upstream identity system.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
