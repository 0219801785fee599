//! The `services` module provides the data-access API for the handlers.
//! It encapsulates the query logic so routes work with entity models
//! without knowing about the underlying schema.
//!
//! Functions are generic over [`sea_orm::ConnectionTrait`] so the same
//! helpers run against the pooled connection or inside a transaction.

pub mod project_service;
pub mod tag_service;
