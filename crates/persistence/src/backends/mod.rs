//! Storage backend implementations.
//!
//! | Backend | Feature | Role |
//! |---------|---------|------|
//! | Memory | always | terminal fallback, development |
//! | PostgreSQL | `postgres` | relational primary |
//! | MongoDB | `mongodb` | document replica |

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "mongodb")]
pub mod mongodb;
