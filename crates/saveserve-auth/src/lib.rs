//! # saveserve-auth
//!
//! Authentication for SaveServe: JWT access/refresh tokens, Argon2id
//! password hashing with strength validation, and a database-backed
//! session manager.

pub mod jwt;
pub mod password;
pub mod session;
