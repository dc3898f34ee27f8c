//! Router Module Index
//!
//! Routing is split by access tier. Each tier is assembled in its own module so that the
//! layer guarding it is applied once, at the module boundary.

/// Routes open to anonymous callers: health, login and the navigation guard.
pub mod public;

/// Routes behind the `AuthUser` middleware. Require a live session.
pub mod authenticated;

/// Routes restricted to the 'admin' role. Role checks happen in each handler.
pub mod admin;
