//! Request middleware and the extractors that depend on it.
//!
//! - [`anonymous_user::assign_anonymous_user`] -- Issues the `anonymous-user-id` cookie.
//! - [`anonymous_user::AnonymousUser`] -- The caller's anonymous id.

pub mod anonymous_user;
