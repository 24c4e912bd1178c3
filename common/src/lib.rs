//! Shared model and pure rules of the timesheet service.
//!
//! Everything in this crate is free of I/O: the backend loads the five record
//! collections into a [`model::snapshot::Snapshot`] and hands slices of it to
//! the functions in [`rules`].

pub mod jobs;
pub mod model;
pub mod requests;
pub mod rules;
