//! Candidate interview flow: CV upload, insights, AI interview, profile
//! details and the final application submission.

pub mod draft;
pub mod handlers;
pub mod schedule;
pub mod session;
pub mod submit;
