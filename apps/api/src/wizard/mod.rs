//! Page-state building blocks shared by the interview and job-post pages.

pub mod controller;
pub mod modal;
pub mod notice;
pub mod pipeline;
pub mod store;
