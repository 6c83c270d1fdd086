//! Company-side job-post editor: buffered edits, publish/draft saves, logo
//! upload and listing revalidation.

pub mod editor;
pub mod handlers;
pub mod image;
pub mod revalidate;
