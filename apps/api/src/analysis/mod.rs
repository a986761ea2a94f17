//! Analysis API: forwards résumé/job-description uploads to the match API and
//! degrades to a static demo result when it is unavailable.

pub mod fallback;
pub mod handlers;
