//! Job application and resume tracking.
//!
//! Two documents are kept: the job list, and the resume document (resume records,
//! tags, and the folder the resumes live in). Each is owned by a store that loads
//! the whole document, changes it in memory, and writes the whole thing back.

pub mod config;
pub mod error;
pub mod folder;
pub mod jobs;
pub mod models;
pub mod reconcile;
pub mod resumes;
pub mod review;
pub mod storage;
