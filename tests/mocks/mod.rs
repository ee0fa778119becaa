#![allow(dead_code)]

pub mod completions;
pub mod transcripts;
