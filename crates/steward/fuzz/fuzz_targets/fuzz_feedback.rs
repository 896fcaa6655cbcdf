//! Fuzz target for feedback parsing and merging.
//!
//! Feedback is user-written JSON; parsing and merging must reject bad input
//! with an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use steward::merge::{MergePolicy, merge, parse_feedback};

fuzz_target!(|data: &str| {
    if let Ok(feedback) = parse_feedback(data) {
        let headers: Vec<&str> = feedback.keys().map(String::as_str).collect();
        for policy in [MergePolicy::JudgeFirst, MergePolicy::ManualFirst] {
            let _ = merge(&headers, &feedback, policy);
        }
    }
});
