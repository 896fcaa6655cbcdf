//! Fuzz target for judge reply validation.
//!
//! Judge replies are untrusted model output. Whatever comes back, a plan is
//! either rejected or has exactly one accepted action among those proposed.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use steward::Action;
use steward::judge::parse_reply;

#[derive(Arbitrary, Debug)]
struct Input {
    reply: String,
    proposed: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let proposed: Vec<Action> = input
        .proposed
        .iter()
        .map(|i| Action::ALL[*i as usize % Action::ALL.len()])
        .collect();

    if let Ok(plan) = parse_reply(&input.reply, &proposed) {
        let (action, _) = plan.accepted().expect("validated plan has one accepted action");
        assert!(action == Action::Keep || proposed.contains(&action));
    }
});
