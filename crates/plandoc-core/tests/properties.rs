//! Pipeline properties over generated documents and batches

use plandoc_core::artifact::{join_lines, split_lines};
use plandoc_core::composition::{ChangeProposal, Destination, Directive, InsertionPlan};
use plandoc_core::review::DiffEngine;
use plandoc_test_utils::{dest, items_in, promotion, reconcile};
use proptest::prelude::*;

const TASKS: &[&str] = &[
    "Fix login redirect",
    "Write docs",
    "Profile startup",
    "Add dark mode",
    "Ship v1",
    "Rotate keys",
];
const SECTIONS: &[&str] = &["Current", "Later", "Done"];
const DESTINATIONS: &[&str] = &["Current", "Later", "Done", "Research"];
const HEADINGS: &[&str] = &["UI", "Perf", "Ops"];

fn section_body() -> impl Strategy<Value = (Vec<&'static str>, bool)> {
    (
        prop::sample::subsequence(TASKS.to_vec(), 0..=3),
        prop::bool::ANY,
    )
}

fn document() -> impl Strategy<Value = String> {
    (
        prop::sample::subsequence(SECTIONS.to_vec(), 0..=SECTIONS.len()),
        prop::collection::vec(section_body(), SECTIONS.len()),
        prop::bool::ANY,
    )
        .prop_map(|(sections, bodies, preamble)| {
            let mut text = String::new();
            if preamble {
                text.push_str("# Plan\n\nSome notes.\n\n");
            }
            for (name, (items, blank_after)) in sections.into_iter().zip(bodies) {
                text.push_str(&format!("## {name}\n"));
                for item in items {
                    text.push_str(&format!("- [ ] {item}\n"));
                }
                if blank_after {
                    text.push('\n');
                }
            }
            text
        })
}

fn proposal() -> impl Strategy<Value = ChangeProposal> {
    (
        prop::sample::select(TASKS.to_vec()),
        prop::sample::select(HEADINGS.to_vec()),
        prop::sample::select(DESTINATIONS.to_vec()),
    )
        .prop_map(|(text, heading, destination)| {
            ChangeProposal::groomed(text, "Ideas.md", Some(heading), dest(destination))
        })
}

fn batch() -> impl Strategy<Value = Vec<ChangeProposal>> {
    prop::collection::vec(proposal(), 0..6)
}

fn mixed_batch() -> impl Strategy<Value = Vec<ChangeProposal>> {
    let promote = (
        prop::sample::select(TASKS.to_vec()),
        prop::sample::select(DESTINATIONS.to_vec()),
    )
        .prop_map(|(text, destination)| promotion(text, destination));
    prop::collection::vec(prop_oneof![proposal(), promote], 0..8)
}

/// Apply a plan by walking the original lines once, never shifting indices
fn reference_apply(text: &str, plan: &InsertionPlan) -> String {
    let (lines, trailing) = split_lines(text);
    let mut deleted = vec![false; lines.len()];
    let mut before: Vec<Vec<String>> = vec![Vec::new(); lines.len() + 1];

    for directive in &plan.directives {
        match directive {
            Directive::Delete { start, end, .. } => deleted[*start..*end].fill(true),
            Directive::Insert { line, lines: planned, .. } => {
                before[*line].extend(planned.iter().map(|p| p.render()));
            }
            Directive::CreateSection { line, name, level, blank_before, lines: planned } => {
                if *blank_before {
                    before[*line].push(String::new());
                }
                before[*line].push(format!("{} {name}", "#".repeat(usize::from(*level))));
                before[*line].extend(planned.iter().map(|p| p.render()));
            }
        }
    }

    let mut out = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        out.append(&mut before[index]);
        if !deleted[index] {
            out.push(line.clone());
        }
    }
    out.append(&mut before[lines.len()]);
    join_lines(&out, trailing || (lines.is_empty() && !out.is_empty()))
}

proptest! {
    #[test]
    fn rerunning_a_batch_changes_nothing(doc in document(), batch in batch()) {
        let first = reconcile(&doc, &batch);
        let second = reconcile(&first.text, &batch);
        prop_assert_eq!(&second.text, &first.text);
        prop_assert_eq!(second.report.apply.inserted_lines, 0);
        prop_assert_eq!(second.report.apply.deleted_lines, 0);
    }

    #[test]
    fn every_placed_text_lands_exactly_once(doc in document(), batch in batch()) {
        let result = reconcile(&doc, &batch);
        for proposal in &batch {
            let Destination::Section(section) = &proposal.suggested_destination else {
                continue;
            };
            let items = items_in(&result.text, section.as_str());
            let hits = items.iter().filter(|item| **item == proposal.text).count();
            prop_assert_eq!(hits, 1, "{} in {}:\n{}", proposal.text, section, result.text);
        }
    }

    #[test]
    fn unrelated_lines_survive(doc in document(), batch in batch()) {
        let result = reconcile(&doc, &batch);
        prop_assert_eq!(result.report.apply.deleted_lines, 0);
        let mut remaining = result.text.lines();
        for line in doc.lines() {
            prop_assert!(remaining.any(|l| l == line), "lost line {:?}", line);
        }
    }

    #[test]
    fn pipeline_output_diff_round_trips(doc in document(), batch in batch()) {
        let result = reconcile(&doc, &batch);
        let mut block = DiffEngine::new().diff(&doc, &result.text);
        prop_assert_eq!(block.apply_accepted(), doc.clone());
        block.accept_all();
        prop_assert_eq!(block.apply_accepted(), result.text.clone());
        block.reject_all();
        prop_assert_eq!(block.apply_accepted(), doc);
    }

    #[test]
    fn descending_application_matches_reference(doc in document(), batch in mixed_batch()) {
        let result = reconcile(&doc, &batch);
        prop_assert!(result.report.is_complete());
        prop_assert_eq!(result.text, reference_apply(&doc, &result.plan));
    }
}
