use cadence_core::{
    ActionExecutor, CoreError, Fact, JobRun, JobRunner, JobStatus, MapContext, NeverAbort, ParameterSpec,
    RuleActionAdapter, Transition,
};
use cadence_e2e_tests::utils::{complete_order, process_context};
use cadence_test_utils::{numbered_items, AbortAfterChecks, CountingDecision, CountingRule, ScriptedProcessor};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Item count plus the set of items that fail
fn failure_plan() -> impl Strategy<Value = (u64, BTreeSet<u64>)> {
    (1usize..40).prop_flat_map(|n| {
        proptest::collection::vec(any::<bool>(), n).prop_map(|mask| {
            let failing = mask
                .iter()
                .enumerate()
                .filter(|(_, fails)| **fails)
                .map(|(i, _)| i as u64 + 1)
                .collect();
            (mask.len() as u64, failing)
        })
    })
}

fn run_with_failures(n: u64, fail_on: &BTreeSet<u64>) -> JobRun {
    let processor = ScriptedProcessor::failing_on(fail_on.iter().copied());
    tokio_test::block_on(JobRunner::default().run(
        "property",
        numbered_items(n),
        |item| processor.process(item),
        &NeverAbort,
    ))
}

proptest! {
    /// Property: the job status follows from the failure count alone
    #[test]
    fn job_status_matches_failure_count((n, fail_on) in failure_plan()) {
        let run = run_with_failures(n, &fail_on);
        let failed = fail_on.len() as u64;

        prop_assert_eq!(run.processed(), n);
        prop_assert_eq!(run.failed(), failed);
        let expected = if failed == 0 {
            JobStatus::Success
        } else if failed < n {
            JobStatus::Warning
        } else {
            JobStatus::Error
        };
        prop_assert_eq!(run.status(), Some(expected));
    }

    /// Property: an abort before item k leaves exactly k-1 items processed
    #[test]
    fn abort_before_item_k((n, k) in (1u64..40).prop_flat_map(|n| (Just(n), 1..=n))) {
        let processor = ScriptedProcessor::default();
        let abort = AbortAfterChecks::new((k - 1) as usize);
        let run = tokio_test::block_on(JobRunner::default().run(
            "property",
            numbered_items(n),
            |item| processor.process(item),
            &abort,
        ));

        prop_assert_eq!(run.processed(), k - 1);
        prop_assert_eq!(run.status(), Some(JobStatus::Aborted));
        prop_assert!(!processor.seen().contains(&k));
    }

    /// Property: a rejected rule result never carries facts
    #[test]
    fn rejected_rules_have_no_facts(amount in -1000i64..1000) {
        let rule = CountingRule::new(
            "store-credit",
            vec![ParameterSpec::integer("amount").positive()],
            vec![Fact::new("store_credit", json!({ "amount": amount }))],
        );
        let adapter = RuleActionAdapter::new(Arc::new(rule));
        let ctx = MapContext::new("promo").with_parameter("amount", json!(amount));

        let result = tokio_test::block_on(adapter.apply(&ctx));
        prop_assert_eq!(result.is_applied(), amount > 0);
        if !result.is_applied() {
            prop_assert!(result.facts().is_empty());
        }
    }

    /// Property: identical contexts give identical transitions
    #[test]
    fn execution_is_repeatable(success in any::<bool>(), fail in any::<bool>()) {
        let outcome = if fail {
            Err(CoreError::ActionFailed("flaky".into()))
        } else {
            Ok(success)
        };
        let executor = ActionExecutor::simple(CountingDecision::new("repeatable", "order", outcome));

        let first = tokio_test::block_on(executor.execute(&process_context("p-1", complete_order("o-1"))));
        let second = tokio_test::block_on(executor.execute(&process_context("p-2", complete_order("o-1"))));
        prop_assert_eq!(&first, &second);

        let expected = if !fail && success { Transition::Ok } else { Transition::Nok };
        prop_assert_eq!(first, expected);
    }
}
