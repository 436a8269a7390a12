//! Property-based tests for the runner
//!
//! For any mix of succeeding and failing steps, a run either completes with
//! an output for every step, or fails at exactly the first failing step with
//! only the earlier outputs committed.

use super::*;
use proptest::prelude::*;
use serde_json::json;

fn build(outcomes: &[bool]) -> Workflow {
    let mut builder = Workflow::builder("prop", Shape::Any);
    for (index, ok) in outcomes.iter().copied().enumerate() {
        builder = builder.then(FnStep::new(
            format!("step-{index}"),
            Shape::Any,
            Shape::number(),
            move |_| async move {
                if ok {
                    Ok(json!(index))
                } else {
                    Err(StepError::failed(format!("step {index} failed")))
                }
            },
        ));
    }
    match builder.commit() {
        Ok(workflow) => workflow,
        Err(e) => panic!("non-empty workflow rejected: {e}"),
    }
}

fn run(workflow: &Workflow) -> RunResult {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(workflow.create_run().start(json!({ "city": "anywhere" })))
}

proptest! {
    #[test]
    fn prop_complete_or_single_failure(outcomes in prop::collection::vec(any::<bool>(), 1..8)) {
        let result = run(&build(&outcomes));

        match outcomes.iter().position(|ok| !ok) {
            None => {
                prop_assert_eq!(result.status, RunStatus::Completed);
                prop_assert!(result.failure.is_none());
                prop_assert_eq!(result.context.len(), outcomes.len());
                for index in 0..outcomes.len() {
                    let id = format!("step-{index}");
                    prop_assert_eq!(result.step_output(&id), Some(&json!(index)));
                }
            }
            Some(first_failure) => {
                prop_assert_eq!(result.status, RunStatus::Failed);
                prop_assert!(result.output().is_none());
                let failure = result.failure.as_ref().unwrap();
                prop_assert_eq!(&failure.step_id, &format!("step-{first_failure}"));
                prop_assert_eq!(result.context.len(), first_failure);
            }
        }
    }

    #[test]
    fn prop_terminal_status(outcomes in prop::collection::vec(any::<bool>(), 1..6)) {
        let result = run(&build(&outcomes));
        prop_assert!(result.status.is_terminal());
        prop_assert_eq!(result.failure.is_some(), result.status == RunStatus::Failed);
    }
}
