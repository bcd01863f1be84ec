//! Property tests for the constrained optimizer.

use proptest::prelude::*;

use cadence_core::config::OptimizerConfig;
use cadence_core::model::{ScoreComponents, PLATFORM_PRIORS};
use cadence_optimizer::optimize;

fn arb_pair() -> impl Strategy<Value = (ScoreComponents, bool)> {
    (
        prop::array::uniform5(0.0f64..=100.0),
        prop::bool::ANY,
    )
        .prop_map(|(c, converted)| {
            (
                ScoreComponents {
                    data_quality: c[0],
                    authority: c[1],
                    company_fit: c[2],
                    timing: c[3],
                    risk: c[4],
                },
                converted,
            )
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For arbitrary outcome data the result is always a usable vector:
    /// inside the box bounds, summing to one, and never worse than the
    /// starting point.
    #[test]
    fn output_is_always_valid(pairs in prop::collection::vec(arb_pair(), 0..120)) {
        let result = optimize(&pairs, &PLATFORM_PRIORS, &OptimizerConfig::default());
        prop_assert!(result.weights.is_valid());
        prop_assert!(result.objective >= result.initial_objective);
        if !result.converged {
            prop_assert_eq!(result.weights, PLATFORM_PRIORS);
        }
    }

    /// Determinism: the solver carries no hidden state between runs.
    #[test]
    fn runs_are_reproducible(pairs in prop::collection::vec(arb_pair(), 0..80)) {
        let cfg = OptimizerConfig::default();
        let a = optimize(&pairs, &PLATFORM_PRIORS, &cfg);
        let b = optimize(&pairs, &PLATFORM_PRIORS, &cfg);
        prop_assert_eq!(a, b);
    }
}
