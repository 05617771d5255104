//! Determinism testing utilities.
//!
//! The AI must issue the same orders for the same inputs. Replays,
//! regression scenarios and bug reports all rely on it.
//!
//! Sources of non-determinism to watch for:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Unit registries are `BTreeMap`s and iterate in unit id order.
//!
//! - **System randomness**: the nudge and tank choice RNGs are
//!   `ChaCha8Rng`s seeded from `AiConfig::seed`, on separate streams.
//!   Nothing else draws random numbers.
//!
//! - **Host order**: features are scored in the order the host returns
//!   them; ties keep the first.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use csai_core::ai::{Ai, AiEvent};
use csai_core::command::WireCommand;
use csai_core::config::AiConfig;
use csai_core::host::UnitId;
use serde::Serialize;

use crate::fixtures::FakeHost;

/// Orders a run gave, in issue order.
pub type OrderLog = Vec<(UnitId, WireCommand)>;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "AI is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run `run` several times on fresh state from `setup` and compare hashes.
///
/// # Example
///
/// ```ignore
/// let result = verify_determinism(
///     3,
///     || 0u64,
///     |n| *n += 1,
///     |n| *n,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Run, HashFn>(
    runs: usize,
    setup: Setup,
    run: Run,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Run: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = setup();
            run(&mut state);
            hash(&state)
        })
        .collect();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
    }
}

/// Feed `events` to a fresh AI on `host` and return every order it gave.
///
/// Event errors are ignored; the order log is what gets compared.
#[must_use]
pub fn run_events(config: &AiConfig, mut host: FakeHost, events: &[AiEvent]) -> OrderLog {
    let mut ai = Ai::new(config.clone());
    if ai.init(&mut host).is_err() {
        return host.orders;
    }
    for event in events {
        if let AiEvent::Update { frame } = event {
            host.frame = *frame;
        }
        let _ = ai.handle(&mut host, event.clone());
    }
    host.orders
}

/// Verify that replaying `events` always yields the same order log.
pub fn verify_order_determinism<Setup>(
    runs: usize,
    config: &AiConfig,
    setup: Setup,
    events: &[AiEvent],
) -> DeterminismResult
where
    Setup: Fn() -> FakeHost,
{
    verify_determinism(
        runs,
        || (setup(), Vec::new()),
        |(host, log): &mut (FakeHost, OrderLog)| {
            *log = run_events(config, host.clone(), events);
        },
        |(_, log): &(FakeHost, OrderLog)| compute_hash(log),
    )
}

/// Hash any serializable value through its RON text.
///
/// Floating-point fields make most AI types non-`Hash`; their RON form is
/// exact for identical values.
#[must_use]
pub fn compute_hash<T: Serialize + ?Sized>(value: &T) -> u64 {
    let text = ron::to_string(value).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for AI inputs.
pub mod strategies {
    use csai_core::economy::ResourceSnapshot;
    use csai_core::math::Position;
    use csai_core::reclaim::ReclaimableFeature;
    use proptest::prelude::*;

    /// A coordinate on a typical map (-5000 to 5000).
    pub fn arb_coordinate() -> impl Strategy<Value = f64> {
        (-5000i32..5000i32).prop_map(f64::from)
    }

    /// A ground position (y = 0).
    pub fn arb_position() -> impl Strategy<Value = Position> {
        (arb_coordinate(), arb_coordinate()).prop_map(|(x, z)| Position::new(x, 0.0, z))
    }

    /// Feature metal, including the empty and junk values hosts report.
    pub fn arb_metal() -> impl Strategy<Value = f64> {
        prop_oneof![
            Just(0.0),
            (-50i32..0i32).prop_map(f64::from),
            (1i32..2000i32).prop_map(f64::from),
        ]
    }

    /// A feature with a given id.
    pub fn arb_feature(id: i32) -> impl Strategy<Value = ReclaimableFeature> {
        (arb_position(), arb_metal()).prop_map(move |(position, metal)| ReclaimableFeature {
            id,
            position,
            metal,
        })
    }

    /// A list of features with ids `0..len`.
    pub fn arb_feature_list(max_len: usize) -> impl Strategy<Value = Vec<ReclaimableFeature>> {
        proptest::collection::vec((arb_position(), arb_metal()), 0..max_len).prop_map(|raw| {
            raw.into_iter()
                .zip(0..)
                .map(|((position, metal), id)| ReclaimableFeature {
                    id,
                    position,
                    metal,
                })
                .collect()
        })
    }

    /// Team resources with non-negative stock within storage.
    pub fn arb_resources() -> impl Strategy<Value = ResourceSnapshot> {
        (1i32..5000, 0i32..=100, 1i32..20000, 0i32..=100).prop_map(
            |(metal_storage, metal_pct, energy_storage, energy_pct)| {
                let metal_storage = f64::from(metal_storage);
                let energy_storage = f64::from(energy_storage);
                ResourceSnapshot::new(
                    metal_storage * f64::from(metal_pct) / 100.0,
                    metal_storage,
                    energy_storage * f64::from(energy_pct) / 100.0,
                    energy_storage,
                )
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csai_core::math::Position;
    use proptest::prelude::*;

    fn busy_map() -> FakeHost {
        FakeHost::new()
            .with_unit(1, "armcom", Position::new(100.0, 0.0, 100.0))
            .with_unit(2, "armcv", Position::new(200.0, 0.0, 100.0))
            .with_feature(1, Position::new(150.0, 0.0, 150.0), 40.0)
            .with_metal_spot(Position::new(300.0, 0.0, 300.0))
    }

    fn lifecycle() -> Vec<AiEvent> {
        vec![
            AiEvent::UnitFinished { unit: 1 },
            AiEvent::UnitFinished { unit: 2 },
            AiEvent::UnitMoveFailed { unit: 2 },
            AiEvent::Update { frame: 50 },
            AiEvent::UnitMoveFailed { unit: 2 },
            AiEvent::UnitIdle { unit: 1 },
        ]
    }

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, || 0u64, |n| *n += 100, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_detects_divergence() {
        let counter = std::cell::Cell::new(0u64);
        let result = verify_determinism(
            2,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |_| {},
            |n| *n,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 2);
    }

    #[test]
    fn test_order_log_is_reproducible() {
        let result = verify_order_determinism(4, &AiConfig::default(), busy_map, &lifecycle());
        result.assert_deterministic();
    }

    #[test]
    fn test_lifecycle_gives_orders() {
        let orders = run_events(&AiConfig::default(), busy_map(), &lifecycle());
        assert!(!orders.is_empty());
    }

    proptest! {
        /// Any seed replays identically.
        #[test]
        fn prop_any_seed_is_reproducible(seed in any::<u64>()) {
            let config = AiConfig { seed, ..AiConfig::default() };
            let result = verify_order_determinism(2, &config, busy_map, &lifecycle());
            prop_assert!(result.is_deterministic);
        }

        /// Random feature fields replay identically.
        #[test]
        fn prop_random_features_are_reproducible(
            features in strategies::arb_feature_list(20),
            resources in strategies::arb_resources(),
        ) {
            let setup = || {
                let mut host = busy_map().with_resources(resources);
                for feature in &features {
                    host = host.with_feature(feature.id + 100, feature.position, feature.metal);
                }
                host
            };
            let result = verify_order_determinism(2, &AiConfig::default(), setup, &lifecycle());
            prop_assert!(result.is_deterministic);
        }
    }
}
