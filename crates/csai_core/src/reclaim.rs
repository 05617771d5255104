//! Reclaim target selection.
//!
//! Picks the single most metal-efficient feature near a constructor that
//! the constructor can actually reach and whose metal fits in storage.
//! Candidates are scored by `metal / distance`; the best one must beat
//! [`ReclaimConfig::min_score`] or the trip is not worth it.
//!
//! The scoring itself ([`find_best_reclaim_target`]) is a pure function
//! over a snapshot. [`ReclaimSelector`] gathers that snapshot from the
//! host.

use serde::{Deserialize, Serialize};

use crate::config::ReclaimConfig;
use crate::error::Result;
use crate::host::{AiCallback, AreaId, DebugMarker, FeatureId, MovementClass, UnitId};
use crate::math::Position;

/// Distances below this are scored as if they were this far.
///
/// Keeps the score finite for a feature lying exactly under the searcher.
pub const MIN_SCORING_DISTANCE: f64 = 1.0;

/// Marker drawn at a chosen reclaim target in debug mode.
const RECLAIM_MARKER_UNIT: &str = "armmex";
const RECLAIM_MARKER_FRAMES: u32 = 200;

/// A salvageable map feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReclaimableFeature {
    /// Host feature id.
    pub id: FeatureId,
    /// Position in world space.
    pub position: Position,
    /// Recoverable metal.
    pub metal: f64,
}

/// A scored reclaim option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReclaimCandidate {
    /// The feature.
    pub feature: ReclaimableFeature,
    /// Distance from the searcher.
    pub distance: f64,
    /// `metal / distance`.
    pub score: f64,
}

/// Snapshot of the searcher's situation.
#[derive(Debug, Clone, Copy)]
pub struct ReclaimQuery<'a> {
    /// Current simulation frame.
    pub frame: u64,
    /// Where distances are measured from.
    pub searcher: Position,
    /// The searcher's movement class.
    pub movement_class: &'a MovementClass,
    /// Free metal storage; larger features are skipped.
    pub free_storage: f64,
}

/// Metal-per-distance score.
#[must_use]
pub fn reclaim_score(metal: f64, distance: f64) -> f64 {
    metal / distance.max(MIN_SCORING_DISTANCE)
}

/// Best reachable candidate above `min_score`, if any.
///
/// Ties keep the first maximal candidate in `features` order.
/// Errors from `area_of` are returned unchanged.
pub fn best_reclaim_candidate<A>(
    query: &ReclaimQuery<'_>,
    features: &[ReclaimableFeature],
    min_score: f64,
    mut area_of: A,
) -> Result<Option<ReclaimCandidate>>
where
    A: FnMut(&MovementClass, Position) -> Result<AreaId>,
{
    // Feature metal reads as zero on the first frame
    if query.frame == 0 {
        return Ok(None);
    }

    let current_area = area_of(query.movement_class, query.searcher)?;
    let mut best: Option<ReclaimCandidate> = None;

    for feature in features {
        if !feature.metal.is_finite()
            || feature.metal <= 0.0
            || feature.metal > query.free_storage
        {
            continue;
        }

        let distance = query.searcher.distance(feature.position);
        let score = reclaim_score(feature.metal, distance);

        if area_of(query.movement_class, feature.position)? != current_area {
            tracing::trace!(feature = feature.id, "Reclaim candidate unreachable");
            continue;
        }

        if best.map_or(true, |b| score > b.score) {
            tracing::debug!(
                feature = feature.id,
                distance,
                metal = feature.metal,
                score,
                "Potential reclaim"
            );
            best = Some(ReclaimCandidate {
                feature: *feature,
                distance,
                score,
            });
        }
    }

    Ok(best.filter(|b| b.score > min_score))
}

/// Position of the best reclaim target, if any.
pub fn find_best_reclaim_target<A>(
    query: &ReclaimQuery<'_>,
    features: &[ReclaimableFeature],
    min_score: f64,
    area_of: A,
) -> Result<Option<Position>>
where
    A: FnMut(&MovementClass, Position) -> Result<AreaId>,
{
    Ok(best_reclaim_candidate(query, features, min_score, area_of)?
        .map(|candidate| candidate.feature.position))
}

/// Host-driven reclaim search for a constructor.
#[derive(Debug, Clone, Copy)]
pub struct ReclaimSelector {
    config: ReclaimConfig,
    debug: bool,
}

impl ReclaimSelector {
    /// Create a selector.
    #[must_use]
    pub const fn new(config: ReclaimConfig, debug: bool) -> Self {
        Self { config, debug }
    }

    /// Selector parameters.
    #[must_use]
    pub const fn config(&self) -> &ReclaimConfig {
        &self.config
    }

    /// Enable or disable debug markers.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Gather nearby features from the host.
    pub fn nearby_features<H: AiCallback + ?Sized>(
        &self,
        host: &H,
        center: Position,
    ) -> Result<Vec<ReclaimableFeature>> {
        host.features_within(center, self.config.search_radius)?
            .into_iter()
            .map(|id| {
                let info = host.feature(id)?;
                Ok(ReclaimableFeature {
                    id,
                    position: info.position,
                    metal: info.metal,
                })
            })
            .collect()
    }

    /// Find the best reclaim target for `unit`.
    ///
    /// Draws a marker at the target when debug drawing is enabled.
    pub fn select<H: AiCallback + ?Sized>(
        &self,
        host: &mut H,
        unit: UnitId,
        movement_class: &MovementClass,
    ) -> Result<Option<ReclaimCandidate>> {
        let frame = host.current_frame();
        if frame == 0 {
            return Ok(None);
        }

        let searcher = host.unit_position(unit)?;
        let free_storage = host.resources()?.free_metal_storage();
        tracing::debug!(unit, free_storage, "Searching for reclaim");

        let features = self.nearby_features(&*host, searcher)?;
        let query = ReclaimQuery {
            frame,
            searcher,
            movement_class,
            free_storage,
        };
        let best = {
            let host = &*host;
            best_reclaim_candidate(&query, &features, self.config.min_score(), |class, pos| {
                host.area_of(class, pos)
            })?
        };

        match &best {
            Some(candidate) => {
                tracing::info!(
                    unit,
                    feature = candidate.feature.id,
                    position = %candidate.feature.position,
                    "Reclaim found"
                );
                if self.debug {
                    host.draw_marker(DebugMarker {
                        unit_name: RECLAIM_MARKER_UNIT.to_string(),
                        position: candidate.feature.position,
                        duration_frames: RECLAIM_MARKER_FRAMES,
                    });
                }
            }
            None => tracing::debug!(unit, "No reclaim within parameters"),
        }

        Ok(best)
    }
}
