//! Negotiation between builders and the controllers that want units.
//!
//! When a builder (factory or constructor) has nothing to do, every
//! registered [`UnitRequester`] is asked how badly it needs something the
//! builder can make. The highest positive priority wins; a requester whose
//! unit the builder cannot make is passed over for the next one.

use crate::build_table::BuildTable;
use crate::error::Result;
use crate::host::UnitId;
use crate::units::UnitDef;

/// A unit able to build others.
#[derive(Debug, Clone, PartialEq)]
pub struct Builder {
    /// The builder unit.
    pub unit: UnitId,
    /// Its definition.
    pub def: UnitDef,
}

impl Builder {
    /// Create a builder.
    #[must_use]
    pub fn new(unit: UnitId, def: UnitDef) -> Self {
        Self { unit, def }
    }

    /// Builder's unit name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Whether this builder lists `name` among its build options.
    #[must_use]
    pub fn can_build(&self, name: &str) -> bool {
        self.def.can_build(name)
    }
}

/// Something that wants units built.
pub trait UnitRequester {
    /// Name used in logs.
    fn requester_name(&self) -> &str;

    /// How badly a unit from `builder` is needed. Zero or less means not at all.
    fn priority_for(&self, builder: &Builder) -> f64;

    /// Name of the unit `builder` should make.
    ///
    /// Takes `&mut self` so requesters may draw from their own RNG.
    fn unit_wanted(&mut self, builder: &Builder) -> Option<String>;

    /// The request was granted and `def` is being built.
    fn building_for_you(&mut self, _def: &UnitDef) {}

    /// A unit being built for this requester was destroyed before finishing.
    fn request_destroyed(&mut self, _def: &UnitDef) {}
}

/// Indices of requesters with a positive priority, most urgent first.
///
/// Equal priorities keep slice order.
#[must_use]
pub fn rank_requesters(requesters: &[&mut dyn UnitRequester], builder: &Builder) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = requesters
        .iter()
        .enumerate()
        .map(|(index, requester)| (index, requester.priority_for(builder)))
        .filter(|(_, priority)| *priority > 0.0)
        .collect();
    // Stable sort: ties stay in slice order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (index, priority) in &ranked {
        tracing::debug!(
            requester = requesters[*index].requester_name(),
            priority,
            builder = builder.name(),
            "Potential requester"
        );
    }
    ranked.into_iter().map(|(index, _)| index).collect()
}

/// Index of the requester with the strictly highest positive priority.
///
/// Ties keep the first requester.
#[must_use]
pub fn pick_requester(requesters: &[&mut dyn UnitRequester], builder: &Builder) -> Option<usize> {
    rank_requesters(requesters, builder).first().copied()
}

/// A requester's winning claim on a builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Index of the requester in the slice passed to [`negotiate`].
    pub requester: usize,
    /// Unit to build.
    pub def: UnitDef,
}

impl Request {
    /// Tell the requester its unit is being built.
    ///
    /// Call only once the build order has actually been issued.
    pub fn grant(&self, requesters: &mut [&mut dyn UnitRequester]) {
        if let Some(requester) = requesters.get_mut(self.requester) {
            tracing::info!(
                requester = requester.requester_name(),
                unit = %self.def.name,
                "Granting unit request"
            );
            requester.building_for_you(&self.def);
        }
    }
}

/// Ask requesters what `builder` should make.
///
/// Requesters are tried from most to least urgent. One that wants nothing,
/// or wants a unit the builder cannot make, is skipped. Returns `None` if
/// nobody is left. A requester naming a unit missing from `table` is an
/// error.
pub fn negotiate(
    requesters: &mut [&mut dyn UnitRequester],
    builder: &Builder,
    table: &BuildTable,
) -> Result<Option<Request>> {
    for index in rank_requesters(requesters, builder) {
        let requester = &mut requesters[index];
        let Some(name) = requester.unit_wanted(builder) else {
            continue;
        };
        if !builder.can_build(&name) {
            tracing::debug!(
                requester = requester.requester_name(),
                unit = %name,
                builder = builder.name(),
                "Builder cannot make requested unit"
            );
            continue;
        }
        let def = table.require(&name)?.clone();
        return Ok(Some(Request {
            requester: index,
            def,
        }));
    }
    Ok(None)
}
