use rand::Rng;
use tracing::{info, instrument};

use crate::core::models::atom::Conformer;
use crate::core::models::indices::{AngleIndex, BondIndex, Fragment};
use crate::core::utils::elements::RadiusTable;
use crate::engine::config::FilterConfig;
use crate::engine::descriptors::Descriptors;
use crate::engine::error::EngineError;
use crate::engine::filter;
use crate::engine::histogram::{DiagnosticsOptions, DiagnosticsReport};
use crate::engine::perception::angles::AnglePerception;
use crate::engine::perception::bonds::BondPerception;

/// The bond and angle lists descriptors are evaluated over. Either supplied
/// by the caller or derived from a reference conformer.
#[derive(Debug, Clone, Default)]
pub struct Connectivity {
    pub bonds: Vec<BondIndex>,
    pub angles: Vec<AngleIndex>,
}

/// Everything a deduplication run produces.
#[derive(Debug, Clone)]
pub struct DedupOutcome {
    /// Indices removed from the population, sorted ascending.
    pub removed: Vec<usize>,
    /// Surviving indices, sorted ascending.
    pub kept: Vec<usize>,
    /// The connectivity the run evaluated.
    pub connectivity: Connectivity,
    /// Descriptors of the full input population.
    pub descriptors: Descriptors,
    /// Descriptor distributions before filtering.
    pub diagnostics_initial: DiagnosticsReport,
    /// Descriptor distributions of the survivors.
    pub diagnostics_final: DiagnosticsReport,
}

/// Deduplicates `population` in place of nothing: the input is untouched and
/// the outcome reports which indices to drop.
///
/// When `connectivity` is `None` it is perceived from the first conformer;
/// perceived connectivity gains cross-fragment anchor bonds and angles when
/// the reference splits into several fragments, so disconnected systems
/// still contribute inter-fragment geometry to the descriptors.
#[instrument(skip_all, name = "dedup", fields(population = population.len()))]
pub fn run(
    population: &[Conformer],
    connectivity: Option<Connectivity>,
    config: &FilterConfig,
    radii: &RadiusTable,
    diagnostics: DiagnosticsOptions,
    rng: &mut impl Rng,
) -> Result<DedupOutcome, EngineError> {
    let connectivity = match connectivity {
        Some(connectivity) => connectivity,
        None => match population.first() {
            Some(reference) => derive_connectivity(reference, radii)?,
            None => Connectivity::default(),
        },
    };

    let descriptors =
        Descriptors::compute(population, &connectivity.bonds, &connectivity.angles)?;
    let bond_width = config.bond_tolerance_squared();
    let angle_width = config.angle_tolerance;
    let diagnostics_initial = DiagnosticsReport::compute(
        &descriptors.bond_values,
        &descriptors.angle_values,
        diagnostics,
        bond_width,
        angle_width,
    );

    let removed = filter::compute_removals(&descriptors, config, rng)?;
    let kept: Vec<usize> =
        (0..population.len()).filter(|i| !removed.contains(i)).collect();

    let surviving_bonds: Vec<Vec<f64>> = kept
        .iter()
        .map(|&i| descriptors.bond_values[i].clone())
        .collect();
    let surviving_angles: Vec<Vec<f64>> = kept
        .iter()
        .map(|&i| descriptors.angle_values[i].clone())
        .collect();
    let diagnostics_final = DiagnosticsReport::compute(
        &surviving_bonds,
        &surviving_angles,
        diagnostics,
        bond_width,
        angle_width,
    );

    info!(
        population = population.len(),
        removed = removed.len(),
        kept = kept.len(),
        "Deduplication complete"
    );
    Ok(DedupOutcome {
        removed,
        kept,
        connectivity,
        descriptors,
        diagnostics_initial,
        diagnostics_final,
    })
}

/// The outcome of filtering a population against a reference set.
#[derive(Debug, Clone)]
pub struct CrossOutcome {
    /// Population indices removed for duplicating the reference set or each
    /// other, sorted ascending.
    pub removed: Vec<usize>,
    /// Surviving population indices, sorted ascending.
    pub kept: Vec<usize>,
    /// The connectivity the run evaluated.
    pub connectivity: Connectivity,
}

/// Removes from `population` every conformer that duplicates a member of
/// `reference` (or an earlier survivor of `population` itself).
///
/// Both sets are filtered as one pooled population with every reference
/// conformer keep-listed, so reference members never appear in the removal
/// list and population duplicates collapse onto them. Caller keep indices
/// address `population`.
#[instrument(skip_all, name = "dedup_cross", fields(
    reference = reference.len(),
    population = population.len()
))]
pub fn run_cross(
    reference: &[Conformer],
    population: &[Conformer],
    connectivity: Option<Connectivity>,
    config: &FilterConfig,
    radii: &RadiusTable,
    rng: &mut impl Rng,
) -> Result<CrossOutcome, EngineError> {
    let offset = reference.len();
    for &index in &config.keep {
        if index >= population.len() {
            return Err(EngineError::KeepIndexOutOfRange {
                index,
                population: population.len(),
            });
        }
    }

    let pooled: Vec<Conformer> = reference
        .iter()
        .chain(population.iter())
        .cloned()
        .collect();
    let mut pooled_config = config.clone();
    pooled_config.keep = (0..offset)
        .chain(config.keep.iter().map(|&i| i + offset))
        .collect();

    let outcome = run(
        &pooled,
        connectivity,
        &pooled_config,
        radii,
        DiagnosticsOptions::none(),
        rng,
    )?;
    let removed: Vec<usize> = outcome
        .removed
        .iter()
        .filter_map(|&i| i.checked_sub(offset))
        .collect();
    let kept: Vec<usize> =
        (0..population.len()).filter(|i| !removed.contains(i)).collect();

    info!(
        removed = removed.len(),
        kept = kept.len(),
        "Cross-filtration complete"
    );
    Ok(CrossOutcome {
        removed,
        kept,
        connectivity: outcome.connectivity,
    })
}

/// Perceives bonds and angles from `reference` and, when the bond graph has
/// two or more fragments, adds anchor connections tying the fragments
/// together.
pub fn derive_connectivity(
    reference: &Conformer,
    radii: &RadiusTable,
) -> Result<Connectivity, EngineError> {
    let bonds = BondPerception::perceive(reference, radii)?;
    let angles = AnglePerception::perceive(reference.len(), &bonds);
    let mut connectivity = Connectivity {
        bonds: bonds.bonded.clone(),
        angles: angles.angles.clone(),
    };
    if bonds.fragments.len() >= 2 {
        let (anchor_bonds, anchor_angles) = cross_fragment_anchors(&bonds.fragments);
        connectivity.bonds.extend(anchor_bonds);
        connectivity.angles.extend(anchor_angles);
    }
    Ok(connectivity)
}

/// Anchor connections across fragments: the first fragment's first atom is
/// bonded to every atom of every other fragment, and the first two atoms of
/// the first multi-atom fragment form an angle with every atom outside it.
/// With only singleton fragments, the first two singletons anchor angles to
/// the rest.
fn cross_fragment_anchors(fragments: &[Fragment]) -> (Vec<BondIndex>, Vec<AngleIndex>) {
    let mut bonds = Vec::new();
    let mut angles = Vec::new();
    let Some((first, rest)) = fragments.split_first() else {
        return (bonds, angles);
    };
    let Some(&anchor) = first.first() else {
        return (bonds, angles);
    };
    for fragment in rest {
        for &atom in fragment {
            bonds.push(BondIndex::new(anchor, atom));
        }
    }

    if let Some((position, pair)) = fragments
        .iter()
        .enumerate()
        .find(|(_, fragment)| fragment.len() >= 2)
    {
        let (at1, at2) = (pair[0], pair[1]);
        for (current, fragment) in fragments.iter().enumerate() {
            if current == position {
                continue;
            }
            for &atom in fragment {
                angles.push(AngleIndex::new(at1, at2, atom));
            }
        }
    } else if fragments.len() >= 3 {
        let (at1, at2) = (fragments[0][0], fragments[1][0]);
        for fragment in &fragments[2..] {
            if let Some(&atom) = fragment.first() {
                angles.push(AngleIndex::new(at1, at2, atom));
            }
        }
    }
    (bonds, angles)
}
