use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, instrument};

use super::config::{FilterConfig, FilterMode, TieBreak};
use super::descriptors::Descriptors;
use super::error::EngineError;

/// Minimum population size worth filtering; below this every conformer
/// survives.
const MIN_POPULATION: usize = 4;

/// Computes the sorted, deduplicated list of conformer indices to remove
/// from the population described by `descriptors`.
///
/// Keep-listed indices are never removed in any mode. The RNG is consulted
/// only by static mode with the random tie-break; passing a seeded RNG makes
/// that mode reproducible.
#[instrument(skip_all, fields(mode = ?config.mode, population = descriptors.len()))]
pub fn compute_removals(
    descriptors: &Descriptors,
    config: &FilterConfig,
    rng: &mut impl Rng,
) -> Result<Vec<usize>, EngineError> {
    let population = descriptors.len();
    for &index in &config.keep {
        if index >= population {
            return Err(EngineError::KeepIndexOutOfRange { index, population });
        }
    }
    if population < MIN_POPULATION {
        debug!(population, "Population too small to filter");
        return Ok(Vec::new());
    }

    let keep: HashSet<usize> = config.keep.iter().copied().collect();
    let mut removed = match config.mode {
        FilterMode::DynamicAll => {
            let combined = combined_totals(descriptors);
            let order = sorted_order(&combined);
            sweep(&order, &combined, config.combined_tolerance(), None, &keep)
        }
        FilterMode::DynamicSeparate => {
            let bond_order = sorted_order(&descriptors.bond_totals);
            let bond_gate = (
                descriptors.angle_totals.as_slice(),
                config.angle_tolerance,
            );
            let mut removed = sweep(
                &bond_order,
                &descriptors.bond_totals,
                config.bond_tolerance_squared(),
                Some(bond_gate),
                &keep,
            );
            // Second pass with the axes swapped, over the survivors of the
            // first pass only.
            let gone: HashSet<usize> = removed.iter().copied().collect();
            let angle_order: Vec<usize> = sorted_order(&descriptors.angle_totals)
                .into_iter()
                .filter(|index| !gone.contains(index))
                .collect();
            let angle_gate = (
                descriptors.bond_totals.as_slice(),
                config.bond_tolerance_squared(),
            );
            removed.extend(sweep(
                &angle_order,
                &descriptors.angle_totals,
                config.angle_tolerance,
                Some(angle_gate),
                &keep,
            ));
            removed
        }
        FilterMode::Static { tie_break } => {
            let combined = combined_totals(descriptors);
            static_bins(
                &combined,
                config.combined_tolerance(),
                config.bin_origin,
                tie_break,
                &keep,
                rng,
            )
        }
    };

    removed.sort_unstable();
    removed.dedup();
    debug!(removed = removed.len(), "Filtering complete");
    Ok(removed)
}

fn combined_totals(descriptors: &Descriptors) -> Vec<f64> {
    descriptors
        .bond_totals
        .iter()
        .zip(&descriptors.angle_totals)
        .map(|(b, a)| b + a)
        .collect()
}

/// Indices sorted ascending by value, ties broken by index.
fn sorted_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

/// One left-to-right sweep over the value-sorted population.
///
/// The current survivor acts as the anchor: each next element closer than
/// `tolerance` to the anchor (and, when a gate is given, within the gate
/// tolerance on the gate axis) is removed, so a run of near-identical values
/// collapses onto its anchor. A removed element does not advance the anchor;
/// a surviving element becomes the new anchor.
///
/// When the candidate for removal is keep-listed, the comparison flips: an
/// unprotected anchor is removed instead and the protected element anchors
/// the run. Two protected elements never remove each other.
fn sweep(
    order: &[usize],
    primary: &[f64],
    tolerance: f64,
    gate: Option<(&[f64], f64)>,
    keep: &HashSet<usize>,
) -> Vec<usize> {
    let mut removed = Vec::new();
    let Some((&first, rest)) = order.split_first() else {
        return removed;
    };
    let mut anchor = first;
    for &current in rest {
        if primary[current] - primary[anchor] < tolerance {
            let gated_close = gate
                .map(|(values, gate_tolerance)| {
                    (values[current] - values[anchor]).abs() < gate_tolerance
                })
                .unwrap_or(true);
            if gated_close {
                if !keep.contains(&current) {
                    removed.push(current);
                    continue;
                }
                if !keep.contains(&anchor) {
                    removed.push(anchor);
                    anchor = current;
                    continue;
                }
            }
        }
        anchor = current;
    }
    removed
}

/// Fixed-width binning over the combined scalar. Every occupied bin keeps
/// exactly one representative; keep-listed members always survive and, when
/// present, decide the bin for the others.
fn static_bins(
    values: &[f64],
    bin_width: f64,
    requested_origin: Option<f64>,
    tie_break: TieBreak,
    keep: &HashSet<usize>,
    rng: &mut impl Rng,
) -> Vec<usize> {
    let order = sorted_order(values);
    let mut removed = Vec::new();
    let Some(&lowest) = order.first() else {
        return removed;
    };

    // The origin never exceeds the smallest value: a requested origin above
    // it is shifted down by whole bin widths so binning stays aligned to the
    // caller's grid.
    let minimum = values[lowest];
    let origin = match requested_origin {
        None => minimum,
        Some(origin) if origin <= minimum => origin,
        Some(origin) => {
            let steps = ((origin - minimum) / bin_width).ceil();
            origin - steps * bin_width
        }
    };

    let mut current_bin: Option<i64> = None;
    let mut members: Vec<usize> = Vec::new();
    for &index in &order {
        let bin = ((values[index] - origin) / bin_width).floor() as i64;
        if current_bin == Some(bin) {
            members.push(index);
        } else {
            resolve_bin(&members, tie_break, keep, rng, &mut removed);
            current_bin = Some(bin);
            members.clear();
            members.push(index);
        }
    }
    resolve_bin(&members, tie_break, keep, rng, &mut removed);
    removed
}

fn resolve_bin(
    members: &[usize],
    tie_break: TieBreak,
    keep: &HashSet<usize>,
    rng: &mut impl Rng,
    removed: &mut Vec<usize>,
) {
    if members.len() < 2 {
        return;
    }
    if members.iter().any(|index| keep.contains(index)) {
        removed.extend(members.iter().filter(|index| !keep.contains(index)));
        return;
    }
    let survivor = match tie_break {
        TieBreak::LowestIndex => members.iter().copied().min().unwrap_or(members[0]),
        TieBreak::Random => members[rng.gen_range(0..members.len())],
    };
    removed.extend(members.iter().filter(|&&index| index != survivor));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn descriptors(bond_totals: &[f64], angle_totals: &[f64]) -> Descriptors {
        Descriptors {
            bond_values: bond_totals.iter().map(|&v| vec![v]).collect(),
            angle_values: angle_totals.iter().map(|&v| vec![v]).collect(),
            bond_totals: bond_totals.to_vec(),
            angle_totals: angle_totals.to_vec(),
        }
    }

    fn config(mode: FilterMode) -> FilterConfig {
        FilterConfig {
            mode,
            ..FilterConfig::default()
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn identical_conformers_collapse_to_one_survivor() {
        let descriptors = descriptors(&[5.0; 5], &[120.0; 5]);
        let removed = compute_removals(
            &descriptors,
            &config(FilterMode::DynamicAll),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(removed, vec![1, 2, 3, 4]);
    }

    #[test]
    fn small_populations_are_never_filtered() {
        let descriptors = descriptors(&[1.0, 1.0, 1.0], &[90.0, 90.0, 90.0]);
        let removed = compute_removals(
            &descriptors,
            &config(FilterMode::DynamicAll),
            &mut rng(),
        )
        .unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn sub_tolerance_perturbations_are_removed() {
        // Combined tolerance with defaults: 0.1^2 + 0.1 = 0.11. A 0.001
        // Angstrom^2 wiggle sits far inside it.
        let descriptors = descriptors(
            &[5.000, 5.001, 5.002, 8.0, 9.0],
            &[100.0, 100.0, 100.0, 100.0, 100.0],
        );
        let removed = compute_removals(
            &descriptors,
            &config(FilterMode::DynamicAll),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(removed, vec![1, 2]);
    }

    #[test]
    fn tight_tolerances_keep_small_perturbations() {
        let descriptors = descriptors(
            &[5.000, 5.001, 5.002, 8.0, 9.0],
            &[100.0, 100.0, 100.0, 100.0, 100.0],
        );
        let config = FilterConfig {
            bond_tolerance: 0.0001,
            angle_tolerance: 0.0001,
            ..FilterConfig::default()
        };
        let removed = compute_removals(&descriptors, &config, &mut rng()).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn wider_tolerances_never_remove_fewer() {
        let descriptors = descriptors(
            &[1.0, 1.05, 1.4, 1.45, 2.0, 2.6],
            &[0.0; 6],
        );
        let narrow = FilterConfig {
            bond_tolerance: 0.1,
            angle_tolerance: 0.01,
            ..FilterConfig::default()
        };
        let wide = FilterConfig {
            bond_tolerance: 0.5,
            angle_tolerance: 0.5,
            ..FilterConfig::default()
        };
        let removed_narrow =
            compute_removals(&descriptors, &narrow, &mut rng()).unwrap();
        let removed_wide = compute_removals(&descriptors, &wide, &mut rng()).unwrap();
        assert!(removed_wide.len() >= removed_narrow.len());
        assert!(removed_narrow.iter().all(|i| removed_wide.contains(i)));
    }

    #[test]
    fn keep_listed_conformers_always_survive() {
        let descriptors = descriptors(&[5.0; 5], &[120.0; 5]);
        let config = FilterConfig {
            keep: vec![2],
            ..FilterConfig::default()
        };
        let removed = compute_removals(&descriptors, &config, &mut rng()).unwrap();
        assert_eq!(removed, vec![0, 1, 3, 4]);
    }

    #[test]
    fn keep_indices_are_validated_against_the_population() {
        let descriptors = descriptors(&[1.0; 4], &[1.0; 4]);
        let config = FilterConfig {
            keep: vec![4],
            ..FilterConfig::default()
        };
        assert!(matches!(
            compute_removals(&descriptors, &config, &mut rng()),
            Err(EngineError::KeepIndexOutOfRange {
                index: 4,
                population: 4,
            })
        ));
    }

    #[test]
    fn separate_mode_only_removes_when_both_axes_agree() {
        // Bond totals nearly identical everywhere; angle totals split the
        // population into two well-separated groups.
        let descriptors = descriptors(
            &[5.0, 5.001, 5.002, 5.003],
            &[100.0, 100.001, 150.0, 150.001],
        );
        let removed = compute_removals(
            &descriptors,
            &config(FilterMode::DynamicSeparate),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(removed, vec![1, 3]);
    }

    #[test]
    fn separate_mode_unions_both_passes() {
        // 0 and 1 duplicate on both axes; 2 and 3 duplicate on both axes;
        // the groups are far apart.
        let descriptors = descriptors(
            &[5.0, 5.0001, 9.0, 9.0001],
            &[100.0, 100.01, 170.0, 170.01],
        );
        let removed = compute_removals(
            &descriptors,
            &config(FilterMode::DynamicSeparate),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(removed, vec![1, 3]);
    }

    #[test]
    fn static_mode_keeps_one_per_bin() {
        // Bin width with defaults is 0.11; values land in three bins.
        let descriptors = descriptors(
            &[0.00, 0.01, 0.02, 0.30, 0.31, 0.60],
            &[0.0; 6],
        );
        let config = FilterConfig {
            mode: FilterMode::Static {
                tie_break: TieBreak::LowestIndex,
            },
            ..FilterConfig::default()
        };
        let removed = compute_removals(&descriptors, &config, &mut rng()).unwrap();
        assert_eq!(removed, vec![1, 2, 4]);
    }

    #[test]
    fn static_mode_respects_a_requested_origin_grid() {
        // Origin above the minimum is shifted down by whole widths, so the
        // boundary at origin + n * width is preserved.
        let descriptors = descriptors(&[0.05, 0.10, 0.12, 0.16], &[0.0; 4]);
        let config = FilterConfig {
            mode: FilterMode::Static {
                tie_break: TieBreak::LowestIndex,
            },
            bond_tolerance: 0.1,
            angle_tolerance: 0.09,
            bin_origin: Some(1.0),
            ..FilterConfig::default()
        };
        // Width 0.1^2 + 0.09 = 0.1; shifted origin = 0.0, bins [0, 0.1),
        // [0.1, 0.2).
        let removed = compute_removals(&descriptors, &config, &mut rng()).unwrap();
        assert_eq!(removed, vec![2, 3]);
    }

    #[test]
    fn static_mode_protects_keep_listed_members() {
        let descriptors = descriptors(&[0.00, 0.01, 0.02, 0.50], &[0.0; 4]);
        let config = FilterConfig {
            mode: FilterMode::Static {
                tie_break: TieBreak::LowestIndex,
            },
            keep: vec![2],
            ..FilterConfig::default()
        };
        let removed = compute_removals(&descriptors, &config, &mut rng()).unwrap();
        assert_eq!(removed, vec![0, 1]);
    }

    #[test]
    fn static_random_tie_break_is_reproducible_per_seed() {
        let descriptors = descriptors(&[0.00, 0.01, 0.02, 0.50], &[0.0; 4]);
        let config = FilterConfig {
            mode: FilterMode::Static {
                tie_break: TieBreak::Random,
            },
            ..FilterConfig::default()
        };
        let first = compute_removals(&descriptors, &config, &mut rng()).unwrap();
        let second = compute_removals(&descriptors, &config, &mut rng()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(!first.contains(&3));
    }

    #[test]
    fn removal_lists_are_sorted_and_unique() {
        let descriptors = descriptors(
            &[3.0, 1.0, 3.0001, 1.0001, 2.0],
            &[0.0; 5],
        );
        let removed = compute_removals(
            &descriptors,
            &config(FilterMode::DynamicAll),
            &mut rng(),
        )
        .unwrap();
        assert!(removed.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(removed, vec![2, 3]);
    }
}
