use tracing::instrument;

/// A fixed-width histogram over one descriptor distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Occupancy per bin, lowest bin first.
    pub counts: Vec<usize>,
    /// Lower edge of the first bin (the minimum observed value).
    pub origin: f64,
    pub bin_width: f64,
}

impl Histogram {
    /// Total number of samples binned.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bins `values` into fixed-width bins anchored at the minimum value.
///
/// The bin count is the span divided by the width, rounded up; the maximum
/// value lands in the last bin. Returns `None` for an empty input or a
/// non-positive width.
pub fn histogram(values: &[f64], bin_width: f64) -> Option<Histogram> {
    if values.is_empty() || !(bin_width > 0.0) || !bin_width.is_finite() {
        return None;
    }
    let mut minimum = f64::INFINITY;
    let mut maximum = f64::NEG_INFINITY;
    for &value in values {
        minimum = minimum.min(value);
        maximum = maximum.max(value);
    }
    let bins = (((maximum - minimum) / bin_width).ceil() as usize).max(1);
    let mut counts = vec![0usize; bins];
    for &value in values {
        let index = (((value - minimum) / bin_width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }
    Some(Histogram {
        counts,
        origin: minimum,
        bin_width,
    })
}

/// Which distribution views a diagnostics report includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsOptions {
    /// Report the bond axis.
    pub bonds: bool,
    /// Report the angle axis.
    pub angles: bool,
    /// Include one histogram per connectivity entry.
    pub per_index: bool,
    /// Include the histogram of per-conformer totals.
    pub overall: bool,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self {
            bonds: false,
            angles: false,
            per_index: false,
            overall: true,
        }
    }
}

impl DiagnosticsOptions {
    pub fn none() -> Self {
        Self {
            bonds: false,
            angles: false,
            per_index: false,
            overall: false,
        }
    }

    pub fn enabled(&self) -> bool {
        (self.bonds || self.angles) && (self.per_index || self.overall)
    }
}

/// Histograms for one descriptor axis.
#[derive(Debug, Clone, Default)]
pub struct AxisDiagnostics {
    /// One histogram per connectivity entry (column), `None` where the
    /// column could not be binned.
    pub per_index: Vec<Option<Histogram>>,
    /// Histogram of the per-conformer totals. Its bin width is the
    /// per-entry width scaled by the number of entries.
    pub overall: Option<Histogram>,
}

/// Descriptor-distribution histograms for a (sub)population.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsReport {
    pub bonds: Option<AxisDiagnostics>,
    pub angles: Option<AxisDiagnostics>,
}

impl DiagnosticsReport {
    /// Builds the report from per-conformer value rows. Axes follow
    /// `options`; populations of fewer than two rows produce empty axes.
    #[instrument(skip_all, fields(rows = bond_rows.len()))]
    pub fn compute(
        bond_rows: &[Vec<f64>],
        angle_rows: &[Vec<f64>],
        options: DiagnosticsOptions,
        bond_bin_width: f64,
        angle_bin_width: f64,
    ) -> Self {
        let mut report = Self::default();
        if !options.enabled() {
            return report;
        }
        if options.bonds {
            report.bonds = Some(axis_diagnostics(bond_rows, bond_bin_width, options));
        }
        if options.angles {
            report.angles = Some(axis_diagnostics(angle_rows, angle_bin_width, options));
        }
        report
    }
}

fn axis_diagnostics(
    rows: &[Vec<f64>],
    bin_width: f64,
    options: DiagnosticsOptions,
) -> AxisDiagnostics {
    let mut axis = AxisDiagnostics::default();
    if rows.len() < 2 {
        return axis;
    }
    let columns = rows[0].len();
    if options.per_index {
        axis.per_index = (0..columns)
            .map(|column| {
                let values: Vec<f64> = rows.iter().map(|row| row[column]).collect();
                histogram(&values, bin_width)
            })
            .collect();
    }
    if options.overall && columns > 0 {
        let totals: Vec<f64> = rows.iter().map(|row| row.iter().sum()).collect();
        axis.overall = histogram(&totals, bin_width * columns as f64);
    }
    axis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_bins_against_the_minimum() {
        let h = histogram(&[1.0, 1.05, 1.25, 1.9], 0.5).unwrap();
        assert_eq!(h.origin, 1.0);
        // Span 0.9, width 0.5: two bins; the maximum lands in the last.
        assert_eq!(h.counts, vec![3, 1]);
        assert_eq!(h.total(), 4);
    }

    #[test]
    fn histogram_puts_identical_values_in_one_bin() {
        let h = histogram(&[2.0, 2.0, 2.0], 0.1).unwrap();
        assert_eq!(h.counts, vec![3]);
    }

    #[test]
    fn histogram_rejects_degenerate_inputs() {
        assert!(histogram(&[], 0.1).is_none());
        assert!(histogram(&[1.0], 0.0).is_none());
        assert!(histogram(&[1.0], -0.5).is_none());
    }

    #[test]
    fn histogram_clamps_the_maximum_into_the_last_bin() {
        // Span exactly divisible by the width: the top edge is closed.
        let h = histogram(&[0.0, 0.5, 1.0], 0.5).unwrap();
        assert_eq!(h.counts, vec![1, 2]);
    }

    #[test]
    fn report_respects_the_option_flags() {
        let bond_rows = vec![vec![1.0, 2.0], vec![1.1, 2.1]];
        let angle_rows = vec![vec![90.0], vec![91.0]];

        let silent = DiagnosticsReport::compute(
            &bond_rows,
            &angle_rows,
            DiagnosticsOptions::none(),
            0.01,
            1.0,
        );
        assert!(silent.bonds.is_none());
        assert!(silent.angles.is_none());

        let options = DiagnosticsOptions {
            bonds: true,
            angles: true,
            per_index: true,
            overall: true,
        };
        let report =
            DiagnosticsReport::compute(&bond_rows, &angle_rows, options, 0.01, 1.0);
        let bonds = report.bonds.unwrap();
        assert_eq!(bonds.per_index.len(), 2);
        assert!(bonds.overall.is_some());
        // Overall width scales with the column count.
        assert_eq!(bonds.overall.unwrap().bin_width, 0.02);
        assert!(report.angles.is_some());
    }

    #[test]
    fn report_is_empty_below_two_rows() {
        let options = DiagnosticsOptions {
            bonds: true,
            angles: false,
            per_index: true,
            overall: true,
        };
        let report =
            DiagnosticsReport::compute(&[vec![1.0]], &[], options, 0.1, 1.0);
        let bonds = report.bonds.unwrap();
        assert!(bonds.per_index.is_empty());
        assert!(bonds.overall.is_none());
    }
}
