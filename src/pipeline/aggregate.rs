/// Maxima grid: Treatment rows × Sample columns of peak tensile strength
///
/// Rows always follow `Treatment::ALL` (Pre, T1..T5) and columns
/// `Sample::ALL` (S1..S4), independent of input order.

use crate::data::measurement::{ColumnKey, Sample, Treatment};
use crate::pipeline::reshape::SampleView;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaximaGrid {
    cells: [[Option<f64>; 4]; 6],
}

/// Mean of one treatment row across the samples that have a value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreatmentMean {
    pub treatment: Treatment,
    pub mean: f64,
}

/// Cell where computed and reference maxima disagree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discrepancy {
    pub sample: Sample,
    pub treatment: Treatment,
    pub computed: Option<f64>,
    pub reference: Option<f64>,
}

impl Discrepancy {
    pub fn delta(&self) -> Option<f64> {
        Some(self.computed? - self.reference?)
    }
}

/// Decode a `S1_T3`-style key of the maxima mapping
pub fn parse_maxima_key(key: &str) -> Option<(Sample, Treatment)> {
    ColumnKey::parse(key).map(|k| (k.sample, k.treatment))
}

impl MaximaGrid {
    /// Pivot `(key, value)` pairs. Keys that do not decode are skipped.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut grid = MaximaGrid::default();
        for (key, value) in entries {
            match parse_maxima_key(key) {
                Some((sample, treatment)) => grid.set(sample, treatment, value),
                None => log::warn!("Skipping maxima key '{}'", key),
            }
        }
        grid
    }

    /// Grid of the peaks found in the loaded measurements
    pub fn from_sample_views(views: &[SampleView]) -> Self {
        let mut grid = MaximaGrid::default();
        for view in views {
            for mp in &view.max_points {
                grid.set(mp.sample, mp.treatment, mp.value);
            }
        }
        grid
    }

    pub fn set(&mut self, sample: Sample, treatment: Treatment, value: f64) {
        self.cells[treatment.index()][sample.index()] = Some(value);
    }

    pub fn get(&self, sample: Sample, treatment: Treatment) -> Option<f64> {
        self.cells[treatment.index()][sample.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|c| c.is_none())
    }

    /// `(treatment, [S1..S4])` rows in chart order
    pub fn rows(&self) -> impl Iterator<Item = (Treatment, [Option<f64>; 4])> + '_ {
        Treatment::ALL.into_iter().map(|t| (t, self.cells[t.index()]))
    }

    /// Row-wise means; a row with no values has no mean
    pub fn treatment_means(&self) -> Vec<TreatmentMean> {
        self.rows()
            .filter_map(|(treatment, row)| {
                let values: Vec<f64> = row.iter().flatten().copied().collect();
                if values.is_empty() {
                    return None;
                }
                Some(TreatmentMean {
                    treatment,
                    mean: values.iter().sum::<f64>() / values.len() as f64,
                })
            })
            .collect()
    }

    /// Melted back to `(treatment, sample, value)` for the grouped bar chart
    pub fn long_form(&self) -> Vec<(Treatment, Sample, f64)> {
        self.rows()
            .flat_map(|(t, row)| {
                Sample::ALL
                    .into_iter()
                    .filter_map(move |s| row[s.index()].map(|v| (t, s, v)))
            })
            .collect()
    }

    /// Cells differing from `reference` by more than `tolerance`, or present in only one grid
    pub fn compare(&self, reference: &MaximaGrid, tolerance: f64) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        for treatment in Treatment::ALL {
            for sample in Sample::ALL {
                let computed = self.get(sample, treatment);
                let expected = reference.get(sample, treatment);
                let differs = match (computed, expected) {
                    (Some(a), Some(b)) => (a - b).abs() > tolerance,
                    (None, None) => false,
                    _ => true,
                };
                if differs {
                    out.push(Discrepancy {
                        sample,
                        treatment,
                        computed,
                        reference: expected,
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::measurement::MeasurementTable;
    use crate::data::reference::REFERENCE_MAXIMA;
    use crate::pipeline::reshape::reshape_sample;

    fn reference() -> MaximaGrid {
        MaximaGrid::from_entries(REFERENCE_MAXIMA)
    }

    #[test]
    fn test_parse_maxima_key() {
        assert_eq!(parse_maxima_key("S2_Pre"), Some((Sample::S2, Treatment::Pre)));
        assert_eq!(parse_maxima_key("S4_T5"), Some((Sample::S4, Treatment::T5)));
        assert_eq!(parse_maxima_key("S4-T5"), None);
        assert_eq!(parse_maxima_key("X1_T1"), None);
    }

    #[test]
    fn test_grid_order_is_fixed() {
        let grid = MaximaGrid::from_entries([("S4_T5", 1.0), ("S1_Pre", 2.0), ("S2_T1", 3.0)]);
        let order: Vec<Treatment> = grid.rows().map(|(t, _)| t).collect();
        assert_eq!(order, Treatment::ALL.to_vec());
        let (first, row) = grid.rows().next().unwrap();
        assert_eq!(first, Treatment::Pre);
        assert_eq!(row, [Some(2.0), None, None, None]);
        assert_eq!(
            grid.long_form(),
            vec![
                (Treatment::Pre, Sample::S1, 2.0),
                (Treatment::T1, Sample::S2, 3.0),
                (Treatment::T5, Sample::S4, 1.0),
            ]
        );
    }

    #[test]
    fn test_reference_grid_is_complete() {
        let grid = reference();
        assert_eq!(grid.long_form().len(), 24);
        assert_eq!(grid.get(Sample::S3, Treatment::T2), Some(1.821617));
    }

    #[test]
    fn test_treatment_means() {
        let means = reference().treatment_means();
        assert_eq!(means.len(), 6);
        assert_eq!(means[0].treatment, Treatment::Pre);
        let expected = (1.034401 + 2.207954 + 1.337654 + 1.541206) / 4.0;
        assert!((means[0].mean - expected).abs() < 1e-12);
        assert!((means[0].mean - 1.530304).abs() < 1e-6);
    }

    #[test]
    fn test_mean_skips_missing_cells() {
        let grid = MaximaGrid::from_entries([("S1_T1", 1.0), ("S3_T1", 2.0)]);
        let means = grid.treatment_means();
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].treatment, Treatment::T1);
        assert!((means[0].mean - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_grid_from_loaded_data_and_compare() {
        let table = MeasurementTable::from_reader(
            "Time,S1_Pre,S1_T1\n0,1.0,0.5\n1,1.034401,1.2\n".as_bytes(),
        )
        .unwrap();
        let views: Vec<SampleView> = Sample::ALL.iter().map(|&s| reshape_sample(&table, s)).collect();
        let grid = MaximaGrid::from_sample_views(&views);
        assert_eq!(grid.get(Sample::S1, Treatment::Pre), Some(1.034401));
        assert_eq!(grid.get(Sample::S1, Treatment::T1), Some(1.2));

        let diffs = grid.compare(&reference(), 1e-6);
        // S1_Pre matches; every other reference cell is either off or absent
        assert_eq!(diffs.len(), 23);
        let t1 = diffs
            .iter()
            .find(|d| d.sample == Sample::S1 && d.treatment == Treatment::T1)
            .unwrap();
        assert!((t1.delta().unwrap() - (1.2 - 1.105019)).abs() < 1e-12);
        assert!(diffs
            .iter()
            .all(|d| !(d.sample == Sample::S1 && d.treatment == Treatment::Pre)));
    }
}
