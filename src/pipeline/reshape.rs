/// Per-sample reshaping: wide columns → long-form records → per-treatment maxima

use crate::data::measurement::{MeasurementTable, Sample, Treatment};

/// One un-pivoted reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongRecord {
    pub time: f64,
    pub treatment: Treatment,
    pub value: Option<f64>,
}

/// Peak reading of one treatment
#[derive(Debug, Clone, PartialEq)]
pub struct MaxPoint {
    pub sample: Sample,
    pub treatment: Treatment,
    pub time: f64,
    pub value: f64,
    /// Row of the peak in the measurement table
    pub row: usize,
    /// Hover text
    pub label: String,
}

/// Everything the per-sample tab needs
#[derive(Debug, Clone, PartialEq)]
pub struct SampleView {
    pub sample: Sample,
    /// Treatments that have a column for this sample, in file order
    pub treatments: Vec<Treatment>,
    /// Melted records, column-major (all rows of one treatment, then the next)
    pub records: Vec<LongRecord>,
    /// One entry per treatment with at least one valid reading
    pub max_points: Vec<MaxPoint>,
    /// Latest Time at which any of this sample's columns has a reading
    pub max_time: Option<f64>,
}

pub fn max_label(value: f64, treatment: Treatment) -> String {
    format!("Max: {:.2} (Treatment {})", value, treatment)
}

/// Un-pivot one sample's columns and locate each treatment's peak.
///
/// Ties on the peak value go to the earliest Time, then to the first row.
pub fn reshape_sample(table: &MeasurementTable, sample: Sample) -> SampleView {
    let mut treatments = Vec::new();
    let mut records = Vec::new();
    let mut max_points = Vec::new();

    for column in table.columns_for(sample) {
        let treatment = column.key.treatment;
        treatments.push(treatment);

        let mut best: Option<(usize, f64, f64)> = None;
        for (row, (&time, &value)) in table.times.iter().zip(column.values.iter()).enumerate() {
            records.push(LongRecord {
                time,
                treatment,
                value,
            });
            let Some(v) = value else { continue };
            best = match best {
                Some((br, bt, bv)) if v < bv || (v == bv && time >= bt) => Some((br, bt, bv)),
                _ => Some((row, time, v)),
            };
        }

        if let Some((row, time, value)) = best {
            max_points.push(MaxPoint {
                sample,
                treatment,
                time,
                value,
                row,
                label: max_label(value, treatment),
            });
        }
    }

    let max_time = table
        .times
        .iter()
        .enumerate()
        .filter(|(row, _)| {
            table
                .columns_for(sample)
                .any(|c| c.values.get(*row).copied().flatten().is_some())
        })
        .map(|(_, &t)| t)
        .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))));

    log::debug!(
        "Reshaped {}: {} treatments, {} records, {} maxima",
        sample,
        treatments.len(),
        records.len(),
        max_points.len()
    );

    SampleView {
        sample,
        treatments,
        records,
        max_points,
        max_time,
    }
}

impl SampleView {
    pub fn is_empty(&self) -> bool {
        self.treatments.is_empty()
    }

    /// `[time, value]` polylines per treatment, skipping missing readings
    pub fn series(&self) -> Vec<(Treatment, Vec<[f64; 2]>)> {
        self.treatments
            .iter()
            .map(|&t| {
                let points = self
                    .records
                    .iter()
                    .filter(|r| r.treatment == t)
                    .filter_map(|r| r.value.map(|v| [r.time, v]))
                    .collect();
                (t, points)
            })
            .collect()
    }

    #[cfg(test)]
    pub fn max_point(&self, treatment: Treatment) -> Option<&MaxPoint> {
        self.max_points.iter().find(|m| m.treatment == treatment)
    }

    /// Horizontal chart range `[0, max_time]`
    pub fn x_range(&self) -> Option<(f64, f64)> {
        self.max_time.map(|t| (0.0, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> MeasurementTable {
        MeasurementTable::from_reader(csv.as_bytes()).unwrap()
    }

    const CSV: &str = "\
Time,S1_Pre,S1_T1,S1_T2,S2_Pre
0.0,0.10,0.20,,0.9
0.5,0.40,0.25,,
1.0,0.35,,,
1.5,,0.15,,
2.0,,,,0.1
";

    #[test]
    fn test_one_max_point_per_treatment_with_values() {
        let t = table(CSV);
        let view = reshape_sample(&t, Sample::S1);
        assert_eq!(view.treatments, vec![Treatment::Pre, Treatment::T1, Treatment::T2]);
        // T2 has no valid readings
        assert_eq!(view.max_points.len(), 2);

        for mp in &view.max_points {
            let col = t.column(Sample::S1, mp.treatment).unwrap();
            assert!(col.values.iter().flatten().all(|&v| mp.value >= v));
        }
        let pre = view.max_point(Treatment::Pre).unwrap();
        assert_eq!((pre.time, pre.value), (0.5, 0.40));
        assert_eq!(pre.label, "Max: 0.40 (Treatment Pre)");
        let t1 = view.max_point(Treatment::T1).unwrap();
        assert_eq!((t1.time, t1.value), (0.5, 0.25));
        assert!(view.max_point(Treatment::T2).is_none());
    }

    #[test]
    fn test_records_are_column_major() {
        let view = reshape_sample(&table(CSV), Sample::S1);
        assert_eq!(view.records.len(), 15);
        assert!(view.records[..5].iter().all(|r| r.treatment == Treatment::Pre));
        assert!(view.records[5..10].iter().all(|r| r.treatment == Treatment::T1));
        assert_eq!(view.records[5].value, Some(0.20));
    }

    #[test]
    fn test_max_time_ignores_rows_without_sample_values() {
        let t = table(CSV);
        assert_eq!(reshape_sample(&t, Sample::S1).max_time, Some(1.5));
        assert_eq!(reshape_sample(&t, Sample::S2).max_time, Some(2.0));
        assert_eq!(reshape_sample(&t, Sample::S1).x_range(), Some((0.0, 1.5)));
    }

    #[test]
    fn test_tie_goes_to_earliest_time() {
        let t = table("Time,S1_T3\n2.0,1.0\n0.5,1.0\n1.0,0.2\n3.0,1.0\n");
        let view = reshape_sample(&t, Sample::S1);
        let mp = view.max_point(Treatment::T3).unwrap();
        assert_eq!(mp.time, 0.5);
        assert_eq!(mp.value, 1.0);
        assert_eq!(mp.row, 1);
    }

    #[test]
    fn test_tie_at_same_time_goes_to_first_row() {
        let t = table("Time,S1_T1\n1,2\n1,2\n0.5,1\n");
        let view = reshape_sample(&t, Sample::S1);
        assert_eq!(view.max_points.len(), 1);
        let mp = view.max_point(Treatment::T1).unwrap();
        assert_eq!((mp.row, mp.time, mp.value), (0, 1.0, 2.0));
    }

    #[test]
    fn test_sample_without_columns_is_empty() {
        let view = reshape_sample(&table(CSV), Sample::S4);
        assert!(view.is_empty());
        assert!(view.records.is_empty());
        assert!(view.max_points.is_empty());
        assert_eq!(view.max_time, None);
        assert_eq!(view.x_range(), None);
    }

    #[test]
    fn test_series_skip_missing() {
        let view = reshape_sample(&table(CSV), Sample::S1);
        let series = view.series();
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].0, Treatment::T1);
        assert_eq!(series[1].1, vec![[0.0, 0.20], [0.5, 0.25], [1.5, 0.15]]);
        assert!(series[2].1.is_empty());
    }
}
