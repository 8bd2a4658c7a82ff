/// Percent change of each treatment's peak against the sample's Pre peak

use crate::data::measurement::{Sample, Treatment};
use crate::pipeline::aggregate::MaximaGrid;

#[derive(Debug, Clone, PartialEq)]
pub struct PercentChange {
    pub treatment: Treatment,
    pub sample: Sample,
    pub percent: f64,
}

impl PercentChange {
    /// Category key of the bar chart, e.g. `T1_S1`
    pub fn key(&self) -> String {
        category_key(self.treatment, self.sample)
    }
}

pub fn category_key(treatment: Treatment, sample: Sample) -> String {
    format!("{}_{}", treatment, sample)
}

/// Fixed bar order: treatment outer, sample inner (T1_S1, T1_S2, ..., T5_S4)
pub fn category_order() -> Vec<String> {
    Treatment::APPLIED
        .iter()
        .flat_map(|&t| Sample::ALL.iter().map(move |&s| category_key(t, s)))
        .collect()
}

pub fn percent_change(value: f64, baseline: f64) -> f64 {
    (value - baseline) / baseline * 100.0
}

/// Build the table in category order. Cells with a missing value or a zero
/// baseline are left out.
pub fn percent_change_table(grid: &MaximaGrid) -> Vec<PercentChange> {
    let mut out = Vec::with_capacity(20);
    for treatment in Treatment::APPLIED {
        for sample in Sample::ALL {
            let (Some(pre), Some(value)) = (
                grid.get(sample, Treatment::Pre),
                grid.get(sample, treatment),
            ) else {
                continue;
            };
            if pre == 0.0 {
                log::warn!("{} has a zero Pre peak; skipping percent change", sample);
                continue;
            }
            out.push(PercentChange {
                treatment,
                sample,
                percent: percent_change(value, pre),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference::REFERENCE_MAXIMA;

    #[test]
    fn test_reference_percent_changes() {
        let grid = MaximaGrid::from_entries(REFERENCE_MAXIMA);
        let table = percent_change_table(&grid);
        assert_eq!(table.len(), 20);

        let first = &table[0];
        assert_eq!((first.treatment, first.sample), (Treatment::T1, Sample::S1));
        assert_eq!(first.percent, (1.105019 - 1.034401) / 1.034401 * 100.0);
        assert!((first.percent - 6.827).abs() < 1e-3);

        for pc in &table {
            let pre = grid.get(pc.sample, Treatment::Pre).unwrap();
            let val = grid.get(pc.sample, pc.treatment).unwrap();
            assert_eq!(pc.percent, (val - pre) / pre * 100.0);
        }

        let s2_t4 = table
            .iter()
            .find(|p| p.treatment == Treatment::T4 && p.sample == Sample::S2)
            .unwrap();
        assert_eq!(s2_t4.percent, (0.932617 - 2.207954) / 2.207954 * 100.0);
    }

    #[test]
    fn test_order_matches_category_order() {
        let grid = MaximaGrid::from_entries(REFERENCE_MAXIMA);
        let keys: Vec<String> = percent_change_table(&grid).iter().map(|p| p.key()).collect();
        let order = category_order();
        assert_eq!(keys, order);
        assert_eq!(&order[..5], &["T1_S1", "T1_S2", "T1_S3", "T1_S4", "T2_S1"]);
        assert_eq!(order.last().map(String::as_str), Some("T5_S4"));
    }

    #[test]
    fn test_missing_baseline_skips_sample() {
        let grid = MaximaGrid::from_entries([("S1_T1", 2.0), ("S2_Pre", 0.0), ("S2_T1", 1.0), ("S3_Pre", 1.0), ("S3_T2", 1.5)]);
        let table = percent_change_table(&grid);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].key(), "T2_S3");
        assert!((table[0].percent - 50.0).abs() < 1e-12);
    }
}
