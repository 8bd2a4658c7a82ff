/// Derived views and their dependencies
///
/// measurement table ──► per-sample views ──► maxima summary ──► charts
///                                      reference maxima ──┘
///
/// Each stage is rebuilt only when one of its inputs changed: the sample
/// views depend on the table revision; the summary depends on the table
/// revision, the maxima source and the cross-check tolerance.

use crate::data::measurement::{MeasurementTable, Sample};
use crate::data::reference::{MaximaSource, REFERENCE_MAXIMA};
use crate::pipeline::aggregate::{Discrepancy, MaximaGrid, TreatmentMean};
use crate::pipeline::percent_change::{percent_change_table, PercentChange};
use crate::pipeline::reshape::{reshape_sample, SampleView};

/// Chart-ready tables built from the maxima grid
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub source: MaximaSource,
    /// Maxima computed from the loaded measurements
    pub computed: MaximaGrid,
    pub reference: MaximaGrid,
    /// Computed vs reference, outside tolerance
    pub discrepancies: Vec<Discrepancy>,
    pub means: Vec<TreatmentMean>,
    pub percent_changes: Vec<PercentChange>,
}

impl Summary {
    pub fn build(views: &[SampleView], source: MaximaSource, tolerance: f64) -> Self {
        let computed = MaximaGrid::from_sample_views(views);
        let reference = MaximaGrid::from_entries(REFERENCE_MAXIMA);
        let discrepancies = if computed.is_empty() {
            Vec::new()
        } else {
            computed.compare(&reference, tolerance)
        };
        let active = match source {
            MaximaSource::LoadedData => &computed,
            MaximaSource::Reference => &reference,
        };
        let means = active.treatment_means();
        let percent_changes = percent_change_table(active);
        Self {
            source,
            computed,
            reference,
            discrepancies,
            means,
            percent_changes,
        }
    }

    /// The grid the charts are drawn from
    pub fn active(&self) -> &MaximaGrid {
        match self.source {
            MaximaSource::LoadedData => &self.computed,
            MaximaSource::Reference => &self.reference,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SummaryKey {
    revision: u64,
    source: MaximaSource,
    tolerance: f64,
}

#[derive(Debug, Default)]
pub struct DerivedViews {
    table: Option<MeasurementTable>,
    revision: u64,
    views: Option<(u64, Vec<SampleView>)>,
    summary: Option<(SummaryKey, Summary)>,
    view_builds: usize,
    summary_builds: usize,
}

impl DerivedViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the base table; everything downstream becomes stale.
    pub fn set_table(&mut self, table: MeasurementTable) {
        self.table = Some(table);
        self.revision += 1;
    }

    pub fn clear_table(&mut self) {
        self.table = None;
        self.revision += 1;
    }

    pub fn table(&self) -> Option<&MeasurementTable> {
        self.table.as_ref()
    }

    /// Bring stale stages up to date
    pub fn refresh(&mut self, source: MaximaSource, tolerance: f64) {
        let revision = self.revision;
        if self.views.as_ref().map(|(r, _)| *r) != Some(revision) {
            let views = match &self.table {
                Some(table) => Sample::ALL
                    .iter()
                    .map(|&s| reshape_sample(table, s))
                    .collect(),
                None => Vec::new(),
            };
            self.views = Some((revision, views));
            self.view_builds += 1;
            log::debug!("Rebuilt sample views (revision {}, build {})", revision, self.view_builds);
        }

        let key = SummaryKey {
            revision,
            source,
            tolerance,
        };
        if self.summary.as_ref().map(|(k, _)| *k) != Some(key) {
            let summary = Summary::build(self.views(), source, tolerance);
            self.summary = Some((key, summary));
            self.summary_builds += 1;
            log::debug!("Rebuilt maxima summary ({:?}, build {})", source, self.summary_builds);
        }
    }

    /// Per-sample views in `Sample::ALL` order; empty before the first refresh or without a table
    pub fn views(&self) -> &[SampleView] {
        self.views.as_ref().map(|(_, v)| v.as_slice()).unwrap_or(&[])
    }

    pub fn view(&self, sample: Sample) -> Option<&SampleView> {
        self.views().iter().find(|v| v.sample == sample)
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref().map(|(_, s)| s)
    }

    #[cfg(test)]
    pub fn build_counts(&self) -> (usize, usize) {
        (self.view_builds, self.summary_builds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::measurement::Treatment;

    fn table() -> MeasurementTable {
        MeasurementTable::from_reader("Time,S1_Pre,S1_T1\n0,1.0,1.5\n1,2.0,1.0\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_refresh_only_rebuilds_stale_stages() {
        let mut derived = DerivedViews::new();
        derived.set_table(table());
        derived.refresh(MaximaSource::LoadedData, 1e-6);
        assert_eq!(derived.build_counts(), (1, 1));

        derived.refresh(MaximaSource::LoadedData, 1e-6);
        assert_eq!(derived.build_counts(), (1, 1));

        derived.refresh(MaximaSource::Reference, 1e-6);
        assert_eq!(derived.build_counts(), (1, 2));

        derived.set_table(table());
        derived.refresh(MaximaSource::Reference, 1e-6);
        assert_eq!(derived.build_counts(), (2, 3));
    }

    #[test]
    fn test_summary_uses_selected_source() {
        let mut derived = DerivedViews::new();
        derived.set_table(table());

        derived.refresh(MaximaSource::LoadedData, 1e-6);
        let summary = derived.summary().unwrap();
        assert_eq!(summary.active().get(Sample::S1, Treatment::Pre), Some(2.0));
        assert_eq!(summary.percent_changes.len(), 1);
        assert!((summary.percent_changes[0].percent - (-25.0)).abs() < 1e-12);
        assert!(!summary.discrepancies.is_empty());

        derived.refresh(MaximaSource::Reference, 1e-6);
        let summary = derived.summary().unwrap();
        assert_eq!(summary.active().get(Sample::S1, Treatment::Pre), Some(1.034401));
        assert_eq!(summary.percent_changes.len(), 20);
        assert_eq!(summary.computed.get(Sample::S1, Treatment::Pre), Some(2.0));
    }

    #[test]
    fn test_without_table_reference_still_available() {
        let mut derived = DerivedViews::new();
        derived.refresh(MaximaSource::Reference, 1e-6);
        assert!(derived.views().is_empty());
        let summary = derived.summary().unwrap();
        assert!(summary.computed.is_empty());
        assert!(summary.discrepancies.is_empty());
        assert_eq!(summary.means.len(), 6);
    }

    #[test]
    fn test_view_lookup() {
        let mut derived = DerivedViews::new();
        derived.set_table(table());
        derived.refresh(MaximaSource::LoadedData, 1e-6);
        assert_eq!(derived.views().len(), 4);
        assert!(derived.view(Sample::S1).map(|v| !v.is_empty()).unwrap_or(false));
        assert!(derived.view(Sample::S2).map(|v| v.is_empty()).unwrap_or(false));
    }
}
