/// Reference peak tensile strengths recorded for each (Sample, Treatment).
///
/// These are published values kept for cross-checking the maxima computed
/// from the loaded measurements. They never replace computed results unless
/// the user picks the reference table as the chart source.

pub const REFERENCE_MAXIMA: [(&str, f64); 24] = [
    ("S1_Pre", 1.034401),
    ("S1_T1", 1.105019),
    ("S1_T2", 1.142403),
    ("S1_T3", 1.215111),
    ("S1_T4", 1.046860),
    ("S1_T5", 1.279495),
    ("S2_Pre", 2.207954),
    ("S2_T1", 1.248337),
    ("S2_T2", 1.821617),
    ("S2_T3", 1.863159),
    ("S2_T4", 0.932617),
    ("S2_T5", 1.977402),
    ("S3_Pre", 1.337654),
    ("S3_T1", 1.051018),
    ("S3_T2", 1.821617),
    ("S3_T3", 1.480972),
    ("S3_T4", 1.150719),
    ("S3_T5", 1.393738),
    ("S4_Pre", 1.541206),
    ("S4_T1", 1.850700),
    ("S4_T2", 2.139412),
    ("S4_T3", 1.750999),
    ("S4_T4", 1.528748),
    ("S4_T5", 1.183952),
];

/// Which maxima feed the bar and percent-change charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MaximaSource {
    /// Computed from the loaded measurement table
    LoadedData,
    /// The fixed reference values above
    Reference,
}

impl Default for MaximaSource {
    fn default() -> Self {
        MaximaSource::LoadedData
    }
}

impl MaximaSource {
    pub fn label(&self) -> &'static str {
        match self {
            MaximaSource::LoadedData => "Loaded data",
            MaximaSource::Reference => "Reference table",
        }
    }
}
