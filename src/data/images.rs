/// Microscopy image index
///
/// Tags image files with (Sample, Treatment, Magnification) from tokens in
/// their file names. Matching is case- and separator-insensitive: spaces,
/// underscores and hyphens are removed and the stem is lowercased before
/// looking for tokens.
///
/// Files whose tags cannot be determined unambiguously are left out of the
/// index and reported as `IndexIssue`s so the UI can show them.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::data::measurement::{Sample, Treatment};
use crate::error::{DashboardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Magnification {
    X10,
    X40,
}

impl Magnification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Magnification::X10 => "10x",
            Magnification::X40 => "40x",
        }
    }
}

impl std::fmt::Display for Magnification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub sample: Sample,
    pub treatment: Treatment,
    pub magnification: Magnification,
    pub path: PathBuf,
}

impl ImageRecord {
    pub fn caption(&self) -> String {
        format!("{} - {} - {}", self.sample, self.treatment, self.magnification)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Tag field a filename is checked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Sample,
    Treatment,
    Magnification,
}

impl std::fmt::Display for TagField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagField::Sample => write!(f, "sample"),
            TagField::Treatment => write!(f, "treatment"),
            TagField::Magnification => write!(f, "magnification"),
        }
    }
}

/// Data-quality problem found while indexing
#[derive(Debug, Clone, PartialEq)]
pub enum IndexIssue {
    /// No token found for one or more fields
    Untagged { path: PathBuf, missing: Vec<TagField> },
    /// More than one token of the same field
    Ambiguous {
        path: PathBuf,
        field: TagField,
        candidates: Vec<String>,
    },
    /// Several files share one (Sample, Treatment, Magnification) triple
    Duplicate {
        sample: Sample,
        treatment: Treatment,
        magnification: Magnification,
        paths: Vec<PathBuf>,
    },
}

impl std::fmt::Display for IndexIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexIssue::Untagged { path, missing } => {
                let names: Vec<String> = missing.iter().map(|m| m.to_string()).collect();
                write!(f, "{}: no {} tag", display_name(path), names.join("/"))
            }
            IndexIssue::Ambiguous {
                path,
                field,
                candidates,
            } => write!(
                f,
                "{}: ambiguous {} ({})",
                display_name(path),
                field,
                candidates.join(", ")
            ),
            IndexIssue::Duplicate {
                sample,
                treatment,
                magnification,
                paths,
            } => {
                let names: Vec<String> = paths.iter().map(|p| display_name(p)).collect();
                write!(
                    f,
                    "{} {} {}: {} files ({})",
                    sample,
                    treatment,
                    magnification,
                    paths.len(),
                    names.join(", ")
                )
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Outcome of a cascading selection
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Missing,
    Unique(&'a ImageRecord),
    Conflict(Vec<&'a ImageRecord>),
}

#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    pub dir: PathBuf,
    /// Tagged images, in file-name order
    pub records: Vec<ImageRecord>,
    pub issues: Vec<IndexIssue>,
}

const SAMPLE_TOKENS: [(&str, Sample); 4] = [
    ("s1", Sample::S1),
    ("s2", Sample::S2),
    ("s3", Sample::S3),
    ("s4", Sample::S4),
];

const TREATMENT_TOKENS: [(&str, Treatment); 5] = [
    ("t1", Treatment::T1),
    ("t2", Treatment::T2),
    ("t3", Treatment::T3),
    ("t4", Treatment::T4),
    ("t5", Treatment::T5),
];

const PRE_TOKEN: &str = "pretreatment";

const MAGNIFICATION_TOKENS: [(&str, Magnification); 2] =
    [("10x", Magnification::X10), ("40x", Magnification::X40)];

/// Remove separators and lowercase
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Result of tagging one file name
#[derive(Debug, Clone, PartialEq)]
pub enum Tagging {
    Tagged(Sample, Treatment, Magnification),
    Untagged(Vec<TagField>),
    Ambiguous(TagField, Vec<String>),
}

/// All tokens of one field found in `name`
fn find_tokens<T: Copy>(name: &str, tokens: &[(&'static str, T)]) -> Vec<(&'static str, T)> {
    tokens
        .iter()
        .filter(|(tok, _)| name.contains(tok))
        .copied()
        .collect()
}

/// Tag a file stem.
///
/// Magnification is read first and its token removed, then `pretreatment`
/// is read and removed, so that e.g. `pretreatment10x` is not also read as
/// treatment `t1`.
pub fn tag_file_name(stem: &str) -> Tagging {
    let mut name = normalize_name(stem);
    let mut missing = Vec::new();

    let mags = find_tokens(&name, &MAGNIFICATION_TOKENS);
    let magnification = match mags.as_slice() {
        [] => {
            missing.push(TagField::Magnification);
            None
        }
        [(tok, mag)] => {
            name = name.replacen(tok, "", 1);
            Some(*mag)
        }
        many => {
            return Tagging::Ambiguous(
                TagField::Magnification,
                many.iter().map(|(t, _)| t.to_string()).collect(),
            )
        }
    };

    let has_pre = name.contains(PRE_TOKEN);
    if has_pre {
        name = name.replacen(PRE_TOKEN, "", 1);
    }
    let applied = find_tokens(&name, &TREATMENT_TOKENS);
    let treatment = match (has_pre, applied.as_slice()) {
        (false, []) => {
            missing.push(TagField::Treatment);
            None
        }
        (true, []) => Some(Treatment::Pre),
        (false, [(_, t)]) => Some(*t),
        (true, rest) => {
            let mut candidates = vec![PRE_TOKEN.to_string()];
            candidates.extend(rest.iter().map(|(t, _)| t.to_string()));
            return Tagging::Ambiguous(TagField::Treatment, candidates);
        }
        (false, many) => {
            return Tagging::Ambiguous(
                TagField::Treatment,
                many.iter().map(|(t, _)| t.to_string()).collect(),
            )
        }
    };

    let samples = find_tokens(&name, &SAMPLE_TOKENS);
    let sample = match samples.as_slice() {
        [] => {
            missing.push(TagField::Sample);
            None
        }
        [(_, s)] => Some(*s),
        many => {
            return Tagging::Ambiguous(
                TagField::Sample,
                many.iter().map(|(t, _)| t.to_string()).collect(),
            )
        }
    };

    match (sample, treatment, magnification) {
        (Some(s), Some(t), Some(m)) => Tagging::Tagged(s, t, m),
        _ => {
            missing.sort_by_key(|f| *f as u8);
            Tagging::Untagged(missing)
        }
    }
}

fn is_image_file(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    matches!(ext.as_str(), "jpg" | "png")
}

/// Image files among `entries`, sorted; unreadable entries are logged and skipped
fn image_paths(dir: &Path, entries: impl Iterator<Item = io::Result<PathBuf>>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    files.sort();
    files
}

impl ImageIndex {
    /// Scan a directory. A directory that does not exist yields an empty index.
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut index = ImageIndex {
            dir: dir.to_path_buf(),
            ..Default::default()
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("Image directory {} not found", dir.display());
                return Ok(index);
            }
            Err(e) => return Err(DashboardError::io(dir, e)),
        };

        let files = image_paths(dir, entries.map(|entry| entry.map(|e| e.path())));
        index.add_files(files.into_iter());

        log::info!(
            "Indexed {} images in {} ({} issues)",
            index.records.len(),
            dir.display(),
            index.issues.len()
        );
        Ok(index)
    }

    /// Tag and add files; duplicates are detected once all files are in.
    fn add_files(&mut self, paths: impl Iterator<Item = PathBuf>) {
        for path in paths {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            match tag_file_name(&stem) {
                Tagging::Tagged(sample, treatment, magnification) => {
                    self.records.push(ImageRecord {
                        sample,
                        treatment,
                        magnification,
                        path,
                    });
                }
                Tagging::Untagged(missing) => {
                    log::debug!("Untagged image {}", path.display());
                    self.issues.push(IndexIssue::Untagged { path, missing });
                }
                Tagging::Ambiguous(field, candidates) => {
                    log::warn!(
                        "Ambiguous {} in image name {}: {}",
                        field,
                        path.display(),
                        candidates.join(", ")
                    );
                    self.issues.push(IndexIssue::Ambiguous {
                        path,
                        field,
                        candidates,
                    });
                }
            }
        }

        let mut groups: BTreeMap<(Sample, Treatment, Magnification), Vec<PathBuf>> = BTreeMap::new();
        for rec in &self.records {
            groups
                .entry((rec.sample, rec.treatment, rec.magnification))
                .or_default()
                .push(rec.path.clone());
        }
        for ((sample, treatment, magnification), paths) in groups {
            if paths.len() > 1 {
                log::warn!(
                    "{} images share {} {} {}",
                    paths.len(),
                    sample,
                    treatment,
                    magnification
                );
                self.issues.push(IndexIssue::Duplicate {
                    sample,
                    treatment,
                    magnification,
                    paths,
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Samples that have at least one image, sorted
    pub fn samples(&self) -> Vec<Sample> {
        let mut samples: Vec<Sample> = self.records.iter().map(|r| r.sample).collect();
        samples.sort();
        samples.dedup();
        samples
    }

    /// Magnifications present for a (sample, treatment) pair, sorted
    pub fn magnifications(&self, sample: Sample, treatment: Treatment) -> Vec<Magnification> {
        let mut mags: Vec<Magnification> = self
            .records
            .iter()
            .filter(|r| r.sample == sample && r.treatment == treatment)
            .map(|r| r.magnification)
            .collect();
        mags.sort();
        mags.dedup();
        mags
    }

    pub fn resolve(
        &self,
        sample: Sample,
        treatment: Treatment,
        magnification: Magnification,
    ) -> Resolution<'_> {
        let matches: Vec<&ImageRecord> = self
            .records
            .iter()
            .filter(|r| {
                r.sample == sample && r.treatment == treatment && r.magnification == magnification
            })
            .collect();
        match matches.len() {
            0 => Resolution::Missing,
            1 => Resolution::Unique(matches[0]),
            _ => Resolution::Conflict(matches),
        }
    }
}
