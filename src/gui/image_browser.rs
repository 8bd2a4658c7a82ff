/// Microscopy image browser
///
/// Cascading selection Sample → Treatment → Magnification over the
/// image index. Only samples with images and only magnifications present
/// for the chosen pair are offered; a stale choice falls back to the
/// first available option. The decoded texture for the shown file is
/// cached until the selection points at a different file.

use std::path::{Path, PathBuf};

use crate::data::images::{ImageIndex, ImageRecord, Magnification, Resolution};
use crate::data::measurement::{Sample, Treatment};
use crate::error::{DashboardError, Result};
use crate::gui::theme::ThemeColors;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageBrowserAction {
    None,
    Rescan,
    PickFolder,
}

pub struct ImageBrowserState {
    pub sample: Option<Sample>,
    pub treatment: Treatment,
    pub magnification: Option<Magnification>,
    texture: Option<(PathBuf, egui::TextureHandle)>,
    load_error: Option<(PathBuf, String)>,
}

impl Default for ImageBrowserState {
    fn default() -> Self {
        Self {
            sample: None,
            treatment: Treatment::Pre,
            magnification: None,
            texture: None,
            load_error: None,
        }
    }
}

impl ImageBrowserState {
    /// Pull the selection back onto options the index actually offers
    pub fn reconcile(&mut self, index: &ImageIndex) {
        let samples = index.samples();
        if !self.sample.is_some_and(|s| samples.contains(&s)) {
            self.sample = samples.first().copied();
        }

        self.magnification = match self.sample {
            Some(sample) => {
                let mags = index.magnifications(sample, self.treatment);
                match self.magnification {
                    Some(m) if mags.contains(&m) => Some(m),
                    _ => mags.first().copied(),
                }
            }
            None => None,
        };
    }

    /// Drop the cached texture, e.g. after a rescan
    pub fn clear_cache(&mut self) {
        self.texture = None;
        self.load_error = None;
    }

    fn texture_for(
        &mut self,
        ctx: &egui::Context,
        record: &ImageRecord,
    ) -> Option<&egui::TextureHandle> {
        let cached = matches!(&self.texture, Some((path, _)) if *path == record.path);
        let failed = matches!(&self.load_error, Some((path, _)) if *path == record.path);
        if !cached && !failed {
            match decode_image(&record.path) {
                Ok(image) => {
                    let handle = ctx.load_texture(
                        record.file_name(),
                        image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.texture = Some((record.path.clone(), handle));
                    self.load_error = None;
                }
                Err(e) => {
                    log::error!("{}", e);
                    self.texture = None;
                    self.load_error = Some((record.path.clone(), e.to_string()));
                }
            }
        }
        match &self.texture {
            Some((path, handle)) if *path == record.path => Some(handle),
            _ => None,
        }
    }
}

/// Decode an image file into egui's RGBA pixel format
pub fn decode_image(path: &Path) -> Result<egui::ColorImage> {
    let img = image::open(path).map_err(|source| DashboardError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::info!("Loaded {}x{} image {}", width, height, path.display());
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        rgba.as_raw(),
    ))
}

pub fn show_image_browser(
    ui: &mut egui::Ui,
    state: &mut ImageBrowserState,
    index: &ImageIndex,
    colors: &ThemeColors,
) -> ImageBrowserAction {
    let mut action = ImageBrowserAction::None;

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!("Folder: {}", index.dir.display()))
                .color(colors.text_muted)
                .size(12.0),
        );
        if ui.button("🔄 Rescan").clicked() {
            action = ImageBrowserAction::Rescan;
        }
        if ui.button("📂 Choose Folder…").clicked() {
            action = ImageBrowserAction::PickFolder;
        }
    });

    state.reconcile(index);

    if index.is_empty() {
        ui.colored_label(
            colors.text_muted,
            format!("ℹ No tagged images found in {}", index.dir.display()),
        );
        show_issues(ui, index, colors);
        return action;
    }

    let samples = index.samples();
    let prev = (state.sample, state.treatment, state.magnification);

    ui.horizontal(|ui| {
        egui::ComboBox::from_label("Sample")
            .selected_text(state.sample.map(|s| s.as_str()).unwrap_or("-"))
            .show_ui(ui, |ui| {
                for s in &samples {
                    ui.selectable_value(&mut state.sample, Some(*s), s.as_str());
                }
            });
        ui.add_space(8.0);
        egui::ComboBox::from_label("Treatment")
            .selected_text(state.treatment.as_str())
            .show_ui(ui, |ui| {
                for t in Treatment::ALL {
                    ui.selectable_value(&mut state.treatment, t, t.as_str());
                }
            });
    });

    // Sample or treatment may have changed above
    state.reconcile(index);

    let Some(sample) = state.sample else {
        return action;
    };
    let mags = index.magnifications(sample, state.treatment);

    let Some(mag) = state.magnification else {
        ui.colored_label(
            colors.warning,
            format!("⚠ No images for {} - {}", sample, state.treatment),
        );
        show_issues(ui, index, colors);
        return action;
    };

    ui.horizontal(|ui| {
        ui.label("Magnification:");
        let mut selected = mag;
        for m in &mags {
            ui.radio_value(&mut selected, *m, m.as_str());
        }
        state.magnification = Some(selected);
    });

    if prev != (state.sample, state.treatment, state.magnification) {
        log::debug!(
            "Image selection {:?} {:?} {:?}",
            state.sample,
            state.treatment,
            state.magnification
        );
    }

    let Some(mag) = state.magnification else {
        return action;
    };

    match index.resolve(sample, state.treatment, mag) {
        Resolution::Missing => {
            ui.colored_label(colors.warning, "⚠ No image for this selection");
        }
        Resolution::Conflict(records) => {
            ui.colored_label(
                colors.error,
                format!(
                    "✖ {} files match {} - {} - {}; none is shown",
                    records.len(),
                    sample,
                    state.treatment,
                    mag
                ),
            );
            for r in records {
                ui.label(format!("  • {}", r.file_name()));
            }
        }
        Resolution::Unique(record) => {
            let ctx = ui.ctx().clone();
            let max_width = ui.available_width().min(720.0);
            if let Some(tex) = state.texture_for(&ctx, record) {
                ui.add(egui::Image::new((tex.id(), tex.size_vec2())).max_width(max_width));
                ui.label(egui::RichText::new(record.caption()).italics());
            } else if let Some((_, msg)) = &state.load_error {
                ui.colored_label(colors.error, format!("✖ {}", msg));
            }
        }
    }

    show_issues(ui, index, colors);
    action
}

fn show_issues(ui: &mut egui::Ui, index: &ImageIndex, colors: &ThemeColors) {
    if index.issues.is_empty() {
        return;
    }
    egui::CollapsingHeader::new(format!("⚠ {} indexing issue(s)", index.issues.len()))
        .id_salt("image_issues")
        .default_open(false)
        .show(ui, |ui| {
            for issue in &index.issues {
                ui.colored_label(colors.warning, issue.to_string());
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sample: Sample, treatment: Treatment, mag: Magnification, name: &str) -> ImageRecord {
        ImageRecord {
            sample,
            treatment,
            magnification: mag,
            path: PathBuf::from(name),
        }
    }

    fn index() -> ImageIndex {
        ImageIndex {
            records: vec![
                record(Sample::S2, Treatment::T2, Magnification::X10, "s2_t2_10x.jpg"),
                record(Sample::S2, Treatment::T2, Magnification::X40, "s2_t2_40x.jpg"),
                record(Sample::S3, Treatment::Pre, Magnification::X40, "s3_pre_40x.jpg"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_reconcile_picks_first_sample() {
        let mut state = ImageBrowserState::default();
        state.reconcile(&index());
        assert_eq!(state.sample, Some(Sample::S2));
        // S2 has no Pre images
        assert_eq!(state.magnification, None);
    }

    #[test]
    fn test_reconcile_keeps_valid_selection() {
        let mut state = ImageBrowserState {
            sample: Some(Sample::S2),
            treatment: Treatment::T2,
            magnification: Some(Magnification::X40),
            ..Default::default()
        };
        state.reconcile(&index());
        assert_eq!(state.sample, Some(Sample::S2));
        assert_eq!(state.magnification, Some(Magnification::X40));
    }

    #[test]
    fn test_reconcile_falls_back_on_stale_magnification() {
        let mut state = ImageBrowserState {
            sample: Some(Sample::S3),
            treatment: Treatment::Pre,
            magnification: Some(Magnification::X10),
            ..Default::default()
        };
        state.reconcile(&index());
        assert_eq!(state.magnification, Some(Magnification::X40));
    }

    #[test]
    fn test_reconcile_replaces_sample_without_images() {
        let mut state = ImageBrowserState {
            sample: Some(Sample::S4),
            ..Default::default()
        };
        state.reconcile(&index());
        assert_eq!(state.sample, Some(Sample::S2));
    }

    #[test]
    fn test_reconcile_empty_index() {
        let mut state = ImageBrowserState {
            sample: Some(Sample::S1),
            magnification: Some(Magnification::X10),
            ..Default::default()
        };
        state.reconcile(&ImageIndex::default());
        assert_eq!(state.sample, None);
        assert_eq!(state.magnification, None);
    }

    #[test]
    fn test_decode_image_errors_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(decode_image(&path), Err(DashboardError::Image { .. })));
    }

    #[test]
    fn test_decode_image_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.size, [3, 2]);
    }
}
