/// Main application state and eframe::App implementation
///
/// Ties together the measurement data, the derived chart tables, the
/// image index, the activity log and the GUI panels.

use std::path::PathBuf;

use eframe::egui;

use crate::config::{DashboardConfig, CONFIG_FILE};
use crate::data::images::ImageIndex;
use crate::data::measurement::MeasurementTable;
use crate::data::reference::MaximaSource;
use crate::gui::image_browser::{self, ImageBrowserAction, ImageBrowserState};
use crate::gui::sample_view::{self, SampleViewState};
use crate::gui::summary_view::{self, SummaryAction};
use crate::gui::theme::{self, ThemeColors};
use crate::gui::toolbar::{self, ToolbarAction};
use crate::log::activity::ActivityLog;
use crate::pipeline::derived::DerivedViews;
use crate::pipeline::export;

pub struct DashboardApp {
    config: DashboardConfig,

    /// Loaded table and everything computed from it
    derived: DerivedViews,
    image_index: ImageIndex,

    activity: ActivityLog,

    /// GUI sub-states
    sample_state: SampleViewState,
    image_state: ImageBrowserState,

    status_message: String,
    /// Last CSV load failure, shown in place of the sample charts
    load_error: Option<String>,
    show_log_window: bool,
    show_about: bool,

    theme_colors: ThemeColors,

    dropped_files: Vec<PathBuf>,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        theme::apply_theme(&cc.egui_ctx, config.theme);
        let theme_colors = ThemeColors::from_theme(config.theme);

        let ppi = cc.egui_ctx.pixels_per_point();
        let base_size = if ppi > 1.5 { 14.0 } else { 13.0 };
        let mut style = (*cc.egui_ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::new(base_size, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::new(base_size * 1.4, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Monospace,
            egui::FontId::new(base_size * 0.92, egui::FontFamily::Monospace),
        );
        style.spacing.item_spacing = egui::vec2(8.0, 5.0);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);
        cc.egui_ctx.set_style(style);

        let mut app = Self {
            derived: DerivedViews::new(),
            image_index: ImageIndex::default(),
            activity: ActivityLog::new(),
            sample_state: SampleViewState::default(),
            image_state: ImageBrowserState::default(),
            status_message: "Ready".to_string(),
            load_error: None,
            show_log_window: false,
            show_about: false,
            theme_colors,
            dropped_files: Vec::new(),
            config,
        };

        app.load_csv(app.config.data_file.clone());
        app.scan_images(app.config.image_dir.clone());
        app
    }

    fn load_csv(&mut self, path: PathBuf) {
        match MeasurementTable::load_csv(&path) {
            Ok(table) => {
                let detail = format!(
                    "{}: {} rows, {} columns",
                    path.display(),
                    table.row_count(),
                    table.columns.len()
                );
                if !table.ignored_columns.is_empty() {
                    log::warn!("Ignored columns: {}", table.ignored_columns.join(", "));
                }
                if table.skipped_rows > 0 {
                    log::warn!("Skipped {} rows without a Time value", table.skipped_rows);
                }
                self.activity.set_source(&path.display().to_string());
                self.activity.add_entry("Load CSV", &detail);
                self.status_message = format!("Loaded {}", detail);
                self.derived.set_table(table);
                self.load_error = None;
                self.config.data_file = path;
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                self.activity.add_entry("Load CSV failed", &e.to_string());
                self.status_message = format!("Error loading {}: {}", path.display(), e);
                self.load_error = Some(e.to_string());
                self.derived.clear_table();
            }
        }
    }

    fn scan_images(&mut self, dir: PathBuf) {
        match ImageIndex::scan(&dir) {
            Ok(index) => {
                let detail = format!(
                    "{}: {} images, {} issues",
                    dir.display(),
                    index.records.len(),
                    index.issues.len()
                );
                self.activity.add_entry("Scan Images", &detail);
                self.image_index = index;
                self.image_state.clear_cache();
                self.config.image_dir = dir;
            }
            Err(e) => {
                log::error!("Failed to scan {}: {}", dir.display(), e);
                self.status_message = format!("Error scanning images: {}", e);
            }
        }
    }

    fn set_maxima_source(&mut self, source: MaximaSource) {
        self.config.maxima_source = source;
        self.activity.add_entry("Maxima Source", source.label());
        self.status_message = format!("Charts use: {}", source.label());
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::OpenCsv => {
                if let Some(path) = toolbar::open_csv_dialog() {
                    self.load_csv(path);
                }
            }
            ToolbarAction::OpenImageDir => {
                if let Some(dir) = toolbar::open_image_dir_dialog() {
                    self.scan_images(dir);
                }
            }
            ToolbarAction::Reload => {
                self.load_csv(self.config.data_file.clone());
                self.scan_images(self.config.image_dir.clone());
            }
            ToolbarAction::ExportTables => {
                let Some(summary) = self.derived.summary() else {
                    self.status_message = "Nothing to export".to_string();
                    return;
                };
                if let Some(path) = toolbar::save_csv_dialog("Export Summary Tables", "summary.csv") {
                    match export::save_summary(summary, &path) {
                        Ok(()) => {
                            self.activity.add_entry("Export Tables", &path.display().to_string());
                            self.status_message = format!("Tables saved: {}", path.display());
                        }
                        Err(e) => {
                            log::error!("{}", e);
                            self.status_message = format!("Export failed: {}", e);
                        }
                    }
                }
            }
            ToolbarAction::ExportGrid => {
                let Some(summary) = self.derived.summary() else {
                    self.status_message = "Nothing to export".to_string();
                    return;
                };
                if let Some(path) = toolbar::save_csv_dialog("Export Maxima Grid", "maxima.csv") {
                    match export::save_grid(summary, &path) {
                        Ok(()) => {
                            self.activity.add_entry("Export Grid", &path.display().to_string());
                            self.status_message = format!("Grid saved: {}", path.display());
                        }
                        Err(e) => {
                            log::error!("{}", e);
                            self.status_message = format!("Export failed: {}", e);
                        }
                    }
                }
            }
            ToolbarAction::ExportLog => {
                if let Some(path) = toolbar::save_log_dialog() {
                    match self.activity.save(&path) {
                        Ok(()) => self.status_message = format!("Log saved: {}", path.display()),
                        Err(e) => {
                            log::error!("Error saving log: {}", e);
                            self.status_message = format!("Error saving log: {}", e);
                        }
                    }
                }
            }
            ToolbarAction::SaveSettings => {
                match self.config.save(std::path::Path::new(CONFIG_FILE)) {
                    Ok(()) => self.status_message = format!("Settings saved to {}", CONFIG_FILE),
                    Err(e) => {
                        log::error!("{}", e);
                        self.status_message = format!("Could not save settings: {}", e);
                    }
                }
            }
            ToolbarAction::ThemeToggle => {
                self.config.theme = self.config.theme.next();
                self.theme_colors = ThemeColors::from_theme(self.config.theme);
                // applied on the next frame in update()
            }
            ToolbarAction::ToggleLog => self.show_log_window = !self.show_log_window,
            ToolbarAction::ShowAbout => self.show_about = true,
            ToolbarAction::None => {}
        }
    }

    fn handle_image_action(&mut self, action: ImageBrowserAction) {
        match action {
            ImageBrowserAction::Rescan => self.scan_images(self.config.image_dir.clone()),
            ImageBrowserAction::PickFolder => {
                if let Some(dir) = toolbar::open_image_dir_dialog() {
                    self.scan_images(dir);
                }
            }
            ImageBrowserAction::None => {}
        }
    }

    /// CSV files are loaded as data, directories are scanned for images
    fn handle_dropped(&mut self, path: PathBuf) {
        if path.is_dir() {
            self.scan_images(path);
            return;
        }
        let is_csv = path
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            self.load_csv(path);
        } else {
            self.status_message = format!("Not a CSV file: {}", path.display());
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        theme::apply_theme(ctx, self.config.theme);

        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    self.dropped_files.push(path.clone());
                }
            }
        });
        if let Some(path) = self.dropped_files.pop() {
            self.handle_dropped(path);
        }

        self.derived
            .refresh(self.config.maxima_source, self.config.reference_tolerance);

        // ── Toolbar ──
        let toolbar_action =
            toolbar::show_toolbar(ctx, self.config.theme.label(), self.show_log_window);
        if toolbar_action != ToolbarAction::None {
            self.handle_toolbar_action(toolbar_action);
        }

        // ── Status Bar ──
        let tc = self.theme_colors.clone();
        let rows = self.derived.table().map(|t| t.row_count()).unwrap_or(0);
        egui::TopBottomPanel::bottom("status_bar")
            .frame(
                egui::Frame::new()
                    .fill(tc.status_bar_bg)
                    .inner_margin(egui::Margin::symmetric(12, 4)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.5)
                            .color(tc.status_text),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(self.config.maxima_source.label())
                                .size(11.0)
                                .color(tc.text_muted),
                        );
                        ui.separator();
                        ui.label(
                            egui::RichText::new(format!(
                                "{} rows | {} images",
                                rows,
                                self.image_index.records.len()
                            ))
                            .size(11.0)
                            .color(tc.text_muted),
                        );
                    });
                });
            });

        // ── Dashboard ──
        let mut summary_action = SummaryAction::None;
        let mut image_action = ImageBrowserAction::None;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("📊 Tensile Strength Analysis Dashboard");
                    ui.add_space(6.0);

                    ui.label(egui::RichText::new("Tensile Strength by Sample").strong().size(16.0));
                    sample_view::show_sample_tabs(ui, &mut self.sample_state, &tc);
                    ui.add_space(4.0);
                    match (self.derived.table(), self.derived.view(self.sample_state.active)) {
                        (Some(table), Some(view)) => {
                            sample_view::show_sample_view(ui, view, table, &tc);
                        }
                        _ => {
                            egui::Frame::new()
                                .fill(tc.faint_bg)
                                .inner_margin(egui::Margin::same(12))
                                .corner_radius(6.0)
                                .show(ui, |ui| match &self.load_error {
                                    Some(err) => {
                                        ui.colored_label(tc.error, format!("✖ {}", err));
                                        ui.label("Open a measurement CSV from the File menu or drop one here.");
                                    }
                                    None => {
                                        ui.label("No measurement data loaded.");
                                    }
                                });
                        }
                    }

                    ui.add_space(8.0);
                    ui.separator();
                    summary_action = summary_view::show_source_toggle(ui, self.config.maxima_source);
                    if let Some(summary) = self.derived.summary() {
                        summary_view::show_maxima_chart(ui, summary, &tc);
                        ui.add_space(8.0);
                        summary_view::show_percent_chart(ui, summary, &tc);
                        ui.add_space(4.0);
                        summary_view::show_cross_check(
                            ui,
                            summary,
                            self.config.reference_tolerance,
                            &tc,
                        );
                    }

                    ui.add_space(8.0);
                    ui.separator();
                    ui.label(egui::RichText::new("🔬 Microscopy Images").strong().size(16.0));
                    image_action = image_browser::show_image_browser(
                        ui,
                        &mut self.image_state,
                        &self.image_index,
                        &tc,
                    );

                    ui.add_space(12.0);
                    ui.separator();
                    ui.hyperlink_to("Project repository", &self.config.project_url);
                });
        });

        if let SummaryAction::SetSource(source) = summary_action {
            self.set_maxima_source(source);
        }
        if image_action != ImageBrowserAction::None {
            self.handle_image_action(image_action);
        }

        // ── Log Window ──
        if self.show_log_window {
            egui::Window::new("📋 Activity Log")
                .open(&mut self.show_log_window)
                .default_size([600.0, 400.0])
                .resizable(true)
                .show(ctx, |ui| {
                    ui.label(format!("{} entries", self.activity.len()));
                    ui.separator();
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.style_mut().override_font_id = Some(egui::FontId::monospace(12.0));
                        ui.label(self.activity.to_text());
                    });
                });
        }

        // ── About Dialog ──
        if self.show_about {
            egui::Window::new("About")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.heading("📊 Tensile Strength Analysis");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(10.0);
                    ui.label("Built with Rust + egui");
                    ui.add_space(10.0);
                    ui.label("• Tensile strength over time per sample");
                    ui.label("• Peak strength by treatment, with means");
                    ui.label("• Percent change vs pre-treatment");
                    ui.label("• Microscopy image browser");
                });
        }

        let open_shortcut =
            ctx.input(|i| (i.modifiers.ctrl || i.modifiers.command) && i.key_pressed(egui::Key::O));
        if open_shortcut {
            self.handle_toolbar_action(ToolbarAction::OpenCsv);
        }
    }
}
