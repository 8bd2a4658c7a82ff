/// Top menu bar with file operations and quick toggles

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    None,
    OpenCsv,
    OpenImageDir,
    Reload,
    ExportTables,
    ExportGrid,
    ExportLog,
    SaveSettings,
    ThemeToggle,
    ToggleLog,
    ShowAbout,
}

/// Render the toolbar and return any triggered action
pub fn show_toolbar(ctx: &egui::Context, theme_label: &str, log_open: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("📁 File", |ui| {
                if ui.button("📂 Open Data CSV…").clicked() {
                    action = ToolbarAction::OpenCsv;
                    ui.close_menu();
                }
                if ui.button("🖼 Open Image Folder…").clicked() {
                    action = ToolbarAction::OpenImageDir;
                    ui.close_menu();
                }
                if ui.button("🔄 Reload").clicked() {
                    action = ToolbarAction::Reload;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("📊 Export Summary Tables…").clicked() {
                    action = ToolbarAction::ExportTables;
                    ui.close_menu();
                }
                if ui.button("📋 Export Maxima Grid…").clicked() {
                    action = ToolbarAction::ExportGrid;
                    ui.close_menu();
                }
                if ui.button("📝 Export Activity Log…").clicked() {
                    action = ToolbarAction::ExportLog;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("💾 Save Settings").clicked() {
                    action = ToolbarAction::SaveSettings;
                    ui.close_menu();
                }
            });

            ui.menu_button("🔍 View", |ui| {
                if ui.button(format!("🎨 Theme: {}", theme_label)).clicked() {
                    action = ToolbarAction::ThemeToggle;
                    ui.close_menu();
                }
                let log_label = if log_open { "Hide Activity Log" } else { "Show Activity Log" };
                if ui.button(log_label).clicked() {
                    action = ToolbarAction::ToggleLog;
                    ui.close_menu();
                }
            });

            ui.menu_button("❓ Help", |ui| {
                if ui.button("ℹ About").clicked() {
                    action = ToolbarAction::ShowAbout;
                    ui.close_menu();
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(egui::Button::new(egui::RichText::new(theme_label).size(12.0)).corner_radius(12.0))
                    .clicked()
                {
                    action = ToolbarAction::ThemeToggle;
                }
                ui.separator();
                ui.label(
                    egui::RichText::new("Tensile Strength Analysis")
                        .color(egui::Color32::from_rgb(0x70, 0x75, 0x80))
                        .size(12.0),
                );
            });
        });
    });

    action
}

pub fn open_csv_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open Tensile Strength Data")
        .add_filter("CSV", &["csv"])
        .add_filter("All Files", &["*"])
        .pick_file()
}

pub fn open_image_dir_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open Microscopy Image Folder")
        .pick_folder()
}

/// Save dialog for the long-form summary or the maxima grid
pub fn save_csv_dialog(title: &str, default_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(default_name)
        .add_filter("CSV (comma-separated)", &["csv"])
        .save_file()
}

pub fn save_log_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export Activity Log")
        .add_filter("Text File", &["txt"])
        .add_filter("JSON", &["json"])
        .save_file()
}
