/// Theme system: switchable light/dark color themes for the dashboard

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AppTheme {
    Light,
    Dark,
}

impl AppTheme {
    pub fn label(&self) -> &'static str {
        match self {
            AppTheme::Light => "☀ Light",
            AppTheme::Dark => "🌙 Dark",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            AppTheme::Light => AppTheme::Dark,
            AppTheme::Dark => AppTheme::Light,
        }
    }
}

/// All colors a theme needs to provide
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Panels & backgrounds
    pub panel_fill: egui::Color32,
    pub window_fill: egui::Color32,
    pub faint_bg: egui::Color32,

    // Widgets
    pub widget_inactive_bg: egui::Color32,
    pub widget_hovered_bg: egui::Color32,
    pub widget_active_bg: egui::Color32,
    pub selection_bg: egui::Color32,
    pub selection_stroke: egui::Color32,

    // Text
    pub text_primary: egui::Color32,
    pub text_muted: egui::Color32,

    pub success: egui::Color32,
    pub warning: egui::Color32,
    pub error: egui::Color32,

    // Charts
    /// S1..S4, shared by every chart so a sample keeps its color
    pub sample_colors: [egui::Color32; 4],
    /// Treatment lines in the per-sample charts (Pre, T1..T5)
    pub treatment_colors: [egui::Color32; 6],
    pub max_marker: egui::Color32,
    pub mean_line: egui::Color32,

    // Tab buttons
    pub tab_active_bg: egui::Color32,
    pub tab_active_text: egui::Color32,
    pub tab_inactive_bg: egui::Color32,
    pub tab_inactive_text: egui::Color32,

    // Status bar
    pub status_bar_bg: egui::Color32,
    pub status_text: egui::Color32,

    pub is_dark: bool,
}

/// Sample palette used by the percent-change chart
const SAMPLE_PALETTE: [egui::Color32; 4] = [
    egui::Color32::from_rgb(0x1f, 0x77, 0xb4),
    egui::Color32::from_rgb(0xff, 0x7f, 0x0e),
    egui::Color32::from_rgb(0x2c, 0xa0, 0x2c),
    egui::Color32::from_rgb(0xd6, 0x27, 0x28),
];

impl ThemeColors {
    pub fn from_theme(theme: AppTheme) -> Self {
        match theme {
            AppTheme::Light => Self::light(),
            AppTheme::Dark => Self::dark(),
        }
    }

    fn light() -> Self {
        Self {
            panel_fill: egui::Color32::from_rgb(0xF7, 0xF7, 0xF8),
            window_fill: egui::Color32::from_rgb(0xFF, 0xFF, 0xFF),
            faint_bg: egui::Color32::from_rgb(0xF0, 0xF1, 0xF3),

            widget_inactive_bg: egui::Color32::from_rgb(0xE3, 0xE5, 0xE8),
            widget_hovered_bg: egui::Color32::from_rgb(0xD8, 0xDD, 0xE6),
            widget_active_bg: egui::Color32::from_rgb(0x3B, 0x7D, 0xC0),
            selection_bg: egui::Color32::from_rgba_premultiplied(0x3B, 0x7D, 0xC0, 0x40),
            selection_stroke: egui::Color32::from_rgb(0x3B, 0x7D, 0xC0),

            text_primary: egui::Color32::from_rgb(0x1E, 0x1E, 0x24),
            text_muted: egui::Color32::from_rgb(0x70, 0x75, 0x80),

            success: egui::Color32::from_rgb(0x27, 0x8B, 0x4A),
            warning: egui::Color32::from_rgb(0xC0, 0x7A, 0x00),
            error: egui::Color32::from_rgb(0xC6, 0x28, 0x28),

            sample_colors: SAMPLE_PALETTE,
            treatment_colors: [
                egui::Color32::from_rgb(0x63, 0x6E, 0xFA),
                egui::Color32::from_rgb(0xEF, 0x55, 0x3B),
                egui::Color32::from_rgb(0x00, 0xCC, 0x96),
                egui::Color32::from_rgb(0xAB, 0x63, 0xFA),
                egui::Color32::from_rgb(0xFF, 0xA1, 0x5A),
                egui::Color32::from_rgb(0x19, 0xD3, 0xF3),
            ],
            max_marker: egui::Color32::from_rgb(0xE0, 0x20, 0x20),
            mean_line: egui::Color32::BLACK,

            tab_active_bg: egui::Color32::from_rgb(0x3B, 0x7D, 0xC0),
            tab_active_text: egui::Color32::WHITE,
            tab_inactive_bg: egui::Color32::from_rgb(0xE3, 0xE5, 0xE8),
            tab_inactive_text: egui::Color32::from_rgb(0x40, 0x44, 0x4C),

            status_bar_bg: egui::Color32::from_rgb(0xEB, 0xEC, 0xEE),
            status_text: egui::Color32::from_rgb(0x40, 0x44, 0x4C),

            is_dark: false,
        }
    }

    fn dark() -> Self {
        Self {
            panel_fill: egui::Color32::from_rgb(0x1B, 0x1D, 0x22),
            window_fill: egui::Color32::from_rgb(0x22, 0x25, 0x2B),
            faint_bg: egui::Color32::from_rgb(0x26, 0x29, 0x30),

            widget_inactive_bg: egui::Color32::from_rgb(0x2E, 0x32, 0x3A),
            widget_hovered_bg: egui::Color32::from_rgb(0x3A, 0x40, 0x4A),
            widget_active_bg: egui::Color32::from_rgb(0x4A, 0x90, 0xD9),
            selection_bg: egui::Color32::from_rgba_premultiplied(0x4A, 0x90, 0xD9, 0x50),
            selection_stroke: egui::Color32::from_rgb(0x4A, 0x90, 0xD9),

            text_primary: egui::Color32::from_rgb(0xE4, 0xE6, 0xEB),
            text_muted: egui::Color32::from_rgb(0x8A, 0x90, 0x9C),

            success: egui::Color32::from_rgb(0x4C, 0xC3, 0x7A),
            warning: egui::Color32::from_rgb(0xF0, 0xB4, 0x3C),
            error: egui::Color32::from_rgb(0xF0, 0x5A, 0x5A),

            sample_colors: SAMPLE_PALETTE,
            treatment_colors: [
                egui::Color32::from_rgb(0x83, 0x8E, 0xFF),
                egui::Color32::from_rgb(0xFF, 0x75, 0x5B),
                egui::Color32::from_rgb(0x20, 0xEC, 0xB6),
                egui::Color32::from_rgb(0xCB, 0x83, 0xFF),
                egui::Color32::from_rgb(0xFF, 0xC1, 0x7A),
                egui::Color32::from_rgb(0x39, 0xF3, 0xFF),
            ],
            max_marker: egui::Color32::from_rgb(0xFF, 0x40, 0x40),
            mean_line: egui::Color32::from_rgb(0xF0, 0xF0, 0xF0),

            tab_active_bg: egui::Color32::from_rgb(0x4A, 0x90, 0xD9),
            tab_active_text: egui::Color32::WHITE,
            tab_inactive_bg: egui::Color32::from_rgb(0x2E, 0x32, 0x3A),
            tab_inactive_text: egui::Color32::from_rgb(0xA8, 0xAE, 0xBA),

            status_bar_bg: egui::Color32::from_rgb(0x15, 0x17, 0x1B),
            status_text: egui::Color32::from_rgb(0xA8, 0xAE, 0xBA),

            is_dark: true,
        }
    }

    pub fn sample_color(&self, sample: crate::data::measurement::Sample) -> egui::Color32 {
        self.sample_colors[sample.index()]
    }

    pub fn treatment_color(&self, treatment: crate::data::measurement::Treatment) -> egui::Color32 {
        self.treatment_colors[treatment.index()]
    }
}

/// Apply a theme to the egui context
pub fn apply_theme(ctx: &egui::Context, theme: AppTheme) {
    let c = ThemeColors::from_theme(theme);

    let mut visuals = if c.is_dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    visuals.panel_fill = c.panel_fill;
    visuals.window_fill = c.window_fill;
    visuals.faint_bg_color = c.faint_bg;
    visuals.override_text_color = Some(c.text_primary);

    visuals.widgets.inactive.bg_fill = c.widget_inactive_bg;
    visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(4);
    visuals.widgets.hovered.bg_fill = c.widget_hovered_bg;
    visuals.widgets.active.bg_fill = c.widget_active_bg;

    visuals.selection.bg_fill = c.selection_bg;
    visuals.selection.stroke = egui::Stroke::new(1.5, c.selection_stroke);

    ctx.set_visuals(visuals);
}
