/// Per-sample tabs: tensile strength over time, one line per treatment,
/// with each treatment's peak marked in red

use egui_plot::{Corner, Legend, Line, MarkerShape, Plot, PlotBounds, PlotPoints, Points};

use crate::data::measurement::{MeasurementTable, Sample};
use crate::gui::data_table;
use crate::gui::theme::ThemeColors;
use crate::pipeline::reshape::SampleView;

const MAX_POINTS_NAME: &str = "Max Points";

#[derive(Debug, Clone)]
pub struct SampleViewState {
    pub active: Sample,
}

impl Default for SampleViewState {
    fn default() -> Self {
        Self { active: Sample::S1 }
    }
}

/// Tab buttons, one per sample
pub fn show_sample_tabs(ui: &mut egui::Ui, state: &mut SampleViewState, colors: &ThemeColors) {
    ui.horizontal(|ui| {
        for sample in Sample::ALL {
            let active = state.active == sample;
            let label = egui::RichText::new(sample.tab_label())
                .size(13.0)
                .color(if active { colors.tab_active_text } else { colors.tab_inactive_text });
            let btn = egui::Button::new(label)
                .fill(if active { colors.tab_active_bg } else { colors.tab_inactive_bg })
                .corner_radius(6.0);
            if ui.add(btn).clicked() {
                state.active = sample;
            }
            ui.add_space(4.0);
        }
    });
}

/// Chart bounds: x fixed to `[0, max_time]`, y spanning every reading
/// with a 5% margin
pub fn plot_bounds(view: &SampleView) -> Option<([f64; 2], [f64; 2])> {
    let (x_lo, x_hi) = view.x_range()?;
    let (y_lo, y_hi) = view
        .records
        .iter()
        .filter_map(|r| r.value)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })?;
    let margin = if y_hi > y_lo { (y_hi - y_lo) * 0.05 } else { 1.0 };
    Some(([x_lo, y_lo - margin], [x_hi, y_hi + margin]))
}

/// Line chart with max-point overlay, then the collapsible raw data
pub fn show_sample_view(
    ui: &mut egui::Ui,
    view: &SampleView,
    table: &MeasurementTable,
    colors: &ThemeColors,
) {
    let title = format!("{} - Tensile Strength Over Time", view.sample.tab_label());
    ui.label(egui::RichText::new(title).strong().size(14.0));

    if view.is_empty() {
        ui.colored_label(
            colors.warning,
            format!("No {}_* columns in the loaded data", view.sample),
        );
        return;
    }

    // Hover labels for the red markers, matched by position
    let max_labels: Vec<([f64; 2], String)> = view
        .max_points
        .iter()
        .map(|m| ([m.time, m.value], m.label.clone()))
        .collect();

    let bounds = plot_bounds(view);
    let plot = Plot::new(format!("tensile_{}", view.sample))
        .height(400.0)
        .allow_drag(false)
        .allow_zoom(false)
        .x_axis_label("Time")
        .y_axis_label("Tensile Strength")
        .allow_scroll(false)
        .legend(
            Legend::default()
                .position(Corner::RightTop)
                .background_alpha(0.6),
        )
        .label_formatter(move |name, value| {
            if name == MAX_POINTS_NAME {
                let nearest = max_labels.iter().min_by(|a, b| {
                    let da = (a.0[0] - value.x).powi(2) + (a.0[1] - value.y).powi(2);
                    let db = (b.0[0] - value.x).powi(2) + (b.0[1] - value.y).powi(2);
                    da.total_cmp(&db)
                });
                if let Some((_, label)) = nearest {
                    return label.clone();
                }
            }
            if name.is_empty() {
                format!("Time: {:.3}\nTensile Strength: {:.4}", value.x, value.y)
            } else {
                format!(
                    "Treatment {}\nTime: {:.3}\nTensile Strength: {:.4}",
                    name, value.x, value.y
                )
            }
        });

    let series = view.series();
    plot.show(ui, |plot_ui| {
        if let Some((min, max)) = bounds {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(min, max));
        }
        for (treatment, points) in series {
            let line = Line::new(PlotPoints::from(points))
                .name(treatment.as_str())
                .color(colors.treatment_color(treatment))
                .width(1.5);
            plot_ui.line(line);
        }

        let markers: PlotPoints = view
            .max_points
            .iter()
            .map(|m| [m.time, m.value])
            .collect();
        plot_ui.points(
            Points::new(markers)
                .name(MAX_POINTS_NAME)
                .color(colors.max_marker)
                .shape(MarkerShape::Circle)
                .filled(true)
                .radius(4.0),
        );
    });

    ui.add_space(4.0);
    egui::CollapsingHeader::new(format!("🔍 View {} Raw Data", view.sample.tab_label()))
        .id_salt(("raw_data", view.sample.as_str()))
        .default_open(false)
        .show(ui, |ui| {
            data_table::show_raw_table(ui, table, view, colors.max_marker);
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::reshape::reshape_sample;

    fn view(csv: &str) -> SampleView {
        let table = MeasurementTable::from_reader(csv.as_bytes()).unwrap();
        reshape_sample(&table, Sample::S1)
    }

    #[test]
    fn test_bounds_clamp_x_to_max_time() {
        // Negative times stay outside the visible range
        let v = view("Time,S1_Pre\n-2,1\n0,2\n4,3\n");
        let (min, max) = plot_bounds(&v).unwrap();
        assert_eq!(min[0], 0.0);
        assert_eq!(max[0], 4.0);
        assert!((min[1] - 0.9).abs() < 1e-12);
        assert!((max[1] - 3.1).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_flat_series_get_margin() {
        let v = view("Time,S1_Pre\n0,2\n1,2\n");
        let (min, max) = plot_bounds(&v).unwrap();
        assert_eq!((min[1], max[1]), (1.0, 3.0));
    }

    #[test]
    fn test_no_bounds_without_readings() {
        let v = view("Time,S1_Pre\n0,\n1,\n");
        assert_eq!(plot_bounds(&v), None);
    }
}
