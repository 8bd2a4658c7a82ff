/// Maxima bar chart, percent-change chart and the reference cross-check

use egui_plot::{Bar, BarChart, Corner, Legend, Line, Plot, PlotPoints, Points};

use crate::data::measurement::{Sample, Treatment};
use crate::data::reference::MaximaSource;
use crate::gui::data_table::format_sig;
use crate::gui::theme::ThemeColors;
use crate::pipeline::derived::Summary;
use crate::pipeline::percent_change::{category_key, category_order};

/// Horizontal spacing between the sample bars of one treatment group
const GROUP_STEP: f64 = 0.2;
const BAR_WIDTH: f64 = 0.18;

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryAction {
    None,
    SetSource(MaximaSource),
}

/// x position of a sample's bar within its treatment group
pub fn grouped_bar_x(treatment: Treatment, sample: Sample) -> f64 {
    treatment.index() as f64 + (sample.index() as f64 - 1.5) * GROUP_STEP
}

/// Label for an integer axis position, empty between categories
fn category_label(value: f64, labels: &[String]) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

pub fn show_source_toggle(ui: &mut egui::Ui, current: MaximaSource) -> SummaryAction {
    let mut action = SummaryAction::None;
    ui.horizontal(|ui| {
        ui.label("Maxima source:");
        for source in [MaximaSource::LoadedData, MaximaSource::Reference] {
            if ui.radio(current == source, source.label()).clicked() && current != source {
                action = SummaryAction::SetSource(source);
            }
        }
    });
    action
}

/// Grouped bars of peak strength per treatment, one series per sample,
/// with the treatment mean drawn on top
pub fn show_maxima_chart(ui: &mut egui::Ui, summary: &Summary, colors: &ThemeColors) {
    ui.label(egui::RichText::new("Maximum Tensile Strength by Treatment").strong().size(14.0));

    let grid = summary.active();
    if grid.is_empty() {
        ui.colored_label(colors.warning, "No maxima available");
        return;
    }

    let treatment_labels: Vec<String> =
        Treatment::ALL.iter().map(|t| t.as_str().to_string()).collect();

    let charts: Vec<BarChart> = Sample::ALL
        .iter()
        .map(|&sample| {
            let bars: Vec<Bar> = Treatment::ALL
                .iter()
                .filter_map(|&t| {
                    grid.get(sample, t).map(|v| {
                        Bar::new(grouped_bar_x(t, sample), v)
                            .width(BAR_WIDTH)
                            .name(format!("{} {}", sample, t))
                    })
                })
                .collect();
            BarChart::new(bars)
                .name(sample.as_str())
                .color(colors.sample_color(sample))
                .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
                    format!("{}\n{:.4}", bar.name, bar.value)
                }))
        })
        .collect();

    let mean_points: Vec<[f64; 2]> = summary
        .means
        .iter()
        .map(|m| [m.treatment.index() as f64, m.mean])
        .collect();

    Plot::new("maxima_chart")
        .height(360.0)
        .y_axis_label("Tensile Strength")
        .allow_scroll(false)
        .include_y(0.0)
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_formatter(move |mark, _range| category_label(mark.value, &treatment_labels))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
            plot_ui.line(
                Line::new(PlotPoints::from(mean_points.clone()))
                    .name("Treatment Mean")
                    .color(colors.mean_line)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(mean_points))
                    .name("Treatment Mean")
                    .color(colors.mean_line)
                    .filled(true)
                    .radius(4.0),
            );
        });

    egui::CollapsingHeader::new("📋 Maxima Table")
        .id_salt("maxima_table")
        .default_open(false)
        .show(ui, |ui| {
            egui::Grid::new("maxima_grid")
                .striped(true)
                .num_columns(6)
                .show(ui, |ui| {
                    ui.strong("Treatment");
                    for s in Sample::ALL {
                        ui.strong(s.as_str());
                    }
                    ui.strong("Mean");
                    ui.end_row();

                    for (treatment, row) in grid.rows() {
                        ui.label(treatment.as_str());
                        for cell in row {
                            ui.monospace(cell.map(|v| format_sig(v, 4)).unwrap_or_default());
                        }
                        let mean = summary.means.iter().find(|m| m.treatment == treatment);
                        ui.monospace(mean.map(|m| format_sig(m.mean, 4)).unwrap_or_default());
                        ui.end_row();
                    }
                });
        });
}

/// Percent change vs Pre, categories in Treatment × Sample order
pub fn show_percent_chart(ui: &mut egui::Ui, summary: &Summary, colors: &ThemeColors) {
    ui.label(
        egui::RichText::new("Percent Change in Tensile Strength vs Pre-Treatment")
            .strong()
            .size(14.0),
    );

    if summary.percent_changes.is_empty() {
        ui.colored_label(colors.warning, "No percent changes available (missing Pre maxima)");
        return;
    }

    let order = category_order();
    let position = |key: &str| order.iter().position(|k| k == key);

    let charts: Vec<BarChart> = Sample::ALL
        .iter()
        .map(|&sample| {
            let bars: Vec<Bar> = summary
                .percent_changes
                .iter()
                .filter(|pc| pc.sample == sample)
                .filter_map(|pc| {
                    let key = pc.key();
                    position(&key).map(|x| Bar::new(x as f64, pc.percent).width(0.7).name(key))
                })
                .collect();
            BarChart::new(bars)
                .name(sample.as_str())
                .color(colors.sample_color(sample))
                .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
                    format!("{}\n{:.1}%", bar.name, bar.value)
                }))
        })
        .collect();

    let labels = order.clone();
    Plot::new("percent_change_chart")
        .height(360.0)
        .y_axis_label("Percent Change (%)")
        .allow_scroll(false)
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_formatter(move |mark, _range| category_label(mark.value, &labels))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });

    // Every category should be present when the grid is complete
    let missing: Vec<&String> = order
        .iter()
        .filter(|k| !summary.percent_changes.iter().any(|pc| &pc.key() == *k))
        .collect();
    if !missing.is_empty() {
        ui.colored_label(
            colors.text_muted,
            format!("Not shown (missing value or zero baseline): {}", join(&missing)),
        );
    }
}

fn join(keys: &[&String]) -> String {
    keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
}

/// Computed maxima against the reference table
pub fn show_cross_check(ui: &mut egui::Ui, summary: &Summary, tolerance: f64, colors: &ThemeColors) {
    let n = summary.discrepancies.len();
    let title = if summary.computed.is_empty() {
        "🔎 Reference Cross-Check (no data loaded)".to_string()
    } else if n == 0 {
        "🔎 Reference Cross-Check ✔".to_string()
    } else {
        format!("🔎 Reference Cross-Check ({} difference(s))", n)
    };

    egui::CollapsingHeader::new(title)
        .id_salt("cross_check")
        .default_open(false)
        .show(ui, |ui| {
            if summary.computed.is_empty() {
                ui.label("Load a measurement file to compare against the reference maxima.");
                return;
            }
            if n == 0 {
                ui.colored_label(
                    colors.success,
                    format!("All maxima match the reference within {:e}", tolerance),
                );
                return;
            }
            egui::Grid::new("discrepancy_grid")
                .striped(true)
                .num_columns(4)
                .show(ui, |ui| {
                    ui.strong("Cell");
                    ui.strong("Computed");
                    ui.strong("Reference");
                    ui.strong("Δ");
                    ui.end_row();
                    for d in &summary.discrepancies {
                        let fmt = |v: Option<f64>| v.map(|x| format!("{:.6}", x)).unwrap_or_else(|| "-".into());
                        ui.label(category_key(d.treatment, d.sample));
                        ui.monospace(fmt(d.computed));
                        ui.monospace(fmt(d.reference));
                        ui.monospace(d.delta().map(|x| format!("{:+.6}", x)).unwrap_or_else(|| "-".into()));
                        ui.end_row();
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_bar_positions() {
        assert!((grouped_bar_x(Treatment::Pre, Sample::S1) - (-0.3)).abs() < 1e-12);
        assert!((grouped_bar_x(Treatment::Pre, Sample::S4) - 0.3).abs() < 1e-12);
        assert!((grouped_bar_x(Treatment::T5, Sample::S2) - 4.9).abs() < 1e-12);
    }

    #[test]
    fn test_bars_in_group_do_not_overlap() {
        for t in Treatment::ALL {
            let xs: Vec<f64> = Sample::ALL.iter().map(|&s| grouped_bar_x(t, s)).collect();
            for pair in xs.windows(2) {
                assert!(pair[1] - pair[0] >= BAR_WIDTH);
            }
        }
    }

    #[test]
    fn test_category_label() {
        let labels: Vec<String> = ["Pre", "T1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(category_label(0.0, &labels), "Pre");
        assert_eq!(category_label(1.0, &labels), "T1");
        assert_eq!(category_label(0.5, &labels), "");
        assert_eq!(category_label(2.0, &labels), "");
        assert_eq!(category_label(-1.0, &labels), "");
    }
}
