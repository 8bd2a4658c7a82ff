/// Raw measurement table for one sample, with values shown to 4 significant figures

use egui_extras::{Column, TableBuilder};

use crate::data::measurement::MeasurementTable;
use crate::pipeline::reshape::SampleView;

/// Format like printf `%.{sig}g`: fixed notation for moderate exponents,
/// scientific otherwise, trailing zeros removed.
pub fn format_sig(value: f64, sig: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let sig = sig.max(1);
    // Round to `sig` digits first; the exponent can shift (9.9996 -> 10.00)
    let sci = format!("{:.*e}", sig - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= sig as i32 {
        let mantissa = strip_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        strip_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Time column plus every column of the view's sample; each treatment's
/// peak cell is drawn in `peak_color`
pub fn show_raw_table(
    ui: &mut egui::Ui,
    table: &MeasurementTable,
    view: &SampleView,
    peak_color: egui::Color32,
) {
    let sample = view.sample;
    let columns: Vec<_> = table.columns_for(sample).collect();
    if columns.is_empty() {
        ui.label(format!("No columns for {}", sample));
        return;
    }

    let text_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;
    TableBuilder::new(ui)
        .id_salt(("raw_table", sample.as_str()))
        .striped(true)
        .resizable(true)
        .max_scroll_height(320.0)
        .column(Column::auto().at_least(60.0))
        .columns(Column::auto().at_least(70.0), columns.len())
        .header(text_height, |mut header| {
            header.col(|ui| {
                ui.strong("Time");
            });
            for col in &columns {
                header.col(|ui| {
                    ui.strong(col.key.name());
                });
            }
        })
        .body(|body| {
            body.rows(text_height, table.row_count(), |mut row| {
                let i = row.index();
                row.col(|ui| {
                    ui.monospace(format_sig(table.times[i], 4));
                });
                for col in &columns {
                    let is_peak = view
                        .max_points
                        .iter()
                        .any(|m| m.treatment == col.key.treatment && m.row == i);
                    row.col(|ui| {
                        let text = col.values[i].map(|v| format_sig(v, 4)).unwrap_or_default();
                        if is_peak {
                            ui.label(egui::RichText::new(text).monospace().strong().color(peak_color));
                        } else {
                            ui.monospace(text);
                        }
                    });
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sig_fixed() {
        assert_eq!(format_sig(1.034401, 4), "1.034");
        assert_eq!(format_sig(2.207954, 4), "2.208");
        assert_eq!(format_sig(0.5, 4), "0.5");
        assert_eq!(format_sig(12.0, 4), "12");
        assert_eq!(format_sig(123.456, 4), "123.5");
        assert_eq!(format_sig(-0.012346, 4), "-0.01235");
        assert_eq!(format_sig(0.0, 4), "0");
    }

    #[test]
    fn test_format_sig_scientific() {
        assert_eq!(format_sig(12346.0, 4), "1.235e+04");
        assert_eq!(format_sig(0.00001234, 4), "1.234e-05");
        assert_eq!(format_sig(100000.0, 4), "1e+05");
    }

    #[test]
    fn test_format_sig_rounding_carries_exponent() {
        assert_eq!(format_sig(9.99996, 4), "10");
        assert_eq!(format_sig(9999.6, 4), "1e+04");
    }
}
