/// CSV export of the chart tables (maxima grid, treatment means, percent change)

use std::io;
use std::path::Path;

use crate::data::measurement::Sample;
use crate::error::{DashboardError, Result};
use crate::pipeline::derived::Summary;

/// Write the three summary tables as one long CSV: `table,treatment,sample,value`
pub fn write_summary<W: io::Write>(summary: &Summary, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["table", "treatment", "sample", "value"])?;

    for (treatment, sample, value) in summary.active().long_form() {
        wtr.write_record([
            "max",
            treatment.as_str(),
            sample.as_str(),
            &value.to_string(),
        ])?;
    }
    for mean in &summary.means {
        wtr.write_record([
            "treatment_mean",
            mean.treatment.as_str(),
            "",
            &mean.mean.to_string(),
        ])?;
    }
    for pc in &summary.percent_changes {
        wtr.write_record([
            "percent_change",
            pc.treatment.as_str(),
            pc.sample.as_str(),
            &pc.percent.to_string(),
        ])?;
    }

    wtr.flush().map_err(|e| DashboardError::io("<csv output>", e))?;
    Ok(())
}

pub fn save_summary(summary: &Summary, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| DashboardError::io(path, e))?;
    write_summary(summary, file)?;
    log::info!("Exported summary tables to {}", path.display());
    Ok(())
}

/// Pivoted maxima grid as it appears in the bar chart: `Treatment,S1,S2,S3,S4,Mean`
pub fn write_grid<W: io::Write>(summary: &Summary, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Treatment".to_string()];
    header.extend(Sample::ALL.iter().map(|s| s.to_string()));
    header.push("Mean".to_string());
    wtr.write_record(&header)?;

    for (treatment, row) in summary.active().rows() {
        let mut record = vec![treatment.to_string()];
        record.extend(row.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
        let mean = summary
            .means
            .iter()
            .find(|m| m.treatment == treatment)
            .map(|m| m.mean.to_string())
            .unwrap_or_default();
        record.push(mean);
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|e| DashboardError::io("<csv output>", e))?;
    Ok(())
}

pub fn save_grid(summary: &Summary, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| DashboardError::io(path, e))?;
    write_grid(summary, file)?;
    log::info!("Exported maxima grid to {}", path.display());
    Ok(())
}
