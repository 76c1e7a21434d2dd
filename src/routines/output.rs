//! Tab separated output of simulations, scans and fits
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::experiments::scans::ScanPk;
use crate::experiments::{display, ExperimentResult};
use crate::fitting::FitResult;
use crate::model::body::output_unit;
use crate::routines::pk::PkParameters;
use crate::routines::units::Unit;
use crate::simulator::{ScanResult, SimulationResult, TimecourseResult};

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(writer)
}

/// Header and factor from model to display unit of every column
fn display_columns(result: &TimecourseResult) -> Result<Vec<(String, f64)>> {
    result
        .columns
        .iter()
        .map(|sid| {
            let model_unit = if sid == "time" { Some("min") } else { output_unit(sid) };
            match (model_unit, display(sid)) {
                (Some(from), Some((_, to))) => {
                    let factor = Unit::parse(from)?.factor_to(&Unit::parse(to)?)?;
                    Ok((format!("{} [{}]", sid, to), factor))
                }
                _ => Ok((sid.clone(), 1.0)),
            }
        })
        .collect()
}

/// Timecourse in display units, one row per time point
pub fn write_timecourse<W: Write>(writer: W, result: &TimecourseResult) -> Result<()> {
    let columns = display_columns(result)?;
    let mut writer = tsv_writer(writer);
    writer.write_record(columns.iter().map(|(header, _)| header))?;
    for row in result.data.rows() {
        writer.write_record(
            row.iter()
                .zip(&columns)
                .map(|(value, (_, factor))| format!("{}", value * factor)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// All points of a scan in long format, the scanned values leading every row
pub fn write_scan<W: Write>(writer: W, scan: &ScanResult) -> Result<()> {
    let Some(first) = scan.points.first() else {
        return Ok(());
    };
    let columns = display_columns(&first.result)?;
    let mut writer = tsv_writer(writer);
    let mut header: Vec<String> = vec!["point".to_string()];
    header.extend(first.values.iter().map(|(sid, q)| format!("{} [{}]", sid, q.unit)));
    header.extend(columns.iter().map(|(h, _)| h.clone()));
    writer.write_record(&header)?;

    for (k, point) in scan.points.iter().enumerate() {
        for row in point.result.data.rows() {
            let mut record = vec![k.to_string()];
            record.extend(point.values.iter().map(|(_, q)| q.value.to_string()));
            record.extend(row.iter().zip(&columns).map(|(v, (_, f))| (v * f).to_string()));
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Pharmacokinetic parameters per scan point and substance
pub fn write_scan_pk<W: Write>(writer: W, table: &[ScanPk]) -> Result<()> {
    let mut writer = tsv_writer(writer);
    let Some(first) = table.first() else {
        return Ok(());
    };
    let mut header: Vec<String> = first.values.iter().map(|(sid, q)| format!("{} [{}]", sid, q.unit)).collect();
    header.push("substance".to_string());
    header.extend(
        PkParameters::UNITS
            .iter()
            .map(|(key, unit)| format!("{} [{}]", key, unit)),
    );
    writer.write_record(&header)?;
    for point in table {
        for pk in &point.pk {
            let mut record: Vec<String> = point.values.iter().map(|(_, q)| q.value.to_string()).collect();
            record.push(pk.substance.clone());
            record.extend(pk.values().iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Coagulation summaries per scan point
pub fn write_scan_pd<W: Write>(writer: W, table: &[ScanPk]) -> Result<()> {
    let mut writer = tsv_writer(writer);
    let Some(first) = table.first() else {
        return Ok(());
    };
    let mut header: Vec<String> = first.values.iter().map(|(sid, q)| format!("{} [{}]", sid, q.unit)).collect();
    header.extend(["sid", "unit", "baseline", "max", "min", "tmax [hr]"].map(String::from));
    writer.write_record(&header)?;
    for point in table {
        for pd in &point.pd {
            let mut record: Vec<String> = point.values.iter().map(|(_, q)| q.value.to_string()).collect();
            record.extend([
                pd.sid.clone(),
                pd.unit.clone(),
                pd.baseline.to_string(),
                pd.max.to_string(),
                pd.min.to_string(),
                pd.tmax.to_string(),
            ]);
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write every task of an experiment into `{dir}/{sid}/{task}.tsv`
pub fn write_experiment(dir: &Path, result: &ExperimentResult) -> Result<()> {
    let dir = dir.join(&result.sid);
    std::fs::create_dir_all(&dir)?;
    for (task, simulation) in &result.results {
        let file = File::create(dir.join(format!("{}.tsv", task)))?;
        match simulation {
            SimulationResult::Timecourse(tc) => write_timecourse(file, tc)?,
            SimulationResult::Scan(scan) => {
                write_scan(file, scan)?;
                let table = crate::experiments::scans::scan_pharmacokinetics(scan)?;
                write_scan_pk(File::create(dir.join(format!("{}_pk.tsv", task)))?, &table)?;
                write_scan_pd(File::create(dir.join(format!("{}_pd.tsv", task)))?, &table)?;
            }
        }
    }
    tracing::debug!("Results of {} written to {}", result.sid, dir.display());
    Ok(())
}

/// Writes `parameters.tsv`, `runs.tsv` and `residuals.tsv`
pub fn write_fit_result(dir: &Path, result: &FitResult) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let mut writer = tsv_writer(File::create(dir.join("parameters.tsv"))?);
    writer.write_record(["pid", "value", "unit"])?;
    for ((pid, value), unit) in result.pids.iter().zip(&result.values).zip(&result.units) {
        writer.write_record([pid.clone(), value.to_string(), unit.clone()])?;
    }
    writer.flush()?;

    let mut writer = tsv_writer(File::create(dir.join("runs.tsv"))?);
    let mut header = vec!["run".to_string(), "cost".to_string(), "iterations".to_string(), "duration".to_string()];
    header.extend(result.pids.iter().map(|pid| format!("start_{}", pid)));
    header.extend(result.pids.iter().cloned());
    writer.write_record(&header)?;
    for (k, run) in result.runs.iter().enumerate() {
        let mut record = vec![
            k.to_string(),
            run.cost.to_string(),
            run.iterations.to_string(),
            format!("{:.3}", run.duration),
        ];
        record.extend(run.start.iter().map(|v| v.to_string()));
        record.extend(run.values.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    let mut writer = tsv_writer(File::create(dir.join("residuals.tsv"))?);
    for residual in &result.residuals {
        writer.serialize(residual)?;
    }
    writer.flush()?;

    tracing::info!("Fit results written to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_timecourse_in_display_units() {
        let result = TimecourseResult::new(
            vec!["time".to_string(), "[Cve_edo]".to_string(), "Aurine_edo".to_string()],
            array![[0.0, 0.0, 0.0], [120.0, 1e-4, 2e-3]],
        );
        let mut buffer = Vec::new();
        write_timecourse(&mut buffer, &result).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time [hr]\t[Cve_edo] [nM]\tAurine_edo [µmole]"));
        lines.next();
        let last: Vec<f64> = lines
            .next()
            .unwrap()
            .split('\t')
            .map(|v| v.parse().unwrap())
            .collect();
        assert!((last[0] - 2.0).abs() < 1e-12);
        assert!((last[1] - 100.0).abs() < 1e-9);
        assert!((last[2] - 2.0).abs() < 1e-12);
    }
}
