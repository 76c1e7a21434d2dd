use eyre::Result;
use edoxaban::prelude::*;

fn single_dose(route: &str, dose: f64, hours: f64) -> TimecourseSim {
    TimecourseSim::new(vec![Timecourse::new(
        0.0,
        hours * 60.0,
        (hours * 20.0) as usize,
        Changes::new().with(route, Quantity::new(dose, "mg")),
    )])
}

/// Dose in mmole
fn amount(dose_mg: f64) -> f64 {
    dose_mg / 548.058
}

#[test]
fn test_iv_dose_reaches_plasma_immediately() -> Result<()> {
    let result = Simulator::default().run_timecourse(&single_dose("IVDOSE_edo", 60.0, 24.0))?;
    let c = result.column("[Cve_edo]")?;
    let dose = result.column("IVDOSE_edo")?;

    assert_eq!(result.len(), 481);
    assert_eq!(c[0], 0.0);
    assert!((dose[0] - 60.0).abs() < 1e-12);
    assert!(dose[dose.len() - 1] < 1e-6);
    // maximum within the first two sampling intervals
    let imax = (0..c.len()).max_by(|a, b| c[*a].total_cmp(&c[*b])).unwrap();
    assert!(imax <= 2, "tmax at index {}", imax);
    Ok(())
}

#[test]
fn test_oral_absorption_is_delayed() -> Result<()> {
    let simulator = Simulator::default();
    let iv = simulator.run_timecourse(&single_dose("IVDOSE_edo", 60.0, 24.0))?;
    let po = simulator.run_timecourse(&single_dose("PODOSE_edo", 60.0, 24.0))?;

    let pk_iv = pharmacokinetics(&iv, Substance::Edo)?;
    let pk_po = pharmacokinetics(&po, Substance::Edo)?;
    assert!(pk_po.tmax > pk_iv.tmax);
    assert!(pk_po.cmax < pk_iv.cmax);
    assert!(pk_po.auc < pk_iv.auc);
    Ok(())
}

#[test]
fn test_excretion_is_bounded_by_dose() -> Result<()> {
    let result = Simulator::default().run_timecourse(&single_dose("PODOSE_edo", 60.0, 72.0))?;
    let urine = result.column("Aurine_edo_total")?;
    let feces = result.column("Afeces_edo_total")?;

    let mut previous = 0.0;
    for (u, f) in urine.iter().zip(feces.iter()) {
        let excreted = u + f;
        assert!(excreted >= previous - 1e-12);
        assert!(excreted <= amount(60.0) * (1.0 + 1e-6));
        previous = excreted;
    }
    assert!(previous > 0.2 * amount(60.0));
    Ok(())
}

#[test]
fn test_phases_continue_state() -> Result<()> {
    let day = |changes: Changes| Timecourse::new(0.0, 24.0 * 60.0, 240, changes);
    let sim = TimecourseSim::new(vec![
        day(Changes::new().with("PODOSE_edo", Quantity::new(30.0, "mg"))),
        day(Changes::new().with("PODOSE_edo", Quantity::new(30.0, "mg"))),
    ]);
    let result = Simulator::default().run_timecourse(&sim)?;
    let time = result.time();

    assert_eq!(result.len(), 2 * 241);
    // the boundary time point shows up in both phases
    assert_eq!(time[240], time[241]);
    assert!((time[time.len() - 1] - 48.0 * 60.0).abs() < 1e-9);

    let urine = result.column("Aurine_edo")?;
    assert!((urine[240] - urine[241]).abs() < 1e-15);
    assert!(urine[urine.len() - 1] > urine[240]);
    Ok(())
}

#[test]
fn test_renal_function_reduces_urinary_excretion() -> Result<()> {
    let simulator = Simulator::default();
    let healthy = simulator.run_timecourse(&single_dose("PODOSE_edo", 60.0, 48.0))?;
    let impaired = single_dose("PODOSE_edo", 60.0, 48.0).with_overrides(
        &Changes::new().with("KI__f_renal_function", Quantity::new(0.3, "dimensionless")),
    );
    let impaired = simulator.run_timecourse(&impaired)?;

    assert!(impaired.final_value("Aurine_edo")? < healthy.final_value("Aurine_edo")?);
    let pk_healthy = pharmacokinetics(&healthy, Substance::Edo)?;
    let pk_impaired = pharmacokinetics(&impaired, Substance::Edo)?;
    assert!(pk_impaired.auc > pk_healthy.auc);
    Ok(())
}

#[test]
fn test_month_long_profile_has_terminal_phase() -> Result<()> {
    let sim = TimecourseSim::new(vec![Timecourse::new(
        0.0,
        30.0 * 24.0 * 60.0,
        3000,
        Changes::new().with("PODOSE_edo", Quantity::new(60.0, "mg")),
    )])
    .with_base_changes(&edoxaban::experiments::default_changes());
    let result = Simulator::default().run_timecourse(&sim)?;
    let pk = pharmacokinetics(&result, Substance::Edo)?;

    for value in [pk.kel, pk.aucinf, pk.thalf, pk.vd, pk.cl] {
        assert!(value.is_finite() && value > 0.0, "{:?}", pk);
    }
    assert!(pk.aucinf >= pk.auc * (1.0 - 1e-6));
    assert!(pk.thalf > 1.0 && pk.thalf < 200.0, "thalf {}", pk.thalf);
    Ok(())
}

#[test]
fn test_scan_runs_every_point() -> Result<()> {
    let sim = single_dose("PODOSE_edo", 60.0, 12.0);
    let doses = [15.0, 30.0, 60.0].map(|d| Quantity::new(d, "mg")).to_vec();
    let scan = ScanSim::new(sim, vec![ScanDimension::new("dim_dose", "PODOSE_edo", doses)]);
    let result = Simulator::default().run_scan(&scan)?;

    assert_eq!(result.points.len(), 3);
    let cmax: Vec<f64> = result
        .points
        .iter()
        .map(|p| pharmacokinetics(&p.result, Substance::Edo).map(|pk| pk.cmax))
        .collect::<edoxaban::error::Result<_>>()?;
    assert!(cmax[0] < cmax[1] && cmax[1] < cmax[2]);
    Ok(())
}

#[test]
fn test_unknown_symbol_is_rejected() {
    let sim = TimecourseSim::new(vec![Timecourse::new(
        0.0,
        60.0,
        10,
        Changes::new().with("Vmax_unknown", Quantity::new(1.0, "mg")),
    )]);
    assert!(matches!(
        Simulator::default().run_timecourse(&sim),
        Err(EdoxabanError::UnknownSymbol(_))
    ));
}
