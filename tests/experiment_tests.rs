use eyre::Result;
use edoxaban::experiments::registry;
use edoxaban::experiments::studies::{Chen2017b, Mendell2011, Ogata2010};
use edoxaban::experiments::{task_id, validate_mappings};
use edoxaban::prelude::*;

#[test]
fn test_dose_dependency_of_chen2017b() -> Result<()> {
    let result = run_experiment(&Chen2017b, None, &Simulator::default())?;
    assert_eq!(result.sid, "Chen2017b");

    let cmax = |task: &str| -> Result<f64> {
        let tc = result.results[task].timecourse().unwrap();
        Ok(pharmacokinetics(tc, Substance::Edo)?.cmax)
    };
    let (c30, c60, c90) = (cmax("task_po_ED30")?, cmax("task_po_ED60")?, cmax("task_po_ED90")?);
    assert!(c30 < c60 && c60 < c90);
    Ok(())
}

#[test]
fn test_bodyweight_and_reference_times_are_applied() -> Result<()> {
    for (task, sim) in Mendell2011.tasks() {
        let Simulation::Timecourse(sim) = sim else {
            panic!("{} is not a timecourse", task);
        };
        let first = &sim.timecourses[0].changes;
        assert!(first.get("BW").is_some(), "{} without bodyweight", task);
        assert!(first.get("PT_ref").is_some());
        assert!(first.get("aPTT_ref").is_some());
    }
    Ok(())
}

#[test]
fn test_multiple_dosing_accumulates() -> Result<()> {
    let tasks = Ogata2010.tasks();
    let simulator = Simulator::default();
    let single = simulator.run(&tasks[&task_id("ED60")])?;
    let multiple = simulator.run(&tasks[&task_id("mED60")])?;
    let single = single.timecourse().unwrap();
    let multiple = multiple.timecourse().unwrap();
    assert!(multiple.time()[multiple.len() - 1] > single.time()[single.len() - 1]);
    // same dose, seven more days of urine collection
    assert!(multiple.final_value("Aurine_edo")? > single.final_value("Aurine_edo")?);
    Ok(())
}

#[test]
fn test_experiment_overrides() -> Result<()> {
    let slow = Changes::new().with("KI__EDOEX_k", Quantity::new(0.016, "1/min"));
    let simulator = Simulator::default();
    let base = run_experiment(&Chen2017b, None, &simulator)?;
    let changed = run_experiment(&Chen2017b, Some(&slow), &simulator)?;
    let task = task_id("po_ED60");
    let urine = |r: &ExperimentResult| r.results[&task].timecourse().unwrap().final_value("Aurine_edo");
    assert!(urine(&changed)? < urine(&base)?);
    Ok(())
}

#[test]
fn test_experiment_uses_simulator_tolerances() -> Result<()> {
    let task = task_id("po_ED60");
    let urine = |simulator: &Simulator| -> Result<f64> {
        let result = run_experiment(&Chen2017b, None, simulator)?;
        Ok(result.results[&task].timecourse().unwrap().final_value("Aurine_edo")?)
    };
    let tight = urine(&Simulator::default().with_tolerances(1e-10, 1e-16))?;
    let loose = urine(&Simulator::default().with_tolerances(1e-2, 1e-4))?;
    assert_ne!(tight, loose);
    assert!((tight - loose).abs() / tight < 0.1);
    Ok(())
}

#[test]
fn test_run_group_writes_results() -> Result<()> {
    let dir = std::env::temp_dir().join("edoxaban_food");
    let results = registry::run_simulation_experiments("food", &dir, &Simulator::default())?;
    assert_eq!(results.len(), 2);
    for result in &results {
        for task in result.results.keys() {
            let path = dir.join("food").join(&result.sid).join(format!("{}.tsv", task));
            assert!(path.exists(), "{} missing", path.display());
        }
    }
    Ok(())
}

#[test]
fn test_hepatic_impairment_group_is_empty() -> Result<()> {
    let dir = std::env::temp_dir().join("edoxaban_hepatic");
    assert!(registry::run_simulation_experiments("hepatic_impairment", &dir, &Simulator::default())?.is_empty());
    Ok(())
}

#[test]
fn test_every_study_is_consistent() {
    for experiment in registry::studies() {
        validate_mappings(experiment.as_ref()).unwrap();
        assert!(!experiment.dataset_tables().is_empty(), "{}", experiment.sid());
        assert!(!experiment.fit_mappings().is_empty(), "{}", experiment.sid());
    }
}
