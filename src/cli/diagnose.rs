//! Diagnose command implementation

use crate::aggregator::Aggregator;
use crate::api::DiagnosisResponse;
use crate::cli::{load_config, output, DiagnoseArgs};
use crate::fleet::Fleet;
use crate::probe::Prober;
use std::sync::Arc;

/// Handle `fleetwatch diagnose <machine>`.
pub async fn handle_diagnose(args: &DiagnoseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let fleet = Arc::new(Fleet::from_config(&config.machines));
    let aggregator = Aggregator::new(
        fleet,
        Prober::new(config.probe.clone()),
        config.aggregator.clone(),
    );

    let summary = aggregator
        .check_machine(&args.machine)
        .await
        .map_err(|e| format!("{}: {}", e, args.machine))?;
    let report = DiagnosisResponse::from(summary);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::format_diagnosis(&report));
    }

    Ok(())
}
