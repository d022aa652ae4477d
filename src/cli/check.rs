//! Check command implementation

use crate::aggregator::Aggregator;
use crate::cli::{load_config, output, CheckArgs};
use crate::fleet::Fleet;
use crate::probe::Prober;
use std::sync::Arc;

/// Handle `fleetwatch check`: one local probe round over every service.
pub async fn handle_check(args: &CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let fleet = Arc::new(Fleet::from_config(&config.machines));
    let aggregator = Aggregator::new(
        Arc::clone(&fleet),
        Prober::new(config.probe.clone()),
        config.aggregator.clone(),
    );

    let summary = aggregator.check_fleet(&fleet.all_services()).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", output::format_fleet_table(&summary));
    }

    Ok(())
}
