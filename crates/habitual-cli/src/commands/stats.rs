use habitual_core::Config;

use crate::common::{date_or_today, open_tracker, CliResult};

pub fn run(date: Option<&str>) -> CliResult {
    let config = Config::load()?;
    let tracker = open_tracker(&config)?;
    let today = date_or_today(date)?;

    let summary = tracker.summary(today)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
