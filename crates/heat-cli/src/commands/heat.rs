use std::sync::Arc;

use heat_core::{HeatConfig, HeatCounter, HeatState, KeyValueStore};
use serde::Serialize;

use super::OutputFormat;

/// What to do to a counter before reporting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Show,
    Increase(i64),
    Decrease(i64),
    ToMaximum,
    ToMinimum,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HeatReport {
    pub identifier: String,
    pub key: String,
    pub temperature: i64,
    pub state: HeatState,
}

impl HeatReport {
    pub fn from_counter(counter: &HeatCounter) -> Self {
        Self {
            identifier: counter.identifier().to_string(),
            key: counter.storage_key(),
            temperature: counter.temperature(),
            state: counter.state(),
        }
    }
}

/// Load the counter for `identifier`, apply `adjustment`, and write it back
/// unless the adjustment is `Show`.
pub fn adjust(
    store: Arc<dyn KeyValueStore>,
    config: &HeatConfig,
    identifier: &str,
    adjustment: Adjustment,
) -> anyhow::Result<HeatReport> {
    let mut counter = HeatCounter::with_config(identifier, store, config)?;

    match adjustment {
        Adjustment::Show => return Ok(HeatReport::from_counter(&counter)),
        Adjustment::Increase(amount) => counter.increase(amount),
        Adjustment::Decrease(amount) => counter.decrease(amount),
        Adjustment::ToMaximum => counter.increase_to_maximum(),
        Adjustment::ToMinimum => counter.decrease_to_minimum(),
    };
    counter.write()?;
    tracing::info!(
        identifier,
        temperature = counter.temperature(),
        state = %counter.state(),
        "heat updated"
    );

    Ok(HeatReport::from_counter(&counter))
}

pub fn render(reports: &[HeatReport], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
        OutputFormat::Text => {
            let lines: Vec<String> = reports
                .iter()
                .map(|r| format!("{:<40} {:>6}  {}", r.identifier, r.temperature, r.state))
                .collect();
            Ok(lines.join("\n"))
        }
    }
}
