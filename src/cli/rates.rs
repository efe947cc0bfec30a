use super::{settle, ui};
use crate::App;
use crate::core::ExchangeRateSet;
use crate::repository::RepositoryEvent;
use anyhow::{Result, anyhow};
use chrono::DateTime;
use comfy_table::Cell;

pub fn display_rates(rates: &ExchangeRateSet) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {}", rates.source)),
    ]);
    for (code, rate) in rates.quoted_codes() {
        table.add_row(vec![Cell::new(code), ui::number_cell(rate, 4)]);
    }

    let as_of = DateTime::from_timestamp(rates.timestamp, 0)
        .map_or_else(|| rates.timestamp.to_string(), |dt| dt.to_rfc3339());
    format!(
        "{}\n{}\n\n{}",
        ui::style_text("Exchange rates", ui::StyleType::Title),
        ui::style_text(&format!("As of {as_of}"), ui::StyleType::Subtle),
        table
    )
}

pub async fn run(app: &mut App) -> Result<()> {
    let read = app.repository.fetch_rates();
    let events = settle(read.refresh, &mut app.events, "Fetching rates...").await?;

    let Some(rates) = app.repository.current_rates() else {
        let error = events.into_iter().find_map(|event| match event {
            RepositoryEvent::Rates(Err(e)) => Some(e),
            _ => None,
        });
        return Err(match error {
            Some(e) => anyhow::Error::new(e).context("Could not load exchange rates"),
            None => anyhow!("Could not load exchange rates"),
        });
    };

    println!("{}", display_rates(&rates));
    Ok(())
}
