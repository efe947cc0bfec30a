use super::{settle, ui};
use crate::App;
use crate::core::ConversionError;
use crate::repository::RepositoryEvent;
use anyhow::Result;

/// Presentation rounds to two decimals; the converted value itself is exact.
pub fn format_conversion(amount: f64, from: &str, converted: f64, to: &str) -> String {
    format!(
        "{amount:.2} {from} = {} {to}",
        ui::style_text(&format!("{converted:.2}"), ui::StyleType::Highlight)
    )
}

pub async fn run(app: &mut App, amount: f64, from: &str, to: &str) -> Result<()> {
    let from = from.to_uppercase();
    let to = to.to_uppercase();

    let read = app.repository.fetch_rates();
    let events = settle(read.refresh, &mut app.events, "Fetching rates...").await?;

    match app.repository.convert(amount, &from, &to) {
        Ok(converted) => {
            println!("{}", format_conversion(amount, &from, converted, &to));
            Ok(())
        }
        Err(ConversionError::RatesNotLoaded) => {
            let error = anyhow::Error::new(ConversionError::RatesNotLoaded);
            let fetch_error = events.into_iter().find_map(|event| match event {
                RepositoryEvent::Rates(Err(e)) => Some(e),
                _ => None,
            });
            Err(match fetch_error {
                Some(e) => error.context(e),
                None => error,
            })
        }
        Err(e) => Err(e.into()),
    }
}
