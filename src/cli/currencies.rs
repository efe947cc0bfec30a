use super::{settle, ui};
use crate::App;
use crate::core::{Currency, FavoritesStore, FetchError};
use crate::repository::RepositoryEvent;
use anyhow::{Result, anyhow};
use comfy_table::{Cell, Color};

pub fn display_currencies(currencies: &[Currency], favorites: &FavoritesStore) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Code"),
        ui::header_cell("Name"),
    ]);

    for currency in favorites.sorted_currencies(currencies) {
        let marker = if favorites.is_favorite(&currency.code) {
            Cell::new("★").fg(Color::Yellow)
        } else {
            Cell::new("")
        };
        table.add_row(vec![marker, Cell::new(&currency.code), Cell::new(&currency.name)]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Currencies", ui::StyleType::Title),
        table
    )
}

pub async fn run(app: &mut App) -> Result<()> {
    let read = app.repository.fetch_currencies();
    let events = settle(read.refresh, &mut app.events, "Fetching currencies...").await?;

    let Some(currencies) = app.repository.current_currencies() else {
        return Err(no_data_error(events));
    };

    println!("{}", display_currencies(&currencies, &app.favorites));
    Ok(())
}

fn no_data_error(events: Vec<RepositoryEvent>) -> anyhow::Error {
    let error: Option<FetchError> = events.into_iter().find_map(|event| match event {
        RepositoryEvent::Currencies(Err(e)) => Some(e),
        _ => None,
    });
    match error {
        Some(e) => anyhow::Error::new(e).context("Could not load currencies"),
        None => anyhow!("Could not load currencies"),
    }
}
