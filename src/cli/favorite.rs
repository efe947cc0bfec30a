use super::ui;
use crate::App;
use anyhow::{Context, Result};

pub fn run(app: &App, code: &str) -> Result<()> {
    let code = code.to_uppercase();
    let now_favorite = app
        .favorites
        .toggle(&code)
        .with_context(|| format!("Failed to update favorites for {code}"))?;

    if now_favorite {
        println!("★ {code} added to favorites");
    } else {
        println!("{code} removed from favorites");
    }

    let favorites = app.favorites.ordered_list();
    let summary = if favorites.is_empty() {
        "No favorites".to_string()
    } else {
        format!("Favorites: {}", favorites.join(", "))
    };
    println!("{}", ui::style_text(&summary, ui::StyleType::Subtle));
    Ok(())
}
