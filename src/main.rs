use std::path::PathBuf;

use anyhow::Result;
use chess_duel::Settings;
use chess_duel::ui::FileAssets;
use gpui::{App, Application};
use tracing_subscriber::EnvFilter;

const SETTINGS_ENV: &str = "CHESS_DUEL_SETTINGS";
const SETTINGS_FILE: &str = "chess-duel.json";

fn settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if std::env::args().any(|arg| arg == "--settings-schema") {
        println!("{}", serde_json::to_string_pretty(&Settings::json_schema())?);
        return Ok(());
    }

    let settings = Settings::load_or_default(settings_path())?;

    Application::new()
        .with_assets(FileAssets::new())
        .run(move |cx: &mut App| chess_duel::app::run(cx, settings));

    Ok(())
}
