use std::fmt::Write;
use urweather_core::QueryState;

/// Text card for the current state, plus the banner while it is up.
pub fn render(state: &QueryState) -> String {
    let mut out = String::new();
    let visual = state.visual();

    match &state.current_snapshot {
        Some(snapshot) => {
            let _ = writeln!(
                out,
                "{}  {}°C  {}",
                visual.icon.glyph(),
                snapshot.temperature_c,
                snapshot.condition_text
            );
            let _ = writeln!(out, "   {}", snapshot.resolved_location_label);
            let _ = writeln!(
                out,
                "   Humidity {}%   Wind Speed {} km/h",
                snapshot.humidity_pct, snapshot.wind_kph
            );
            let _ = writeln!(
                out,
                "   icon: {} ({})   background: {} ({})",
                visual.icon,
                visual.icon.asset_path(),
                visual.background,
                visual.background.asset_path()
            );
            let _ = writeln!(
                out,
                "   observed {}",
                snapshot.observed_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None => {
            let _ = writeln!(out, "No weather loaded yet.");
        }
    }

    if let Some(banner) = state.banner() {
        let _ = writeln!(out, "[!] {banner}");
    }

    out.trim_end().to_string()
}
