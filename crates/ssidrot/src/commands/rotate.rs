//! `ssidrot rotate`: one rotation step against the controller.

use serde::Serialize;

use ssidrot_core::{RotationEngine, RotationReport, UnifiController};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let settings = config::rotation_settings(global, &cfg);
    let controller = UnifiController::new(config::controller_config(global, &cfg)?);

    let engine = RotationEngine::new(controller, settings);
    let report = engine.rotate().await?;

    let painter = Painter::new(global.color);
    let out = output::render_single(
        global.output,
        &ReportView::from(&report),
        |r| detail(r, painter),
        |r| r.new_name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ReportView<'a> {
    #[serde(flatten)]
    report: &'a RotationReport,
    position: String,
}

impl<'a> From<&'a RotationReport> for ReportView<'a> {
    fn from(report: &'a RotationReport) -> Self {
        Self {
            report,
            position: format!("{}/{}", report.index + 1, report.total),
        }
    }
}

impl std::ops::Deref for ReportView<'_> {
    type Target = RotationReport;

    fn deref(&self) -> &RotationReport {
        self.report
    }
}

fn detail(r: &ReportView<'_>, p: Painter) -> String {
    let mut lines = vec![format!(
        "{} '{}' -> '{}'",
        p.ok("Rotated"),
        r.previous_name,
        p.bold(&r.new_name)
    )];
    lines.push(format!("  WLAN:      {}", r.wlan_id));
    lines.push(format!("  Position:  {}", r.position));
    lines.push(format!("  Next:      '{}'", r.next_preview));
    lines.push(format!(
        "  At:        {}",
        r.rotated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if r.discovered {
        lines.push(p.dim("  (target WLAN discovered and cached)"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::cli::ColorMode;

    fn report() -> RotationReport {
        RotationReport {
            wlan_id: "w1".into(),
            previous_name: "A".into(),
            new_name: "B".into(),
            index: 1,
            total: 3,
            next_preview: "C".into(),
            rotated_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap_or_default(),
            discovered: true,
        }
    }

    #[test]
    fn detail_shows_transition_and_position() {
        let report = report();
        let text = detail(&ReportView::from(&report), Painter::new(ColorMode::Never));
        assert!(text.starts_with("Rotated 'A' -> 'B'"));
        assert!(text.contains("Position:  2/3"));
        assert!(text.contains("Next:      'C'"));
        assert!(text.contains("2026-03-01 12:00:00 UTC"));
        assert!(text.contains("discovered"));
    }

    #[test]
    fn json_view_flattens_report() {
        let report = report();
        let value = serde_json::to_value(ReportView::from(&report)).unwrap_or_default();
        assert_eq!(value["new_name"], "B");
        assert_eq!(value["position"], "2/3");
    }
}
