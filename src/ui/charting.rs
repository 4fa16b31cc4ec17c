use crate::history::SessionRecord;

/// Chart points for stored sessions: x is the session number (oldest = 1),
/// y is its WPM.
pub fn history_points(records: &[SessionRecord]) -> Vec<(f64, f64)> {
    records
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, record)| ((idx + 1) as f64, f64::from(record.summary.wpm)))
        .collect()
}

/// X (session count) and Y (WPM) bounds for the history chart
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let highest_wpm = points.iter().map(|&(_, wpm)| wpm).fold(0.0, f64::max);
    let sessions = points.last().map_or(1.0, |&(x, _)| x).max(1.0);

    (sessions, highest_wpm.round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
