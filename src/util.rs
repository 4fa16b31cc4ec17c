use crate::history::SessionRecord;

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

/// Average WPM over stored sessions and its spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WpmTrend {
    pub average: f64,
    pub std_dev: f64,
}

pub fn wpm_trend(records: &[SessionRecord]) -> Option<WpmTrend> {
    let wpms: Vec<f64> = records.iter().map(|r| f64::from(r.summary.wpm)).collect();

    Some(WpmTrend {
        average: mean(&wpms)?,
        std_dev: std_dev(&wpms)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SessionSummary;
    use chrono::Local;

    fn record(id: i64, wpm: u32) -> SessionRecord {
        SessionRecord {
            id,
            summary: SessionSummary {
                date: Local::now(),
                wpm,
                accuracy: 100,
                length: 10,
            },
        }
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[42.0]), Some(42.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[2., 4., 4., 4., 5., 5., 7., 9.]), Some(2.0));
        assert_eq!(std_dev(&[5.0, 5.0, 5.0]), Some(0.0));
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_wpm_trend() {
        let records = vec![record(3, 60), record(2, 40), record(1, 50)];
        let trend = wpm_trend(&records).unwrap();
        assert_eq!(trend.average, 50.0);
        assert!((trend.std_dev - 8.16496580927726).abs() < 1e-10);
    }

    #[test]
    fn test_wpm_trend_empty() {
        assert_eq!(wpm_trend(&[]), None);
    }
}
