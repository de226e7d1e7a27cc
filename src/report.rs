use std::fmt;
use std::str::FromStr;

use crate::error::MatmulError;

const EXECUTION_PREFIX: &str = "Execution time: ";
const COMMUNICATION_PREFIX: &str = "Communication time: ";
const OVERHEAD_PREFIX: &str = "Communication overhead: ";

/// Coordinator-side summary of one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingReport {
    /// Coordinator wall clock from the first scatter to the end of the gather, in seconds
    pub execution: f64,
    /// Largest per-rank communication time, in seconds
    pub communication: f64,
}

impl TimingReport {
    pub fn new(execution: f64, communication: f64) -> Self {
        Self {
            execution,
            communication,
        }
    }

    /// Communication time as a percentage of the coordinator's total.
    ///
    /// Not guarded against a zero total; the result is then `inf` or `NaN`.
    pub fn overhead_percent(&self) -> f64 {
        (self.communication / self.execution) * 100.0
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}{:.6} seconds", EXECUTION_PREFIX, self.execution)?;
        writeln!(f, "{}{:.6} seconds", COMMUNICATION_PREFIX, self.communication)?;
        writeln!(f, "{}{}%", OVERHEAD_PREFIX, Percent(self.overhead_percent()))
    }
}

/// Two-decimal percentage spelled the way C's `%.2f` spells non-finite values
struct Percent(f64);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            v if v.is_nan() && v.is_sign_negative() => f.write_str("-nan"),
            v if v.is_nan() => f.write_str("nan"),
            v => write!(f, "{:.2}", v),
        }
    }
}

fn parse_field(line: Option<&str>, prefix: &str, suffix: &str) -> Result<f64, MatmulError> {
    let line = line.ok_or_else(|| MatmulError::Parse(format!("missing line `{}`", prefix.trim())))?;
    line.trim()
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(suffix))
        .ok_or_else(|| MatmulError::Parse(format!("unexpected line `{}`", line)))?
        .trim()
        .parse::<f64>()
        .map_err(|e| MatmulError::Parse(format!("{}: {}", line, e)))
}

/// Reads back the three report lines; blank lines around them are ignored.
/// The printed overhead is validated for shape only since it is derived.
impl FromStr for TimingReport {
    type Err = MatmulError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().filter(|line| !line.trim().is_empty());

        let execution = parse_field(lines.next(), EXECUTION_PREFIX, " seconds")?;
        let communication = parse_field(lines.next(), COMMUNICATION_PREFIX, " seconds")?;
        parse_field(lines.next(), OVERHEAD_PREFIX, "%")?;

        Ok(Self::new(execution, communication))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format() {
        let report = TimingReport::new(2.0, 0.5);
        assert_eq!(
            report.to_string(),
            "Execution time: 2.000000 seconds\n\
             Communication time: 0.500000 seconds\n\
             Communication overhead: 25.00%\n"
        );
    }

    #[test]
    fn test_overhead_bounds() {
        assert_eq!(TimingReport::new(1.0, 0.0).overhead_percent(), 0.0);
        assert_eq!(TimingReport::new(1.0, 1.0).overhead_percent(), 100.0);

        let overhead = TimingReport::new(0.37, 0.12).overhead_percent();
        assert!((0.0..=100.0).contains(&overhead));
    }

    #[test]
    fn test_zero_total_is_unguarded() {
        assert!(TimingReport::new(0.0, 0.0).overhead_percent().is_nan());
        assert!(TimingReport::new(0.0, 1.0).overhead_percent().is_infinite());
    }

    #[test]
    fn test_parse_printed_report() {
        let text = "\nExecution time: 1.234567 seconds\n\
                    Communication time: 0.123456 seconds\n\
                    Communication overhead: 10.00%\n";
        let report: TimingReport = text.parse().unwrap();
        assert_eq!(report.execution, 1.234567);
        assert_eq!(report.communication, 0.123456);
    }

    #[test]
    fn test_zero_total_prints_like_printf() {
        let text = TimingReport::new(0.0, 0.0).to_string();
        assert!(text.ends_with("Communication overhead: nan%\n"), "{}", text);

        let text = TimingReport::new(0.0, 1.0).to_string();
        assert!(text.ends_with("Communication overhead: inf%\n"), "{}", text);
    }

    #[test]
    fn test_parse_non_finite_overhead() {
        for overhead in ["nan", "-nan", "inf", "NaN"] {
            let text = format!(
                "Execution time: 0.000000 seconds\n\
                 Communication time: 0.000000 seconds\n\
                 Communication overhead: {}%\n",
                overhead
            );
            let report: TimingReport = text.parse().unwrap();
            assert_eq!(report.execution, 0.0);
            assert!(report.overhead_percent().is_nan());
        }
    }

    #[test]
    fn test_parse_rejects_truncated_report() {
        let text = "Execution time: 1.000000 seconds\n";
        assert!(matches!(
            text.parse::<TimingReport>(),
            Err(MatmulError::Parse(_))
        ));

        let text = "Execution time: fast seconds\n\
                    Communication time: 0.1 seconds\n\
                    Communication overhead: 10.00%\n";
        assert!(text.parse::<TimingReport>().is_err());
    }
}
