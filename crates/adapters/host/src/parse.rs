//! Parsers for the raw text exposed by the firmware and the kernel.

/// `vcgencmd measure_temp` output, e.g. `temp=49.4'C`.
pub(crate) fn vcgencmd_temperature(raw: &str) -> Option<f64> {
    raw.trim()
        .strip_prefix("temp=")?
        .trim_end_matches("'C")
        .parse()
        .ok()
}

/// Thermal-zone content, in millidegrees Celsius.
pub(crate) fn millidegrees(raw: &str) -> Option<f64> {
    raw.trim().parse::<i64>().ok().map(|m| m as f64 / 1000.0)
}

/// cpufreq content, in kHz, converted to MHz.
pub(crate) fn khz_to_mhz(raw: &str) -> Option<f64> {
    raw.trim().parse::<u64>().ok().map(|khz| khz as f64 / 1000.0)
}

/// Cumulative jiffies of one core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CoreTimes {
    idle: u64,
    total: u64,
}

/// Per-core lines (`cpu0`, `cpu1`, …) of `/proc/stat`. The aggregate `cpu`
/// line is skipped.
pub(crate) fn per_core_times(raw: &str) -> Option<Vec<CoreTimes>> {
    let cores: Vec<CoreTimes> = raw
        .lines()
        .filter(|line| {
            line.strip_prefix("cpu")
                .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        })
        .map(core_times)
        .collect::<Option<_>>()?;
    (!cores.is_empty()).then_some(cores)
}

fn core_times(line: &str) -> Option<CoreTimes> {
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    // user nice system idle iowait irq softirq steal [guest guest_nice]
    if fields.len() < 4 {
        return None;
    }
    // guest time is already counted in user and nice
    let total = fields.iter().take(8).sum();
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(CoreTimes { idle, total })
}

/// Busy percentage of each core between two samples.
pub(crate) fn usage_between(before: &[CoreTimes], after: &[CoreTimes]) -> Vec<f32> {
    before
        .iter()
        .zip(after)
        .map(|(b, a)| {
            let total = a.total.saturating_sub(b.total);
            let idle = a.idle.saturating_sub(b.idle);
            if total == 0 {
                return 0.0;
            }
            let busy = total.saturating_sub(idle) as f64 / total as f64;
            ((busy * 1000.0).round() / 10.0) as f32
        })
        .collect()
}
