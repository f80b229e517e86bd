// src/utils/format.rs
//! Human-readable formatting for dashboard values

/// Formats a network difficulty with a T/G/M suffix
///
/// Suffixed values carry two decimals; anything below a million is printed
/// as a whole number.
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else {
        format!("{:.0}", difficulty)
    }
}

/// Formats a hashrate in hashes per second (H/s up to EH/s)
pub fn format_hashrate(hashrate: f64) -> String {
    if hashrate >= 1e18 {
        format!("{:.2} EH/s", hashrate / 1e18)
    } else if hashrate >= 1e15 {
        format!("{:.2} PH/s", hashrate / 1e15)
    } else if hashrate >= 1e12 {
        format!("{:.2} TH/s", hashrate / 1e12)
    } else if hashrate >= 1e9 {
        format!("{:.2} GH/s", hashrate / 1e9)
    } else if hashrate >= 1e6 {
        format!("{:.2} MH/s", hashrate / 1e6)
    } else {
        format!("{:.0} H/s", hashrate)
    }
}

/// Network hashrate implied by a difficulty at one block per 600 seconds
pub fn implied_network_hashrate(difficulty: f64) -> f64 {
    difficulty * 2f64.powi(32) / 600.0
}

/// Renders a duration in seconds as `HH:MM:SS`
///
/// Hours are not wrapped, so long runs print `100:00:00` and beyond.
pub fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Share acceptance percentage with one decimal, `"100%"` before any share
pub fn format_efficiency(accepted: u32, rejected: u32) -> String {
    let total = u64::from(accepted) + u64::from(rejected);
    if total == 0 {
        return "100%".to_string();
    }
    let efficiency = accepted as f64 / total as f64 * 100.0;
    format!("{:.1}%", efficiency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_picks_largest_suffix() {
        assert_eq!(format_difficulty(83_148_355_189_239.77), "83.15T");
        assert_eq!(format_difficulty(2.5e9), "2.50G");
        assert_eq!(format_difficulty(1_000_000.0), "1.00M");
        assert_eq!(format_difficulty(999_999.4), "999999");
    }

    #[test]
    fn hashrate_covers_every_unit() {
        assert_eq!(format_hashrate(5.95e20), "595.00 EH/s");
        assert_eq!(format_hashrate(1.5e15), "1.50 PH/s");
        assert_eq!(format_hashrate(2e12), "2.00 TH/s");
        assert_eq!(format_hashrate(3.25e9), "3.25 GH/s");
        assert_eq!(format_hashrate(4e6), "4.00 MH/s");
        assert_eq!(format_hashrate(1999.0), "1999 H/s");
    }

    #[test]
    fn implied_hashrate_matches_block_interval() {
        let hashrate = implied_network_hashrate(600.0);
        assert_eq!(hashrate, 4_294_967_296.0);
        assert_eq!(format_hashrate(hashrate), "4.29 GH/s");
    }

    #[test]
    fn uptime_is_zero_padded_and_unbounded() {
        assert_eq!(format_uptime(0), "00:00:00");
        assert_eq!(format_uptime(3_725), "01:02:05");
        assert_eq!(format_uptime(360_000), "100:00:00");
    }

    #[test]
    fn efficiency_handles_empty_and_mixed_counts() {
        assert_eq!(format_efficiency(0, 0), "100%");
        assert_eq!(format_efficiency(10, 0), "100.0%");
        assert_eq!(format_efficiency(2, 1), "66.7%");
        assert_eq!(format_efficiency(0, 4), "0.0%");
    }
}
