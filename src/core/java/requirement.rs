// ─── Runtime Requirement ───
// Maps a declared Minecraft version to the Java major it needs.

use std::cmp::Ordering;

/// Threshold table, highest threshold first. The first threshold the game
/// version reaches decides the requirement; order is load-bearing.
const REQUIREMENTS: &[(&str, u32)] = &[("1.20.5", 21), ("1.17", 17)];

/// Versions below every threshold (and unparsable ones) land here.
const FALLBACK_MAJOR: u32 = 8;

/// Required Java major for a Minecraft version string. Total: never fails.
pub fn required_runtime_major(game_version: &str) -> u32 {
    let key = version_key(game_version);
    for (threshold, major) in REQUIREMENTS {
        if compare_keys(&key, &version_key(threshold)) != Ordering::Less {
            return *major;
        }
    }
    FALLBACK_MAJOR
}

/// Dotted-numeric version key: `"1.20.5"` → `[1, 20, 5]`. Trailing
/// non-numeric junk ends the key early, so `"1.20.1-rc1"` → `[1, 20, 1]`.
fn version_key(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u64>()
        })
        .take_while(|parsed| parsed.is_ok())
        .map(|parsed| parsed.unwrap_or(0))
        .collect()
}

/// Numeric comparison with missing components treated as zero,
/// so `1.17` == `1.17.0` and `1.20.5` > `1.20.4` > `1.17`.
fn compare_keys(left: &[u64], right: &[u64]) -> Ordering {
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_version_requirements() {
        assert_eq!(required_runtime_major("1.16.5"), 8);
        assert_eq!(required_runtime_major("1.18.2"), 17);
        assert_eq!(required_runtime_major("1.20.6"), 21);
        assert_eq!(required_runtime_major("1.21.0"), 21);
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(required_runtime_major("1.20.4"), 17);
        assert_eq!(required_runtime_major("1.20.5"), 21);
        assert_eq!(required_runtime_major("1.17"), 17);
        assert_eq!(required_runtime_major("1.16.5"), 8);
    }

    #[test]
    fn resolver_is_monotonic() {
        let ordered = [
            "1.7.10", "1.12.2", "1.16.5", "1.17", "1.18.2", "1.19.4", "1.20.1", "1.20.4",
            "1.20.5", "1.20.6", "1.21", "1.21.1",
        ];
        let majors: Vec<u32> = ordered.iter().map(|v| required_runtime_major(v)).collect();
        assert!(majors.windows(2).all(|w| w[0] <= w[1]), "{majors:?}");
    }

    #[test]
    fn unparsable_versions_fall_through_to_lowest_tier() {
        assert_eq!(required_runtime_major(""), 8);
        assert_eq!(required_runtime_major("latest"), 8);
    }

    #[test]
    fn comparison_is_numeric_not_lexical() {
        // Lexically "1.9" > "1.17"; numerically it is not.
        assert_eq!(required_runtime_major("1.9.4"), 8);
    }
}
