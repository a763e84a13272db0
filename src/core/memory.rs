// ─── Heap Sizing ───
// Turns host memory (or an explicit override) into -Xms/-Xmx flags.

use tracing::warn;

/// Used when host memory detection fails or reports something implausible.
const FALLBACK_HEAP_MB: u64 = 4096;

/// Detection results below this are treated as bogus, not clamped.
const PLAUSIBLE_HOST_MB: u64 = 512;

/// Compute the server heap flags.
///
/// An explicit `"<N>G"`/`"<N>M"` override wins; otherwise `percent`% of
/// detected host memory is used. Either path is clamped to
/// `[min_mb, max_mb]`.
pub fn compute_heap_flags(
    explicit: Option<&str>,
    percent: u64,
    min_mb: u64,
    max_mb: u64,
) -> String {
    let heap_mb = match explicit {
        Some(size) => match parse_size_mb(size) {
            Some(mb) => mb.clamp(min_mb, max_mb),
            None => {
                warn!("Cannot parse memory override {:?}, falling back to detection", size);
                detected_heap_mb(percent, min_mb, max_mb)
            }
        },
        None => detected_heap_mb(percent, min_mb, max_mb),
    };

    format!("-Xms{heap_mb}M -Xmx{heap_mb}M")
}

fn detected_heap_mb(percent: u64, min_mb: u64, max_mb: u64) -> u64 {
    match detect_host_memory_mb() {
        Some(total_mb) if total_mb >= PLAUSIBLE_HOST_MB => {
            (total_mb * percent / 100).clamp(min_mb, max_mb)
        }
        _ => {
            warn!(
                "Host memory detection failed, using {} MB default",
                FALLBACK_HEAP_MB
            );
            FALLBACK_HEAP_MB
        }
    }
}

/// Total host memory in MB, `None` when sysinfo reports nothing.
fn detect_host_memory_mb() -> Option<u64> {
    let mut system = sysinfo::System::new_all();
    system.refresh_memory();
    let bytes = system.total_memory();
    if bytes == 0 {
        None
    } else {
        Some(bytes / (1024 * 1024))
    }
}

/// Parse `"<N>G"` or `"<N>M"` (case-insensitive) into MB.
fn parse_size_mb(size: &str) -> Option<u64> {
    let trimmed = size.trim();
    let (digits, unit) = trimmed.split_at(trimmed.len().checked_sub(1)?);
    let n: u64 = digits.parse().ok()?;
    match unit {
        "G" | "g" => Some(n * 1024),
        "M" | "m" => Some(n),
        _ => None,
    }
}
