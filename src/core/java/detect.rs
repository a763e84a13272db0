// ─── Installed Runtime Detection ───

use tracing::debug;

/// Ask the `java` on PATH for its version and extract the major.
/// `None` means no usable runtime was found.
pub async fn detect_installed_runtime_major() -> Option<u32> {
    let output = tokio::process::Command::new("java")
        .arg("-version")
        .output()
        .await
        .ok()?;

    // `java -version` historically prints to stderr.
    let text = if output.stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).to_string()
    } else {
        String::from_utf8_lossy(&output.stderr).to_string()
    };

    let version = extract_quoted_version(&text)?;
    let major = parse_runtime_major(&version);
    debug!("Detected Java {} (major {})", version, major);
    if major == 0 {
        None
    } else {
        Some(major)
    }
}

/// Policy: a newer runtime satisfies an older requirement.
pub fn satisfies_requirement(installed_major: u32, required_major: u32) -> bool {
    installed_major >= required_major
}

/// Major version out of a runtime version string, handling the legacy
/// `1.8.0_392` naming (major is the second component) versus the modern
/// `17.0.9` naming (major is the first).
pub fn parse_runtime_major(version: &str) -> u32 {
    let first_part = version.split('.').next().unwrap_or("0");
    let major: u32 = first_part.parse().unwrap_or(0);

    if major == 1 {
        version
            .split(['.', '_'])
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(major)
    } else {
        major
    }
}

/// Install command for the required major, shown as remediation.
pub fn remediation_for(required_major: u32) -> String {
    format!("apt install openjdk-{required_major}-jre-headless")
}

fn extract_quoted_version(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.contains("version"))?;
    let start = line.find('"')? + 1;
    let end = line[start..].find('"')? + start;
    Some(line[start..end].to_string())
}
