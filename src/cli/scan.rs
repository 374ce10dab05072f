use std::path::Path;

use crate::config::ShieldConfig;
use crate::error::Result;
use crate::shield::InputShield;

/// Scan a file or directory for lines carrying XSS or SQL-injection payloads.
pub fn run(config: &ShieldConfig, path: &Path) -> Result<()> {
    let shield = InputShield::new(config.shield_decoder());

    let total_findings = if path.is_dir() {
        eprintln!("inputshield: scanning directory {}...", path.display());
        scan_dir(&shield, path)?
    } else if path.is_file() {
        eprintln!("inputshield: scanning file {}...", path.display());
        scan_file(&shield, path)?
    } else {
        eprintln!("inputshield: path not found: {}", path.display());
        std::process::exit(1);
    };

    if total_findings > 0 {
        eprintln!(
            "\ninputshield: {} suspicious line(s) found.",
            total_findings
        );
        std::process::exit(1);
    } else {
        eprintln!("inputshield: scan clean -- no injection payloads detected.");
    }

    Ok(())
}

/// Scan a single file. Returns the number of findings.
fn scan_file(shield: &InputShield, path: &Path) -> Result<usize> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Ok(0), // Skip binary/unreadable files
    };

    let mut findings = 0;

    for (line_num, line) in contents.lines().enumerate() {
        let outcome = shield.analyze_and_sanitize(line);
        if outcome.acted {
            findings += 1;
            let rules: Vec<String> = outcome
                .hits
                .iter()
                .map(|h| format!("{}/{}", h.category, h.rule))
                .collect();
            eprintln!(
                "  {}:{}: {}",
                path.display(),
                line_num + 1,
                rules.join(", ")
            );
        }
    }

    Ok(findings)
}

/// Scan a directory recursively. Returns the number of findings.
fn scan_dir(shield: &InputShield, dir: &Path) -> Result<usize> {
    let mut total = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            // Skip hidden directories
            if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'))
            {
                continue;
            }
            total += scan_dir(shield, &path)?;
        } else if path.is_file() {
            total += scan_file(shield, &path)?;
        }
    }

    Ok(total)
}
