/// Informational phrases git prints on its diagnostic channel that never
/// describe an actionable problem. Matched case-insensitively, anywhere in a line.
const BOILERPLATE: &[&str] = &[
    "already on '",
    "switched to branch",
    "switched to a new branch",
    "your branch is up to date",
    "your branch is up-to-date",
    "previous head position was",
    "head is now at",
    "set up to track",
    "your branch is behind",
    "your branch is ahead",
    "(use \"git pull\"",
    "(use \"git push\"",
];

/// Strips git boilerplate from diagnostic text.
#[derive(Debug, Clone)]
pub struct DiagnosticFilter {
    patterns: Vec<String>,
}

impl Default for DiagnosticFilter {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl DiagnosticFilter {
    /// Built-in phrases plus `extra`.
    pub fn new(extra: &[String]) -> Self {
        let patterns = BOILERPLATE
            .iter()
            .map(|p| p.to_string())
            .chain(extra.iter().map(|p| p.trim().to_lowercase()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    fn is_boilerplate(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.patterns.iter().any(|p| lower.contains(p.as_str()))
    }

    /// Drop boilerplate and blank lines, trim what remains.
    pub fn normalize(&self, text: &str) -> String {
        text.lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty() && !self.is_boilerplate(line))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// Message for a failed command: normalized stderr, else normalized
    /// stdout, else the raw text. Never empty when git said anything.
    pub fn failure_message(&self, stderr: &str, stdout: &str) -> String {
        let cleaned = self.normalize(stderr);
        if !cleaned.is_empty() {
            return cleaned;
        }
        let cleaned = self.normalize(stdout);
        if !cleaned.is_empty() {
            return cleaned;
        }
        let raw = stderr.trim();
        if raw.is_empty() {
            stdout.trim().to_string()
        } else {
            raw.to_string()
        }
    }
}
