//! The presentation layer: colors folded source lines by branch verdict.
//!
//! Folded lines are scanned top-down for the keywords marking conditional
//! constructs; each matching line consumes the next unconsumed verdict in
//! order.  Matching is plain substring containment.

use log::debug;

use crate::eval::Verdict;

const MARKERS: [&str; 3] = ["if", "while", "else"];

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Wrap each conditional-construct line of `source` in green (true
/// verdict) or red (false verdict).  Marker lines beyond the verdict list
/// are left unpainted.
pub fn annotate(source: &str, verdicts: &[Verdict]) -> String {
    let mut next: usize = 0;

    let lines: Vec<String> = source
        .lines()
        .map(|line| {
            if MARKERS.iter().any(|marker| line.contains(marker)) && next < verdicts.len() {
                let color: &str = if verdicts[next].truth { GREEN } else { RED };

                debug!(
                    "Marking line {:?} with verdict {}",
                    line, verdicts[next].truth
                );

                next += 1;

                format!("{}{}{}", color, line, RESET)
            } else {
                line.to_string()
            }
        })
        .collect();

    lines.join("\n")
}
