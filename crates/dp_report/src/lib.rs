//! dp_report — pure, offline rendering of FD/MFD results for the CLI.
//!
//! No I/O and no sinks: every function here takes already-computed data
//! and returns an owned `String`. Grounded on the original engine's
//! `VisualizeHighlights` hook (a textual per-cluster dump) and on spec
//! §6's canonical FD JSON encoding, which `render_fd_json` simply
//! forwards to `dp_algo::fd::get_json_fds`.

#![forbid(unsafe_code)]

use dp_algo::fd::Fd;
use dp_algo::metric::highlight::Highlight;
use dp_core::Vertical;

fn column_label(column_names: &[String], index: usize) -> String {
    column_names.get(index).cloned().unwrap_or_else(|| format!("col{index}"))
}

fn lhs_label(column_names: &[String], lhs: &Vertical) -> String {
    if lhs.is_empty() {
        return "∅".to_string();
    }
    let names: Vec<String> = lhs.indices().into_iter().map(|i| column_label(column_names, i)).collect();
    format!("{{{}}}", names.join(", "))
}

/// One line per FD: `{A, B} -> C`.
pub fn render_fd_list(column_names: &[String], fds: &[Fd]) -> String {
    let mut sorted: Vec<&Fd> = fds.iter().collect();
    sorted.sort_by(|a, b| (a.rhs, a.lhs.indices()).cmp(&(b.rhs, b.lhs.indices())));
    sorted
        .into_iter()
        .map(|fd| format!("{} -> {}", lhs_label(column_names, &fd.lhs), column_label(column_names, fd.rhs)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A short human-readable summary: FD count, keys, fingerprint.
pub fn render_fd_summary(column_names: &[String], fds: &[Fd], keys: &[usize], fletcher16: u32) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} functional dependencies discovered\n", fds.len()));
    if keys.is_empty() {
        out.push_str("no candidate keys found\n");
    } else {
        let key_names: Vec<String> = keys.iter().map(|&i| column_label(column_names, i)).collect();
        out.push_str(&format!("candidate key(s): {}\n", key_names.join(", ")));
    }
    out.push_str(&format!("fletcher16: {fletcher16}\n"));
    out.push_str(&render_fd_list(column_names, fds));
    out
}

/// Canonical JSON of the FD collection (§6). A thin forward to
/// `dp_algo::fd::get_json_fds` so callers don't need to import `dp_algo`
/// directly for this.
pub fn render_fd_json(fds: &[Fd]) -> String {
    dp_algo::fd::get_json_fds(fds)
}

/// Per-cluster textual dump of failing highlights, in the order they're
/// given (callers sort first via `dp_algo::metric::highlight::sort_highlights`
/// if a particular discipline is wanted).
pub fn render_highlights(highlights: &[Highlight], column_names: &[String], rhs_indices: &[usize]) -> String {
    if highlights.is_empty() {
        return "no failing clusters\n".to_string();
    }
    let rhs_label = rhs_indices.iter().map(|&i| column_label(column_names, i)).collect::<Vec<_>>().join(", ");
    highlights
        .iter()
        .map(|h| {
            format!(
                "cluster {}: row {} vs row {} on [{}] — distance {}",
                h.cluster_id, h.data_index, h.furthest_data_index, rhs_label, h.max_distance
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line verdict plus highlight count, the first thing a CLI prints
/// for an MFD run.
pub fn render_mfd_summary(holds: bool, highlights: &[Highlight]) -> String {
    if holds {
        "metric functional dependency holds\n".to_string()
    } else {
        format!("metric functional dependency fails ({} cluster(s) violate it)\n", highlights.len())
    }
}
