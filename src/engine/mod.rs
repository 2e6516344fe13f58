//! Stage transitions and ledger/filesystem reconciliation
//!
//! The ledger is authoritative: a transition always commits the ledger row,
//! and moving the file is best-effort. A file that is already gone from its
//! source directory is absorbed, which makes repeated transitions converge
//! on the same state.

mod reconcile;
mod transition;

pub use reconcile::{Finding, ReconcileOptions, ReconcileReport};
pub use transition::{FileOutcome, TransitionEngine, TransitionReport};

/// Normalize a stored relative path for comparison: forward slashes, no
/// leading `./` or `../` segments
pub(crate) fn normalize_stored_path(path: &str) -> String {
    let mut path = path.trim().replace('\\', "/");
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest.to_string();
        } else if let Some(rest) = path.strip_prefix("../") {
            path = rest.to_string();
        } else {
            break;
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_stored_path() {
        assert_eq!(
            normalize_stored_path("..\\Resume\\To_Apply\\resume_a.pdf"),
            "Resume/To_Apply/resume_a.pdf"
        );
        assert_eq!(normalize_stored_path("./../Resume/a.pdf"), "Resume/a.pdf");
        assert_eq!(normalize_stored_path("Resume/a.pdf"), "Resume/a.pdf");
    }
}
