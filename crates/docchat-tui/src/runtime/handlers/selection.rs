use std::path::PathBuf;

use docchat_core::files::RawFile;

use crate::events::UiEvent;

/// Reads size and content type of each chosen path.
pub async fn load_selection(paths: Vec<PathBuf>) -> UiEvent {
    let result = tokio::task::spawn_blocking(move || read_selection(&paths))
        .await
        .unwrap_or_else(|e| Err(format!("Task failed: {e}")));
    UiEvent::SelectionLoaded(result)
}

/// Stops at the first unreadable path.
fn read_selection(paths: &[PathBuf]) -> Result<Vec<RawFile>, String> {
    paths
        .iter()
        .map(|path| RawFile::from_path(path).map_err(|e| format!("{}: {e}", path.display())))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_read_selection_reads_every_path() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("report.pdf");
        fs::write(&pdf, b"%PDF-1.4\n").unwrap();

        let files = read_selection(&[pdf]).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].mime, "application/pdf");
        assert_eq!(files[0].size, 9);
    }

    #[test]
    fn test_read_selection_names_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.png");

        let err = read_selection(&[missing.clone()]).unwrap_err();

        assert!(err.contains("gone.png"));
    }

    #[tokio::test]
    async fn test_load_selection_wraps_result_in_event() {
        let event = load_selection(Vec::new()).await;
        assert!(matches!(event, UiEvent::SelectionLoaded(Ok(files)) if files.is_empty()));
    }
}
