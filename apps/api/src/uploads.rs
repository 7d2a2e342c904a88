//! Archive of raw uploads. Every received file is kept verbatim under the upload
//! directory, whether or not it could be analyzed. Files skipped as duplicates are
//! not written, so an archived original is never replaced.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::analysis::models::{IngestOutcome, SkipReason};
use crate::analysis::UploadedFile;

/// Client-supplied names may carry path components; only the final one is kept.
pub fn archive_file_name(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        _ => Some(base),
    }
}

pub async fn archive_upload(dir: &Path, file: &UploadedFile) -> std::io::Result<Option<PathBuf>> {
    let Some(base) = archive_file_name(&file.name) else {
        return Ok(None);
    };
    tokio::fs::create_dir_all(dir).await?;
    let target = dir.join(base);
    tokio::fs::write(&target, &file.content).await?;
    Ok(Some(target))
}

/// Archives the files of a finished batch that were not skipped as duplicates.
/// Within a batch only the first file of a name is ever analyzed, so that is the
/// one kept. Failures are logged and never fail the upload.
pub async fn archive_accepted(
    dir: &Path,
    files: &[UploadedFile],
    outcome: &IngestOutcome,
) -> usize {
    let mut accepted: HashSet<&str> = outcome
        .analyzed
        .iter()
        .map(|r| r.name.as_str())
        .chain(
            outcome
                .skipped
                .iter()
                .filter(|s| s.reason != SkipReason::Duplicate)
                .map(|s| s.name.as_str()),
        )
        .collect();

    let mut saved = 0;
    for file in files.iter().filter(|f| accepted.remove(f.name.as_str())) {
        match archive_upload(dir, file).await {
            Ok(Some(_)) => saved += 1,
            Ok(None) => warn!("Not archiving upload with unusable name {:?}", file.name),
            Err(e) => warn!("Failed to archive {}: {e}", file.name),
        }
    }
    if saved > 0 {
        info!("Archived {saved} upload(s) to {}", dir.display());
    }
    saved
}
