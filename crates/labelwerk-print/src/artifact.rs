// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact path resolution.
//
// The host UI hands over whatever its renderer produced, frequently as a
// `file://` URI. The driver wants a plain filesystem path to a file whose
// extension matches the print call it is about to make.

use std::path::{Path, PathBuf};

use labelwerk_core::ArtifactKind;
use labelwerk_core::error::{LabelwerkError, Result};
use tracing::debug;

const FILE_SCHEME: &str = "file://";

/// Strip a leading `file://` scheme, if any.
pub fn strip_file_scheme(raw: &str) -> &str {
    raw.strip_prefix(FILE_SCHEME).unwrap_or(raw)
}

/// Infer the artifact kind from the path's extension.
pub fn infer_kind(path: &Path) -> Option<ArtifactKind> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ArtifactKind::from_extension)
}

/// Resolve `raw` to an existing regular file whose extension agrees with
/// `kind`.
pub fn resolve_artifact(raw: &Path, kind: ArtifactKind) -> Result<PathBuf> {
    let path = match raw.to_str() {
        Some(s) => PathBuf::from(strip_file_scheme(s)),
        None => raw.to_path_buf(),
    };

    if !path.is_file() {
        debug!(path = %path.display(), "artifact missing");
        return Err(LabelwerkError::FileNotFound(path));
    }

    if infer_kind(&path) != Some(kind) {
        return Err(LabelwerkError::ArtifactMismatch {
            path,
            expected: kind,
        });
    }

    Ok(path)
}
