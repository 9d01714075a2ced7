//! Diffing paired documents.

use imgdiff_engine::{Anchor, DiffOptions, DiffResult, compute_diff_with};

use crate::document::Document;

/// Diff the decoded images of `base` (origin side) and `changed` (live
/// side).
///
/// Both documents are decoded concurrently. If either cannot be decoded
/// the diff is skipped and `None` is returned; callers show whichever
/// image is available without an overlay.
pub async fn diff_documents(
    base: &Document,
    changed: &Document,
    anchor: Anchor,
    options: &DiffOptions,
) -> Option<DiffResult> {
    let (base_image, changed_image) = tokio::join!(base.decoded(), changed.decoded());
    match (base_image, changed_image) {
        (Ok(base_image), Ok(changed_image)) => {
            let result = compute_diff_with(base_image, changed_image, anchor, options);
            tracing::debug!(
                base = %base.address(),
                changed = %changed.address(),
                differing = result.diff_pixel_count,
                aligned = result.aligned_image.is_some(),
                "diff computed",
            );
            Some(result)
        }
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!(
                base = %base.address(),
                changed = %changed.address(),
                error = %err,
                "diff skipped",
            );
            None
        }
    }
}
