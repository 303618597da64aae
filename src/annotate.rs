//! Best-effort annotation pass over every comment not yet annotated.
//!
//! Each comment gets exactly one annotator call. Whatever happens, the comment is
//! flagged afterwards: a failed call is logged and skipped, never retried, so one bad
//! comment cannot stall the pass.

use crate::calais::Annotator;
use crate::error::StoreResult;
use crate::progress::maybe_count_progress;
use crate::store::CommentStore;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnnotateReport {
    pub processed: u64,
    pub failed: u64,
    pub entities: u64,
    pub topics: u64,
}

/// Annotate all pending comments. Only errors that stop the store from listing or
/// flagging comments are returned.
pub fn annotate_pending<A: Annotator + ?Sized>(
    store: &CommentStore,
    annotator: &A,
    progress: bool,
) -> StoreResult<AnnotateReport> {
    let pending = store.pending_comments()?;
    tracing::info!("Annotating {} comments", pending.len());

    let pb = maybe_count_progress(progress, pending.len() as u64, "Annotating");
    let mut report = AnnotateReport::default();

    for comment in pending {
        report.processed += 1;
        match annotator.analyze(&comment.text) {
            Ok(ann) => match store.record_annotation(comment.id, &ann) {
                Ok(()) => {
                    report.entities += ann.entities.len() as u64;
                    report.topics += ann.topics.len() as u64;
                    tracing::debug!(
                        "{} {}: {} entities, {} topics",
                        comment.source, comment.external_id, ann.entities.len(), ann.topics.len()
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("{} {}: could not record annotation: {}", comment.source, comment.external_id, e);
                    store.mark_annotated(comment.id)?;
                }
            },
            Err(e) => {
                report.failed += 1;
                tracing::warn!("{} {}: annotation failed: {}", comment.source, comment.external_id, e);
                store.mark_annotated(comment.id)?;
            }
        }
        if let Some(pb) = &pb { pb.inc(1); }
    }

    if let Some(pb) = pb { pb.finish_with_message("Annotation done"); }
    tracing::info!(
        "Annotated {} comments ({} failed): {} entities, {} topics",
        report.processed, report.failed, report.entities, report.topics
    );
    Ok(report)
}
