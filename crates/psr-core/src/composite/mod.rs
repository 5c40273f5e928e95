//! Mask compositing.
//!
//! Artifacts are removed from both the numerator (PSR signal) and the
//! denominator (total tissue), so the fraction between them is computed on
//! a consistent exclusion basis.

use crate::error::PipelineError;
use crate::raster::{Mask, Region};

/// The two masks that get debinarized and measured.
#[derive(Debug, Clone)]
pub struct Composites {
    /// Candidate AND NOT artifact, within the tissue region.
    pub psr_signal: Mask,
    /// Raw signal AND NOT artifact, within the tissue region.
    pub total_tissue: Mask,
}

/// Combine candidate, artifact and raw signal masks within `roi`.
///
/// The exclusion mask (pixels that are not candidates, or are artifacts) is
/// built first and then inverted inside the region, mirroring the additive
/// composite used for measurement.
pub fn composite(
    candidate: &Mask,
    artifacts: &Mask,
    tissue_signal: &Mask,
    roi: &Region,
) -> Result<Composites, PipelineError> {
    for mask in [candidate, artifacts, tissue_signal] {
        roi.mask().ensure_same_size(mask.dimensions())?;
    }

    let exclusion = candidate.invert().union(artifacts)?;
    let psr_signal = roi.mask().subtract(&exclusion)?;
    let total_tissue = roi.mask().intersect(tissue_signal)?.subtract(artifacts)?;

    Ok(Composites {
        psr_signal,
        total_tissue,
    })
}
