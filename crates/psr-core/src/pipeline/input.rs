//! Suspend/resume boundary for the interactive stages.
//!
//! Manual canvas recoloring and manual tissue selection block until an
//! external collaborator answers. The pipeline hands it a request describing
//! what is needed and resumes with the reply; nothing in this crate talks to
//! a user directly.

use image::RgbImage;

use crate::error::InputError;
use crate::quantify::ImageId;
use crate::raster::{Mask, Point, Region};

/// Request for canvas flood-fill seeds.
#[derive(Debug)]
pub struct CanvasRequest<'a> {
    pub id: &'a ImageId,
    pub raw: &'a RgbImage,
}

/// Request for a manual tissue outline.
#[derive(Debug)]
pub struct SelectionRequest<'a> {
    pub id: &'a ImageId,
    /// 1-based attempt number.
    pub attempt: u32,
    pub max_attempts: u32,
    /// The smoothed, hole-filled signal mask the operator traces on.
    pub smoothed: &'a Mask,
}

/// Source of operator input.
pub trait ManualInput {
    /// Points to flood-fill with the background color.
    fn canvas_clicks(&mut self, request: &CanvasRequest<'_>) -> Result<Vec<Point>, InputError>;

    /// The tissue region, or `None` if the operator made no selection.
    fn tissue_selection(
        &mut self,
        request: &SelectionRequest<'_>,
    ) -> Result<Option<Region>, InputError>;
}

/// Collaborator for fully automatic runs; refuses every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoManualInput;

impl ManualInput for NoManualInput {
    fn canvas_clicks(&mut self, _request: &CanvasRequest<'_>) -> Result<Vec<Point>, InputError> {
        Err(InputError::Unavailable("canvas clicks"))
    }

    fn tissue_selection(
        &mut self,
        _request: &SelectionRequest<'_>,
    ) -> Result<Option<Region>, InputError> {
        Err(InputError::Unavailable("tissue selection"))
    }
}
