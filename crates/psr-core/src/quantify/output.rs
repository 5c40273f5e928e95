use std::fmt;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::raster::ScaleInfo;

/// Identifier of the source image, usually its file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A grayscale output raster tagged with its origin and calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledRaster {
    image: GrayImage,
    scale: ScaleInfo,
    id: ImageId,
}

impl ScaledRaster {
    pub fn new(image: GrayImage, scale: ScaleInfo, id: ImageId) -> Self {
        Self { image, scale, id }
    }

    #[inline]
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    #[inline]
    pub fn scale(&self) -> &ScaleInfo {
        &self.scale
    }

    #[inline]
    pub fn id(&self) -> &ImageId {
        &self.id
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn into_parts(self) -> (GrayImage, ScaleInfo, ImageId) {
        (self.image, self.scale, self.id)
    }
}
