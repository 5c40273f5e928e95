pub mod batch;
pub mod export;
pub mod image_loader;
pub mod manual_input;
pub mod parameters;
pub mod results;

pub use batch::{BatchRunner, ProcessedImage, RunReport};
pub use export::{encode_png, optimize_png, write_raster, OutputLayout};
pub use image_loader::{
    image_id, list_images, load_source, read_png_scale, read_scale, read_tiff_scale,
};
pub use manual_input::SidecarInput;
pub use parameters::RunParameters;
pub use results::{ResultRow, ResultsTable};
