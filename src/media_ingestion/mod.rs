pub mod upload;
pub mod validation;

pub use upload::handle_image_upload;
pub use validation::MAX_IMAGE_SIZE;
