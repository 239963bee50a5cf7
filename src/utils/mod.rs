pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{APP_DIR_NAME, get_cache_dir, get_config_dir};
pub use paths::{
    MAX_EXPORT_SIZE_BYTES, MAX_TIMELINE_SIZE_BYTES, format_path_with_tilde, validate_file_size,
};
pub use terminal::sanitize_for_terminal;
