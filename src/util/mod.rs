//! Text helpers for terminal rendering and user input.

mod text;

pub use text::{compact_count, display_width, normalize_name, strip_control_chars, truncate_to_width};

/// Maximum length accepted in the go-to prompts and sidebar search.
pub const MAX_INPUT_LENGTH: usize = 100;
