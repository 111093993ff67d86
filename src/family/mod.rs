//! The three component families.
//!
//! | Family | Adopts | Value |
//! |--------|--------|-------|
//! | [`TextFamily`] | any non-auxiliary element | plain text, or markup in toolbar mode |
//! | [`ImageFamily`] | exactly one `img` | image source URI |
//! | [`ColorFamily`] | any non-auxiliary element | CSS background color |

mod color;
mod image;
mod text;

pub use self::color::ColorFamily;
pub use self::image::{ImageFamily, ImageStage};
pub use self::text::TextFamily;

use crate::component::Editable;

/// An editable text region.
pub type EditableText = Editable<TextFamily>;

/// An editable image slot.
pub type EditableImage = Editable<ImageFamily>;

/// A background-color changer.
pub type ColorChanger = Editable<ColorFamily>;
