pub mod editor;
pub mod form;
pub mod markdown;
pub mod theme;
pub mod view;

pub use editor::Editor;
pub use form::{Focus, FormState, Outcome};
pub use theme::Theme;
