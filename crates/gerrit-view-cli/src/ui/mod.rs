//! Console dashboard for `cgerrit`
//!
//! - `actor`: dedicated thread owning the terminal and the change board
//! - `dashboard`: pure frame composition and key handling
//! - `engine`: raw-mode terminal painting
//! - `layout`: column widths and wrapping
//! - `theme`: colors and glyphs

pub mod actor;
pub mod dashboard;
pub mod engine;
pub mod layout;
pub mod theme;

pub use actor::{ActorSink, DashboardActor, UiEvent};
pub use theme::Theme;
