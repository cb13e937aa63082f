#![cfg_attr(not(test), no_std)]

//! Plain-text file viewer screen for small keypad-driven devices.
//!
//! The crate turns a raw byte buffer (ASCII mixed with GB2312-style
//! double-byte codes) into fixed-width display lines, pages through them and
//! paints them into an 8-bit indexed framebuffer. Storage, display flush, key
//! scanning and the scheduler delay are injected by the board.

extern crate alloc;

pub mod canvas;
pub mod config;
pub mod document;
pub mod glyph;
pub mod input;
pub mod layout;
pub mod pagination;
pub mod panel;
pub mod reader;

pub use canvas::{Canvas, Color, FlushTarget, Rect};
pub use config::ViewerConfig;
pub use document::{Document, LoadError, Storage};
pub use glyph::{FontHeight, FontSet, GlyphRenderer};
pub use input::{Command, KeyEvent, KeyPhase, KeySample, KeySource, Keymap};
pub use layout::{DisplayLine, LayoutIndex};
pub use pagination::PageCursor;
pub use reader::{ReaderScreen, accepts_path, run_reader};
