//! The text viewer screen: session state, painting and the key loop.

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::{debug, info, warn};

use crate::{
    canvas::{Canvas, FlushTarget},
    config::ViewerConfig,
    document::{Document, LoadError, Storage},
    glyph::{FontHeight, FontSet, GlyphRenderer},
    input::{Command, KeyCode, KeyDebouncer, KeyHandler, KeySource},
    layout::LayoutIndex,
    pagination::PageCursor,
};

/// Only files with this exact, case-sensitive suffix are opened.
pub const TEXT_EXTENSION: &str = ".txt";
/// Capacity kept for the path shown in the load-failure message.
pub const ERROR_PATH_BYTES: usize = 96;

const MIN_PATH_LEN: usize = TEXT_EXTENSION.len() + 1;

/// `true` for `<name>.txt` with a non-empty `<name>`.
pub fn accepts_path(path: &str) -> bool {
    path.len() >= MIN_PATH_LEN && path.ends_with(TEXT_EXTENSION)
}

enum Session {
    Ready {
        document: Document,
        /// `None` when the index could not be allocated; nothing is drawn.
        layout: Option<LayoutIndex>,
        cursor: PageCursor,
    },
    Failed {
        path: String<ERROR_PATH_BYTES>,
        error: LoadError,
    },
}

pub struct ReaderScreen<'f, F> {
    canvas: Canvas<F>,
    glyphs: GlyphRenderer<'f>,
    config: ViewerConfig,
    session: Session,
}

impl<'f, F> ReaderScreen<'f, F>
where
    F: FlushTarget,
{
    /// Opens `path` and paints its first page.
    ///
    /// Returns `None`, without touching storage, for paths that are not
    /// `*.txt`. A failed load still yields a screen: it shows the error and
    /// only reacts to the exit key.
    pub fn open<S: Storage>(
        path: &str,
        storage: &mut S,
        canvas: Canvas<F>,
        fonts: FontSet<'f>,
        config: ViewerConfig,
    ) -> Option<Self> {
        if !accepts_path(path) {
            debug!("reader: ignoring {}", path);
            return None;
        }

        info!("reader: open {}", path);
        let session = match Document::load(storage, path) {
            Ok(document) => ready_session(document, &canvas, &config),
            Err(error) => Session::Failed {
                path: truncated(path),
                error,
            },
        };

        Some(Self::start(canvas, fonts, config, session))
    }

    /// Shows a document that is already in memory.
    pub fn with_document(
        document: Document,
        canvas: Canvas<F>,
        fonts: FontSet<'f>,
        config: ViewerConfig,
    ) -> Self {
        let session = ready_session(document, &canvas, &config);
        Self::start(canvas, fonts, config, session)
    }

    fn start(canvas: Canvas<F>, fonts: FontSet<'f>, config: ViewerConfig, session: Session) -> Self {
        let mut screen = Self {
            canvas,
            glyphs: GlyphRenderer::new(fonts),
            config,
            session,
        };
        screen.paint();
        screen
    }

    pub fn canvas(&self) -> &Canvas<F> {
        &self.canvas
    }

    /// Access for the low-memory handler (release / restore / fallback).
    pub fn canvas_mut(&mut self) -> &mut Canvas<F> {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> Canvas<F> {
        self.canvas
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.session {
            Session::Ready { document, .. } => Some(document),
            Session::Failed { .. } => None,
        }
    }

    pub fn layout(&self) -> Option<&LayoutIndex> {
        match &self.session {
            Session::Ready { layout, .. } => layout.as_ref(),
            Session::Failed { .. } => None,
        }
    }

    pub fn cursor(&self) -> Option<&PageCursor> {
        match &self.session {
            Session::Ready { cursor, .. } => Some(cursor),
            Session::Failed { .. } => None,
        }
    }

    pub fn load_error(&self) -> Option<LoadError> {
        match &self.session {
            Session::Ready { .. } => None,
            Session::Failed { error, .. } => Some(*error),
        }
    }

    /// Redraws the whole screen and flushes it once.
    pub fn paint(&mut self) {
        let fg = self.config.foreground;
        let font = self.config.font_height;
        let line_height = self.config.line_height() as i32;

        self.canvas.fill(self.config.background);

        match &self.session {
            Session::Ready {
                document,
                layout: Some(layout),
                cursor,
            } => {
                for (row, index) in cursor.visible_range().enumerate() {
                    let Some(line) = layout.get(index) else {
                        break;
                    };
                    self.glyphs.blit_string(
                        &mut self.canvas,
                        0,
                        row as i32 * line_height,
                        font,
                        fg,
                        None,
                        document.line_bytes(line),
                    );
                }
            }
            Session::Ready { layout: None, .. } => {}
            Session::Failed { path, error } => {
                self.glyphs.blit_fmt(
                    &mut self.canvas,
                    0,
                    0,
                    font,
                    fg,
                    None,
                    format_args!("{}: {}", path, error),
                );
            }
        }

        self.canvas.flush_all();
    }

    /// Applies a command and repaints when the page moved. Returns `false`
    /// for [`Command::Exit`].
    pub fn apply(&mut self, command: Command) -> bool {
        if command == Command::Exit {
            info!("reader: exit requested");
            return false;
        }

        let Session::Ready { cursor, .. } = &mut self.session else {
            return true;
        };

        let moved = match command {
            Command::PrevPage => cursor.prev_page(),
            Command::NextPage => cursor.next_page(),
            Command::PrevHalfPage => cursor.prev_half_page(),
            Command::NextHalfPage => cursor.next_half_page(),
            Command::Exit => false,
        };

        if moved {
            debug!(
                "reader: page {}/{}",
                cursor.current_page() + 1,
                cursor.total_pages()
            );
            self.paint();
        }
        true
    }

    /// Switches font size and rewraps, keeping the first visible byte on
    /// screen.
    pub fn set_font_height(&mut self, font_height: FontHeight) {
        if font_height == self.config.font_height {
            return;
        }
        self.config.font_height = font_height;

        if let Session::Ready {
            document,
            layout,
            cursor,
        } = &mut self.session
        {
            let anchor = layout
                .as_ref()
                .and_then(|layout| layout.get(cursor.visible_range().start))
                .map_or(0, |line| line.start);

            let relaid = LayoutIndex::for_document(
                document,
                self.config.chars_per_line(self.canvas.width()),
            );
            let total = relaid.as_ref().map_or(0, LayoutIndex::len);
            let mut relaid_cursor =
                PageCursor::new(total, self.config.lines_per_page(self.canvas.height()));

            if let Some(relaid) = &relaid {
                let line = relaid
                    .lines()
                    .partition_point(|line| line.start <= anchor)
                    .saturating_sub(1);
                relaid_cursor.show_line(line);
            }

            debug!(
                "reader: reflow to {} lines, page {}/{}",
                total,
                relaid_cursor.current_page() + 1,
                relaid_cursor.total_pages()
            );
            *layout = relaid;
            *cursor = relaid_cursor;
        }

        self.paint();
    }

    /// Cooperative key loop: one sample, at most one event and one sleep per
    /// tick, until the exit key is released.
    pub fn run<K, D>(&mut self, keys: &mut K, delay: &mut D)
    where
        K: KeySource,
        D: DelayNs,
    {
        let mut debouncer = KeyDebouncer::new(self.config.long_press_ticks);

        loop {
            if self.canvas.take_repaint_request() {
                self.paint();
            }

            match keys.poll_key() {
                Ok(sample) => {
                    if let Some(event) = debouncer.update(sample) {
                        if !self.on_key(event) {
                            break;
                        }
                    }
                }
                Err(_) => warn!("reader: key source error, tick skipped"),
            }

            delay.delay_ms(self.config.tick_ms);
        }

        info!("reader: session closed");
    }
}

impl<F> KeyHandler for ReaderScreen<'_, F>
where
    F: FlushTarget,
{
    fn on_release(&mut self, code: KeyCode) -> bool {
        match self.config.keymap.command(code) {
            Some(command) => self.apply(command),
            None => true,
        }
    }
}

/// Screen entry point: opens `path` and runs until exit.
///
/// Returns `false` when the path was rejected and nothing ran.
pub fn run_reader<S, F, K, D>(
    path: &str,
    storage: &mut S,
    canvas: Canvas<F>,
    fonts: FontSet<'_>,
    config: ViewerConfig,
    keys: &mut K,
    delay: &mut D,
) -> bool
where
    S: Storage,
    F: FlushTarget,
    K: KeySource,
    D: DelayNs,
{
    let Some(mut screen) = ReaderScreen::open(path, storage, canvas, fonts, config) else {
        return false;
    };
    screen.run(keys, delay);
    true
}

fn ready_session<F: FlushTarget>(
    document: Document,
    canvas: &Canvas<F>,
    config: &ViewerConfig,
) -> Session {
    let layout = LayoutIndex::for_document(&document, config.chars_per_line(canvas.width()));
    let total = layout.as_ref().map_or(0, LayoutIndex::len);
    let cursor = PageCursor::new(total, config.lines_per_page(canvas.height()));
    info!(
        "reader: {} display lines, {} pages",
        total,
        cursor.total_pages()
    );

    Session::Ready {
        document,
        layout,
        cursor,
    }
}

fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
