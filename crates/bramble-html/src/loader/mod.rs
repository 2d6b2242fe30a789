//! Loading documents from bytes.
//!
//! The loader decodes the source with a starting encoding (UTF-8 unless
//! configured otherwise) and builds the tree. When the document declares a
//! different encoding in a `<meta>` element and the source can be rewound,
//! the partial tree is thrown away and the source is parsed once more with
//! the declared encoding. There is never more than one restart.

mod decode;
mod error;
mod settings;
mod source;

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use bramble_common::warn_once;
use bramble_dom::{Document, Node, ParseError, ParseErrorKind};
use encoding_rs::Encoding;

pub use decode::DecodedChars;
pub use error::LoadError;
pub use settings::LoadSettings;
pub use source::{ForwardSource, HtmlSource, SeekableSource};

use crate::builder::{BuildHook, BuildSignal, DocumentBuilder};
use crate::tokenizer::{CharHook, HtmlTokenizer};

/// Hooks carried from one pass to the next.
struct Hooks {
    build: Vec<Box<dyn BuildHook>>,
    chars: Option<Box<dyn CharHook>>,
}

enum Pass {
    Done(Document),
    Restart {
        encoding: &'static Encoding,
        hooks: Hooks,
    },
}

/// Configurable entry point for parsing.
///
/// ```ignore
/// let document = HtmlParser::new()
///     .with_settings(LoadSettings::new().with_xhtml(true))
///     .parse_str("<p>Hello<br>world");
/// ```
pub struct HtmlParser {
    settings: LoadSettings,
    build_hooks: Vec<Box<dyn BuildHook>>,
    char_hook: Option<Box<dyn CharHook>>,
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlParser {
    /// A parser with default settings and no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: LoadSettings::default(),
            build_hooks: Vec::new(),
            char_hook: None,
        }
    }

    /// Replace the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: LoadSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add a tree-builder hook.
    #[must_use]
    pub fn with_build_hook(mut self, hook: Box<dyn BuildHook>) -> Self {
        self.build_hooks.push(hook);
        self
    }

    /// Install the reader's character hook.
    #[must_use]
    pub fn with_char_hook(mut self, hook: Box<dyn CharHook>) -> Self {
        self.char_hook = Some(hook);
        self
    }

    /// The settings in use.
    #[must_use]
    pub const fn settings(&self) -> &LoadSettings {
        &self.settings
    }

    /// Parse markup that is already text. Encoding declarations are
    /// recorded but have no other effect.
    #[must_use]
    pub fn parse_str(self, html: &str) -> Document {
        let options = Arc::clone(self.settings.options());
        let mut tokenizer = HtmlTokenizer::new(html.chars(), Arc::clone(&options));
        if let Some(hook) = self.char_hook {
            tokenizer = tokenizer.with_hook(hook);
        }
        let mut builder = DocumentBuilder::new(options).with_hooks(self.build_hooks);
        while let BuildSignal::EncodingDetected { .. } = builder.run(&mut tokenizer) {}
        let mut document = builder.finish();
        document.set_xhtml(self.settings.xhtml());
        document
    }

    /// Load a document from `source`, restarting once if it declares an
    /// encoding other than the one it was started with.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when reading or rewinding fails, and the
    /// encoding variants when the settings make encoding problems fatal.
    pub fn load<S: HtmlSource>(self, source: &mut S) -> Result<Document, LoadError> {
        let mut hooks = Hooks {
            build: self.build_hooks,
            chars: self.char_hook,
        };
        let mut encoding = self.settings.encoding();
        let mut restarted = false;
        loop {
            match parse_pass(source, encoding, &self.settings, hooks, restarted)? {
                Pass::Done(document) => return Ok(document),
                Pass::Restart {
                    encoding: declared,
                    hooks: kept,
                } => {
                    warn_once(
                        "HTML Loader",
                        &format!("document declares {}; reparsing", declared.name()),
                    );
                    source.restart()?;
                    encoding = declared;
                    hooks = kept;
                    restarted = true;
                }
            }
        }
    }
}

impl std::fmt::Debug for HtmlParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlParser")
            .field("settings", &self.settings)
            .field("build_hooks", &self.build_hooks.len())
            .field("char_hook", &self.char_hook.is_some())
            .finish()
    }
}

/// One decode-and-build pass over `source`.
fn parse_pass<S: HtmlSource>(
    source: &mut S,
    encoding: &'static Encoding,
    settings: &LoadSettings,
    mut hooks: Hooks,
    restarted: bool,
) -> Result<Pass, LoadError> {
    let can_restart =
        !restarted && settings.restart_on_encoding_detect() && source.supports_restart();
    let chars = DecodedChars::new(&mut *source, encoding, settings.detect_bom());
    let mut tokenizer = HtmlTokenizer::new(chars, Arc::clone(settings.options()));
    if let Some(hook) = hooks.chars.take() {
        tokenizer = tokenizer.with_hook(hook);
    }
    let mut builder = DocumentBuilder::new(Arc::clone(settings.options())).with_hooks(hooks.build);

    loop {
        let (declared, node) = match builder.run(&mut tokenizer) {
            BuildSignal::Finished | BuildSignal::Cancelled => break,
            BuildSignal::EncodingDetected { encoding, node } => (encoding, node),
        };
        let input = tokenizer.input();
        let actual = input.encoding();
        if input.bom().is_some() || declared == actual {
            continue;
        }
        if can_restart {
            let hooks = Hooks {
                chars: tokenizer.take_hook(),
                build: builder.into_hooks(),
            };
            return Ok(Pass::Restart {
                encoding: declared,
                hooks,
            });
        }
        if settings.fail_on_encoding_mismatch() {
            return Err(LoadError::EncodingMismatch {
                declared: declared.name(),
                actual: actual.name(),
            });
        }
        let position = builder
            .document()
            .get(node)
            .map(Node::position)
            .unwrap_or_default();
        builder.record_error(
            ParseError::new(
                ParseErrorKind::EncodingMismatch,
                position,
                format!(
                    "document declares {} but is being read as {}",
                    declared.name(),
                    actual.name()
                ),
            )
            .on_node(node),
        );
    }

    let input = tokenizer.input_mut();
    if let Some(error) = input.take_io_error() {
        return Err(error.into());
    }
    let actual = input.encoding();
    if let Some(at) = input.first_error()
        && input.bom().is_none()
        && builder.document().declared_encoding().is_none()
    {
        if settings.fail_on_encoding_error() {
            return Err(LoadError::EncodingError {
                encoding: actual.name(),
                line: at.line,
                column: at.column,
            });
        }
        builder.record_error(ParseError::new(
            ParseErrorKind::EncodingError,
            at,
            format!("undecodable input read as {}", actual.name()),
        ));
    }

    let mut document = builder.finish();
    document.set_stream_encoding(Some(actual.name()));
    document.set_restarted(restarted);
    document.set_xhtml(settings.xhtml());
    Ok(Pass::Done(document))
}

// =============================================================================
// Convenience entry points
// =============================================================================

/// Parse markup with default settings.
#[must_use]
pub fn parse_str(html: &str) -> Document {
    HtmlParser::new().parse_str(html)
}

/// Parse markup with the given settings.
#[must_use]
pub fn parse_str_with(html: &str, settings: &LoadSettings) -> Document {
    HtmlParser::new().with_settings(settings.clone()).parse_str(html)
}

/// Load a document from any [`HtmlSource`].
///
/// # Errors
///
/// See [`HtmlParser::load`].
pub fn load<S: HtmlSource>(source: &mut S, settings: &LoadSettings) -> Result<Document, LoadError> {
    HtmlParser::new().with_settings(settings.clone()).load(source)
}

/// Load a document from bytes in memory. Restarts are possible.
///
/// # Errors
///
/// See [`HtmlParser::load`].
pub fn load_bytes(bytes: &[u8], settings: &LoadSettings) -> Result<Document, LoadError> {
    let mut source = SeekableSource::new(Cursor::new(bytes))?;
    load(&mut source, settings)
}

/// Load a document from a forward-only reader. A conflicting encoding
/// declaration is recorded as `EncodingMismatch` instead of restarting.
///
/// # Errors
///
/// See [`HtmlParser::load`].
pub fn load_reader<R: Read>(reader: R, settings: &LoadSettings) -> Result<Document, LoadError> {
    let mut source = ForwardSource::new(reader);
    load(&mut source, settings)
}

/// Load a document from a file. Restarts are possible.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be opened or read; see
/// also [`HtmlParser::load`].
pub fn load_file(path: impl AsRef<Path>, settings: &LoadSettings) -> Result<Document, LoadError> {
    let file = File::open(path)?;
    let mut source = SeekableSource::new(BufReader::new(file))?;
    load(&mut source, settings)
}
