//! Loader configuration.

use std::sync::Arc;

use bramble_dom::HtmlOptions;
use encoding_rs::Encoding;

use super::error::LoadError;

/// How a document is loaded from bytes.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    encoding: &'static Encoding,
    detect_bom: bool,
    restart_on_encoding_detect: bool,
    fail_on_encoding_mismatch: bool,
    fail_on_encoding_error: bool,
    xhtml: bool,
    options: Arc<HtmlOptions>,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
            detect_bom: true,
            restart_on_encoding_detect: true,
            fail_on_encoding_mismatch: false,
            fail_on_encoding_error: false,
            xhtml: false,
            options: HtmlOptions::shared_default(),
        }
    }
}

impl LoadSettings {
    /// Default settings: UTF-8 until the document says otherwise, BOM
    /// sniffing and restarts enabled, nothing fatal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start decoding with `encoding`.
    #[must_use]
    pub const fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Start decoding with the encoding named by a WHATWG `label`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownEncoding`] for an unrecognized label.
    pub fn with_encoding_label(self, label: &str) -> Result<Self, LoadError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| LoadError::UnknownEncoding(label.to_string()))?;
        Ok(self.with_encoding(encoding))
    }

    /// Whether a byte order mark may override the starting encoding.
    #[must_use]
    pub const fn with_bom_detection(mut self, detect: bool) -> Self {
        self.detect_bom = detect;
        self
    }

    /// Whether a `<meta>` declaration may trigger a reparse.
    #[must_use]
    pub const fn with_restart_on_encoding_detect(mut self, restart: bool) -> Self {
        self.restart_on_encoding_detect = restart;
        self
    }

    /// Fail instead of recording `EncodingMismatch`.
    #[must_use]
    pub const fn with_fail_on_encoding_mismatch(mut self, fail: bool) -> Self {
        self.fail_on_encoding_mismatch = fail;
        self
    }

    /// Fail instead of recording `EncodingError`.
    #[must_use]
    pub const fn with_fail_on_encoding_error(mut self, fail: bool) -> Self {
        self.fail_on_encoding_error = fail;
        self
    }

    /// Mark loaded documents for XHTML output.
    #[must_use]
    pub const fn with_xhtml(mut self, xhtml: bool) -> Self {
        self.xhtml = xhtml;
        self
    }

    /// Use `options` for reading and writing.
    #[must_use]
    pub fn with_options(mut self, options: Arc<HtmlOptions>) -> Self {
        self.options = options;
        self
    }

    /// Starting encoding.
    #[must_use]
    pub const fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Whether byte order marks are honored.
    #[must_use]
    pub const fn detect_bom(&self) -> bool {
        self.detect_bom
    }

    /// Whether a declared encoding may trigger a reparse.
    #[must_use]
    pub const fn restart_on_encoding_detect(&self) -> bool {
        self.restart_on_encoding_detect
    }

    /// Whether a mismatch is fatal.
    #[must_use]
    pub const fn fail_on_encoding_mismatch(&self) -> bool {
        self.fail_on_encoding_mismatch
    }

    /// Whether undecodable input is fatal.
    #[must_use]
    pub const fn fail_on_encoding_error(&self) -> bool {
        self.fail_on_encoding_error
    }

    /// Whether documents are marked for XHTML output.
    #[must_use]
    pub const fn xhtml(&self) -> bool {
        self.xhtml
    }

    /// Read and write tables.
    #[must_use]
    pub const fn options(&self) -> &Arc<HtmlOptions> {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = LoadSettings::new();
        assert_eq!(settings.encoding(), encoding_rs::UTF_8);
        assert!(settings.detect_bom());
        assert!(settings.restart_on_encoding_detect());
        assert!(!settings.fail_on_encoding_mismatch());
        assert!(!settings.fail_on_encoding_error());
    }

    #[test]
    fn test_encoding_label() {
        let settings = LoadSettings::new().with_encoding_label(" Latin1 ").unwrap();
        assert_eq!(settings.encoding(), encoding_rs::WINDOWS_1252);
        assert!(matches!(
            LoadSettings::new().with_encoding_label("klingon"),
            Err(LoadError::UnknownEncoding(_))
        ));
    }
}
