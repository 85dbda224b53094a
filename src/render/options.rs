//! Rendering options for reStructuredText output.

/// Options for reStructuredText rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Paragraph, list and span style names recognised by the renderer.
    pub styles: StyleNames,

    /// Underline characters by heading level, starting at level 0.
    /// Levels past the end use the last character.
    pub heading_chars: [char; 6],

    /// Paragraphs whose rendered text starts with one of these are dropped.
    pub dropped_prefixes: Vec<String>,

    /// Whether to put each sentence of a paragraph on its own line.
    pub split_sentences: bool,

    /// Whether to write `pre-title`, `pre-para`, `pre-item` and
    /// `endof para` markers into the output.
    pub debug_markers: bool,

    /// How to handle tables whose spans do not form a grid.
    pub error_mode: ErrorMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            styles: StyleNames::default(),
            heading_chars: ['#', '*', '=', '-', '^', '"'],
            dropped_prefixes: vec!["Unknown interpreted text role".to_string()],
            split_sentences: true,
            debug_markers: false,
            error_mode: ErrorMode::Strict,
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the style-name table.
    pub fn with_styles(mut self, styles: StyleNames) -> Self {
        self.styles = styles;
        self
    }

    /// Sets the heading underline characters.
    pub fn with_heading_chars(mut self, chars: [char; 6]) -> Self {
        self.heading_chars = chars;
        self
    }

    /// Adds a prefix marking paragraphs to drop.
    pub fn with_dropped_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.dropped_prefixes.push(prefix.into());
        self
    }

    /// Keeps paragraphs on a single line.
    pub fn without_sentence_split(mut self) -> Self {
        self.split_sentences = false;
        self
    }

    /// Enables the debug markers.
    pub fn with_debug_markers(mut self) -> Self {
        self.debug_markers = true;
        self
    }

    /// Skips malformed tables instead of failing.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Fails the conversion on a malformed table.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Returns true if malformed tables should be skipped.
    pub fn is_lenient(&self) -> bool {
        matches!(self.error_mode, ErrorMode::Lenient)
    }

    /// Returns the underline character for a heading level.
    pub fn heading_char(&self, level: usize) -> char {
        let last = self.heading_chars.len() - 1;
        self.heading_chars[level.min(last)]
    }
}

/// How to handle malformed tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the conversion.
    #[default]
    Strict,
    /// Log a warning and leave the table out.
    Lenient,
}

/// Style names written by docutils' ODF writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleNames {
    pub title: String,
    pub note_header: String,
    pub note_body: String,
    pub warning_header: String,
    pub warning_body: String,
    /// Definition body following a term paragraph
    pub block_indent: String,
    pub code_block: String,
    pub emphasis: String,
    pub strong: String,
    pub literal: String,
    /// List styles rendered with numbers
    pub ordered_lists: Vec<String>,
    /// Heading-numbering wrapper list
    pub outline_list: String,
}

impl Default for StyleNames {
    fn default() -> Self {
        Self {
            title: "rststyle-title".into(),
            note_header: "rststyle-admon-note-hdr".into(),
            note_body: "rststyle-admon-note-body".into(),
            warning_header: "rststyle-admon-warning-hdr".into(),
            warning_body: "rststyle-admon-warning-body".into(),
            block_indent: "rststyle-blockindent".into(),
            code_block: "rststyle-codeblock".into(),
            emphasis: "rststyle-emphasis".into(),
            strong: "rststyle-strong".into(),
            literal: "rststyle-inlineliteral".into(),
            ordered_lists: vec!["rststyle-blockquote-enumlist".into()],
            outline_list: "Outline".into(),
        }
    }
}

impl StyleNames {
    /// Returns true if the list style produces numbered items.
    pub fn is_ordered_list(&self, style: Option<&str>) -> bool {
        style.is_some_and(|s| self.ordered_lists.iter().any(|o| o == s))
    }

    /// Returns true if the list style is the outline wrapper.
    pub fn is_outline_list(&self, style: Option<&str>) -> bool {
        style == Some(self.outline_list.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_char_clamped() {
        let options = RenderOptions::default();
        assert_eq!(options.heading_char(0), '#');
        assert_eq!(options.heading_char(2), '=');
        assert_eq!(options.heading_char(5), '"');
        assert_eq!(options.heading_char(9), '"');
    }

    #[test]
    fn test_builder_chain() {
        let options = RenderOptions::new()
            .lenient()
            .with_debug_markers()
            .without_sentence_split()
            .with_dropped_prefix("System Message");

        assert!(options.is_lenient());
        assert!(options.debug_markers);
        assert!(!options.split_sentences);
        assert_eq!(options.dropped_prefixes.len(), 2);
        assert!(!options.strict().is_lenient());
    }

    #[test]
    fn test_list_style_lookup() {
        let styles = StyleNames::default();
        assert!(styles.is_ordered_list(Some("rststyle-blockquote-enumlist")));
        assert!(!styles.is_ordered_list(Some("rststyle-bulletlist")));
        assert!(!styles.is_ordered_list(Some("rststyle-enumlist")));
        assert!(!styles.is_ordered_list(None));
        assert!(styles.is_outline_list(Some("Outline")));
        assert!(!styles.is_outline_list(None));
    }
}
