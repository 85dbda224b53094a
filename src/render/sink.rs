//! Output buffer with a rewritable pending unit.

use std::collections::{HashMap, HashSet};

/// Accumulates rendered text.
///
/// The most recent paragraph stays pending until the next unit is written,
/// so a following node can still rewrite it (a definition body strips the
/// term markup, a code block turns the paragraph into an introducer).
#[derive(Debug, Default)]
pub struct OutputSink {
    output: String,
    pending: Option<String>,
    images: ImageRegistry,
    debug_markers: bool,
}

impl OutputSink {
    /// Creates an empty sink.
    pub fn new(debug_markers: bool) -> Self {
        Self {
            debug_markers,
            ..Default::default()
        }
    }

    /// Finalizes the pending unit and makes `text` the new pending unit.
    pub fn push_unit(&mut self, text: String) {
        self.flush();
        self.pending = Some(text);
    }

    /// Flushes the pending unit, then appends `text` verbatim.
    pub fn write(&mut self, text: &str) {
        self.flush();
        self.output.push_str(text);
    }

    /// Writes the pending unit followed by a newline.
    pub fn flush(&mut self) {
        if let Some(unit) = self.pending.take() {
            log::trace!("flush unit {:?}", unit);
            self.output.push_str(&unit);
            if self.debug_markers {
                self.output.push_str("endof para");
            }
            self.output.push('\n');
        }
    }

    /// Removes and returns the pending unit without writing it.
    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }

    /// Applies `transform` to the pending unit. Returns false if none exists.
    pub fn rewrite_pending(&mut self, transform: impl FnOnce(&mut String)) -> bool {
        match self.pending.as_mut() {
            Some(unit) => {
                transform(unit);
                true
            }
            None => false,
        }
    }

    /// Returns the inline image registry.
    pub fn images(&self) -> &ImageRegistry {
        &self.images
    }

    /// Returns the inline image registry for registration.
    pub fn images_mut(&mut self) -> &mut ImageRegistry {
        &mut self.images
    }

    /// Flushes and appends one substitution directive per registered image.
    pub fn finish(mut self) -> String {
        self.flush();

        for (path, name) in self.images.entries() {
            self.output
                .push_str(&format!("\n.. |{}| image:: {}\n", name, path));
        }

        self.output
    }
}

/// Substitution names of inline images, in first-registration order.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    entries: Vec<(String, String)>,
    by_path: HashMap<String, usize>,
    names: HashSet<String>,
}

impl ImageRegistry {
    /// Returns the substitution name for `path`, registering it on first use.
    ///
    /// The name is `stem`, suffixed with `_2`, `_3`… when another path
    /// already owns it.
    pub fn register(&mut self, path: &str, stem: &str) -> String {
        if let Some(&index) = self.by_path.get(path) {
            return self.entries[index].1.clone();
        }

        let mut name = stem.to_string();
        let mut counter = 2;
        while self.names.contains(&name) {
            name = format!("{}_{}", stem, counter);
            counter += 1;
        }

        self.names.insert(name.clone());
        self.by_path.insert(path.to_string(), self.entries.len());
        self.entries.push((path.to_string(), name.clone()));
        name
    }

    /// Iterates `(path, name)` pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, name)| (path.as_str(), name.as_str()))
    }

    /// Returns the number of registered images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no image is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_unit_flushed_by_next_unit() {
        let mut sink = OutputSink::new(false);
        sink.push_unit("\nfirst".into());
        assert_eq!(sink.output, "");

        sink.push_unit("\nsecond".into());
        assert_eq!(sink.output, "\nfirst\n");
        assert_eq!(sink.pending.as_deref(), Some("\nsecond"));

        assert_eq!(sink.finish(), "\nfirst\n\nsecond\n");
    }

    #[test]
    fn test_rewrite_and_take() {
        let mut sink = OutputSink::new(false);
        assert!(!sink.rewrite_pending(|u| u.push(':')));

        sink.push_unit("\nIntro".into());
        assert!(sink.rewrite_pending(|u| u.push_str(":\n")));

        assert_eq!(sink.take_pending().as_deref(), Some("\nIntro:\n"));
        assert!(sink.take_pending().is_none());
        assert_eq!(sink.finish(), "");
    }

    #[test]
    fn test_write_flushes_first() {
        let mut sink = OutputSink::new(false);
        sink.push_unit("\npara".into());
        sink.write("\n.. note::\n");
        assert_eq!(sink.output, "\npara\n\n.. note::\n");
        assert!(sink.pending.is_none());
    }

    #[test]
    fn test_debug_marker_on_flush() {
        let mut sink = OutputSink::new(true);
        sink.push_unit("x".into());
        assert_eq!(sink.finish(), "xendof para\n");
    }

    #[test]
    fn test_image_registry_first_wins() {
        let mut registry = ImageRegistry::default();
        assert_eq!(registry.register("images/logo.png", "logo"), "logo");
        assert_eq!(registry.register("images/logo.png", "logo"), "logo");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_image_registry_unique_names() {
        let mut registry = ImageRegistry::default();
        assert_eq!(registry.register("a/logo.png", "logo"), "logo");
        assert_eq!(registry.register("b/logo.jpg", "logo"), "logo_2");

        let entries: Vec<_> = registry.entries().collect();
        assert_eq!(
            entries,
            vec![("a/logo.png", "logo"), ("b/logo.jpg", "logo_2")]
        );
    }

    #[test]
    fn test_finish_emits_trailer() {
        let mut sink = OutputSink::new(false);
        sink.images_mut().register("images/picture_0.png", "picture_0");
        sink.push_unit("\nSee |picture_0|".into());

        assert_eq!(
            sink.finish(),
            "\nSee |picture_0|\n\n.. |picture_0| image:: images/picture_0.png\n"
        );
    }
}
