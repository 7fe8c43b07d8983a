use crate::syntax;

/// A character cursor over source text.
///
/// Offsets are byte offsets into the source, so that they can be used to build text regions.
#[derive(Clone, Debug)]
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    position: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner positioned at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        let chars = source.char_indices().collect();
        let position = 0;

        Scanner {
            source,
            chars,
            position,
        }
    }

    /// Whether all characters have been consumed.
    pub fn eof(&self) -> bool {
        self.position >= self.chars.len()
    }

    /// The byte offset of the next character, or the source length at the end of input.
    pub fn offset(&self) -> usize {
        self.chars
            .get(self.position)
            .map_or(self.source.len(), |&(offset, _)| offset)
    }

    /// Returns the next character without consuming it.
    pub fn peek(&self) -> syntax::Result<char> {
        self.chars
            .get(self.position)
            .map(|&(_, c)| c)
            .ok_or_else(|| syntax::Error::PrematureEnd {
                offset: self.offset(),
            })
    }

    /// Consumes and returns the next character.
    pub fn next(&mut self) -> syntax::Result<char> {
        let c = self.peek()?;
        self.position += 1;
        Ok(c)
    }

    /// Undoes exactly one call to `next`.
    pub fn push_back(&mut self) -> syntax::Result<()> {
        if self.position == 0 {
            Err(syntax::Error::PushBackAtStart)
        } else {
            self.position -= 1;
            Ok(())
        }
    }

    /// The source text between two byte offsets.
    pub fn text(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }
}
