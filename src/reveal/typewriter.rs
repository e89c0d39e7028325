/// Reveals markup one character per step. A `<...>` tag is revealed whole so
/// partially typed markup is never shown.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    /// Byte offset of the revealed prefix, always on a char boundary
    progress: usize,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            progress: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.progress >= self.text.len()
    }

    /// Reveal the next character or tag. Returns whether text remains.
    pub fn step(&mut self) -> bool {
        let rest = &self.text[self.progress..];
        let Some(next) = rest.chars().next() else {
            return false;
        };

        self.progress += if next == '<' {
            // An unclosed tag reveals the remainder
            rest.find('>').map_or(rest.len(), |end| end + 1)
        } else {
            next.len_utf8()
        };
        !self.is_done()
    }

    /// The revealed prefix
    pub fn visible(&self) -> &str {
        &self.text[..self.progress]
    }

    /// Revealed prefix with a blinking `_` cursor on odd positions
    pub fn render(&self) -> String {
        let mut out = self.visible().to_string();
        if self.visible().chars().count() % 2 == 1 {
            out.push('_');
        }
        out
    }
}
