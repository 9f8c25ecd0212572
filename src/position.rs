/// A line/column location within some input.
///
/// `idx` is a byte offset, `line` and `column` are 1-based and counted in
/// characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub idx: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The position of the first character of any input.
    pub const START: Position = Position {
        idx: 0,
        line: 1,
        column: 1,
    };

    /// Advance this position character by character up to `target`.
    ///
    /// Only the text between `self.idx` and `target` is walked, so extending
    /// a known position is proportional to the distance moved rather than to
    /// the length of the prefix. A `target` at or before the current index
    /// returns the position unchanged.
    pub fn advance(self, text: &str, target: usize) -> Position {
        if target <= self.idx {
            return self;
        }
        let Position {
            mut line,
            mut column,
            ..
        } = self;
        for ch in text[self.idx..target].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Position {
            idx: target,
            line,
            column,
        }
    }
}
