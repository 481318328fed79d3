use std::cmp::min;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

/// Multi-line text input for the learning targets. Columns count chars, not bytes.
#[derive(Debug, Clone)]
pub struct Editor {
    lines: Vec<String>,
    cursor: Cursor,
    scroll_top: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Cursor::default(),
            scroll_top: 0,
        }
    }

    pub fn with_text(text: &str) -> Self {
        let mut editor = Self::new();
        editor.insert_str(text);
        editor
    }

    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Keeps the cursor's wrapped row inside a view `view_height` rows tall and `width` wide.
    pub fn ensure_cursor_visible(&mut self, view_height: usize, width: usize) {
        if view_height == 0 {
            self.scroll_top = 0;
            return;
        }

        let row = self.visual_cursor(width).row;
        if row < self.scroll_top {
            self.scroll_top = row;
        } else if row >= self.scroll_top + view_height {
            self.scroll_top = row + 1 - view_height;
        }
    }

    /// The content as shown in a panel `width` columns wide, hard-wrapped by char.
    pub fn wrapped_lines(&self, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut rows = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                rows.push(String::new());
            } else {
                rows.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
            }
        }
        rows
    }

    /// Where the cursor lands once lines are wrapped at `width`.
    pub fn visual_cursor(&self, width: usize) -> Cursor {
        let width = width.max(1);
        let rows_above: usize = self.lines[..self.cursor.row]
            .iter()
            .map(|line| line.chars().count().div_ceil(width).max(1))
            .sum();

        Cursor {
            row: rows_above + self.cursor.col / width,
            col: self.cursor.col % width,
        }
    }

    /// Inserts pasted or piped text, splitting on newlines.
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\n' => self.insert_newline(),
                '\r' => {}
                c => self.insert_char(c),
            }
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        let col = self.cursor.col;
        let line = self.current_line_mut();
        let idx = byte_index(line, col);
        line.insert(idx, ch);
        self.cursor.col += 1;
    }

    pub fn insert_newline(&mut self) {
        let col = self.cursor.col;
        let line = self.current_line_mut();
        let idx = byte_index(line, col);
        let rest = line.split_off(idx);
        self.lines.insert(self.cursor.row + 1, rest);
        self.cursor = Cursor {
            row: self.cursor.row + 1,
            col: 0,
        };
    }

    pub fn backspace(&mut self) {
        if self.cursor.col > 0 {
            let col = self.cursor.col;
            let line = self.current_line_mut();
            let start = byte_index(line, col - 1);
            let end = byte_index(line, col);
            line.drain(start..end);
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            let removed = self.lines.remove(self.cursor.row);
            self.cursor.row -= 1;
            self.cursor.col = self.line_len(self.cursor.row);
            self.current_line_mut().push_str(&removed);
        }
    }

    pub fn delete(&mut self) {
        let col = self.cursor.col;
        if col < self.line_len(self.cursor.row) {
            let line = self.current_line_mut();
            let start = byte_index(line, col);
            let end = byte_index(line, col + 1);
            line.drain(start..end);
        } else if self.cursor.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor.row + 1);
            self.current_line_mut().push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.line_len(self.cursor.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.row) {
            self.cursor.col += 1;
        } else if self.cursor.row + 1 < self.lines.len() {
            self.cursor = Cursor {
                row: self.cursor.row + 1,
                col: 0,
            };
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.clamp_col();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.clamp_col();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor.col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.col = self.line_len(self.cursor.row);
    }

    fn clamp_col(&mut self) {
        self.cursor.col = min(self.cursor.col, self.line_len(self.cursor.row));
    }

    fn current_line_mut(&mut self) -> &mut String {
        &mut self.lines[self.cursor.row]
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines
            .get(row)
            .map(|line| line.chars().count())
            .unwrap_or(0)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}
