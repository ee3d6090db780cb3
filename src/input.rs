//! Text buffer for the search input, plus the "searching" flag that decides
//! whether the option list is shown.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputController {
    buffer: String,
    searching: bool,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn open(&mut self) {
        self.searching = true;
    }

    pub fn close(&mut self) {
        self.searching = false;
    }

    pub fn insert(&mut self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        self.buffer.push(c);
        true
    }

    pub fn backspace(&mut self) -> bool {
        self.buffer.pop().is_some()
    }

    /// Replace the whole buffer; returns whether the text changed.
    pub fn set(&mut self, text: &str) -> bool {
        let text: String = text.chars().filter(|c| !c.is_control()).collect();
        if self.buffer == text {
            return false;
        }
        self.buffer = text;
        true
    }

    pub fn clear(&mut self) -> bool {
        self.set("")
    }
}
