use std::cell::RefCell;
use std::rc::Rc;

/// Indented text buffer for generated modules
#[derive(Default)]
pub struct CodeWriter {
    buffer: Rc<RefCell<String>>,
    indent_level: Rc<RefCell<usize>>,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, text: &str) {
        self.buffer.borrow_mut().push_str(text);
    }

    pub fn add_line(&self, text: &str) {
        if !text.is_empty() {
            self.add_indented(text);
        }
        self.add("\n");
    }

    pub fn add_indented(&self, text: &str) {
        let indent = "  ".repeat(*self.indent_level.borrow());
        let mut buffer = self.buffer.borrow_mut();
        buffer.push_str(&indent);
        buffer.push_str(text);
    }

    pub fn indent(&self) {
        *self.indent_level.borrow_mut() += 1;
    }

    pub fn dedent(&self) {
        let mut level = self.indent_level.borrow_mut();
        if *level > 0 {
            *level -= 1;
        }
    }

    pub fn get_output(&self) -> String {
        self.buffer.borrow().clone()
    }

    /// Writer sharing this one's indentation but with its own buffer
    pub fn with_new_buffer(&self) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(String::new())),
            indent_level: self.indent_level.clone(),
        }
    }

    pub fn merge_buffer(&self, other: &CodeWriter) {
        self.buffer.borrow_mut().push_str(&other.buffer.borrow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_buffers_share_indent() {
        let writer = CodeWriter::new();
        writer.add_line("a {");
        writer.indent();
        let inner = writer.with_new_buffer();
        inner.add_line("b;");
        writer.dedent();
        writer.merge_buffer(&inner);
        writer.add_line("}");

        assert_eq!(writer.get_output(), "a {\n  b;\n}\n");
    }
}
