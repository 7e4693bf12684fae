//! Helpers shared by the unit tests.

use std::{cell::RefCell, io::Write, rc::Rc};

/// Memory-backed writer whose contents stay readable after it has been
/// handed to a [`crate::Repl`] as its output.
#[derive(Clone, Default)]
pub(crate) struct SharedOutput {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl SharedOutput {
    pub(crate) fn boxed(&self) -> Box<dyn Write> {
        Box::new(self.clone())
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
