//! Single-slot status line reporting the outcome of the last action.

/// Last-write-wins status message with an error flag for emphasis.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatusChannel {
    message: String,
    is_error: bool,
}

impl StatusChannel {
    pub fn info(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.is_error = false;
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.is_error = true;
    }

    /// Blank the line.
    pub fn clear(&mut self) {
        self.message.clear();
        self.is_error = false;
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_writes_replace_earlier_ones() {
        let mut status = StatusChannel::default();
        status.error("Title is required");
        status.info("Loaded 3 tasks");
        assert_eq!(status.message(), "Loaded 3 tasks");
        assert!(!status.is_error());
    }

    #[test]
    fn clear_drops_message_and_error_flag() {
        let mut status = StatusChannel::default();
        status.error("Server error");
        status.clear();
        assert_eq!(status, StatusChannel::default());
    }
}
