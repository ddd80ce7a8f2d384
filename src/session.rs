/// Holds the last corrected sentence between a correction result and a later
/// pronunciation check. Empty means no correction has been received since the
/// last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    last_corrected: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&str> {
        if self.last_corrected.is_empty() {
            None
        } else {
            Some(&self.last_corrected)
        }
    }

    pub fn set(&mut self, sentence: impl Into<String>) {
        self.last_corrected = sentence.into();
    }

    pub fn clear(&mut self) {
        self.last_corrected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert_eq!(SessionState::new().get(), None);
    }

    #[test]
    fn set_then_clear() {
        let mut session = SessionState::new();
        session.set("Minä haluan vettä.");
        assert_eq!(session.get(), Some("Minä haluan vettä."));

        session.clear();
        assert_eq!(session.get(), None);
        session.clear();
        assert_eq!(session, SessionState::default());
    }

    #[test]
    fn empty_value_reads_as_none() {
        let mut session = SessionState::new();
        session.set("");
        assert_eq!(session.get(), None);
    }
}
