/// Words the user clicked during this session, in click order
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    words: Vec<String>,
}

impl Transcript {
    /// Append-only; repeated words are kept
    pub fn push(&mut self, word: impl Into<String>) {
        self.words.push(word.into());
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in click order
    #[cfg(test)]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Words for display, most recently clicked first
    pub fn most_recent_first(&self) -> impl Iterator<Item = &str> {
        self.words.iter().rev().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_order_is_reversed() {
        let mut transcript = Transcript::default();
        transcript.push("duck");
        transcript.push("feet");
        transcript.push("toes");
        transcript.push("duck");

        assert_eq!(transcript.words(), ["duck", "feet", "toes", "duck"]);
        let shown: Vec<&str> = transcript.most_recent_first().collect();
        assert_eq!(shown, ["duck", "toes", "feet", "duck"]);
    }
}
