/// Selection affordance attached to a reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyMarkup {
    /// Plain text; leave any visible selection list alone.
    None,
    /// Offer the given options as a one-tap selection list.
    Select(SelectList),
    /// Remove a previously offered selection list.
    Clear,
}

/// One-choice-per-row selection list (used by `/remove`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectList {
    pub options: Vec<String>,
}

impl SelectList {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}
