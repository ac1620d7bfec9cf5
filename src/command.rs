/// Keyword prefixes that turn a chat message into a movie search.
pub const KEYWORDS: [&str; 4] = ["!movie", "!movies", "!moviebot", "!moviesbot"];

/// A recognised movie search command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub keyword: String,
    pub query: String,
}

impl Command {
    /// Recognise and split a message in one go.
    pub fn parse(text: &str) -> Option<Self> {
        if !is_command(text) {
            return None;
        }
        // A recognised command always starts with "<keyword> ".
        let keyword = text.split(' ').next()?.to_string();
        Some(Self {
            keyword,
            query: extract_query(text),
        })
    }
}

/// True when the message starts with a keyword and a space, followed by a query
/// that is not only whitespace. Matching is case-sensitive.
pub fn is_command(text: &str) -> bool {
    KEYWORDS.into_iter().any(|keyword| {
        text.strip_prefix(keyword)
            .and_then(|rest| rest.strip_prefix(' '))
            .is_some_and(|query| !query.trim().is_empty())
    })
}

/// Drop the first space-separated token and rejoin the rest.
/// Runs of spaces are kept as-is.
pub fn extract_query(text: &str) -> String {
    text.split(' ').skip(1).collect::<Vec<_>>().join(" ")
}
