/// Prefix marking a token as a flag for the deploy command.
pub(crate) const FLAG_PREFIX: &str = "--";

/// Command-line tokens split into the entry, deploy flags and ignored tokens.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Invocation {
    /// First token not starting with [`FLAG_PREFIX`].
    pub entry: Option<String>,
    pub flags: Vec<String>,
    pub ignored: Vec<String>,
}

impl Invocation {
    /// Whether `flag` was given before any entry was seen.
    pub fn asks_for(&self, flag: &str) -> bool {
        self.entry.is_none() && self.flags.iter().any(|token| token == flag)
    }
}

/// Flags may appear on either side of the entry; all of them are kept
/// verbatim and in order.
pub(crate) fn split_invocation(tokens: &[String]) -> Invocation {
    let mut invocation = Invocation::default();
    for token in tokens {
        if token.starts_with(FLAG_PREFIX) {
            invocation.flags.push(token.clone());
        } else if invocation.entry.is_none() {
            invocation.entry = Some(token.clone());
        } else {
            invocation.ignored.push(token.clone());
        }
    }
    invocation
}
