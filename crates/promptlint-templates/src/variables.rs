use promptlint_conf::VariableDialect;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde::Serialize;

/// A variable declared for a prompt, as supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableDef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl VariableDef {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            desc: None,
            kind: None,
        }
    }

    #[must_use]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// The variable an expression is rooted at: `user` for `user.name`,
/// `items` for `items[0]`, otherwise the trimmed text itself.
#[must_use]
pub fn resolve_root_variable(inner: &str) -> &str {
    let text = inner.trim();
    if let Some(dot) = text.find('.') {
        &text[..dot]
    } else if let Some(bracket) = text.find('[') {
        &text[..bracket]
    } else {
        text
    }
}

/// `^[A-Za-z][A-Za-z0-9_]{0,max_len-1}$`
#[must_use]
pub fn is_identifier(name: &str, max_len: usize) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && name.len() <= max_len
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Decides whether a root variable name is acceptable under a dialect.
#[derive(Debug, Clone)]
pub struct VariableResolver<'a> {
    declared: FxHashSet<&'a str>,
    dialect: VariableDialect,
    max_len: usize,
}

impl<'a> VariableResolver<'a> {
    #[must_use]
    pub fn new(variables: &'a [VariableDef], dialect: VariableDialect, max_len: usize) -> Self {
        Self {
            declared: variables.iter().map(|var| var.key.as_str()).collect(),
            dialect,
            max_len,
        }
    }

    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        match self.dialect {
            VariableDialect::Normal => is_identifier(name, self.max_len),
            VariableDialect::VariableBound => self.is_declared(name),
        }
    }

    /// Declared keys, deduplicated, longest first.
    pub(crate) fn declared_keys(&self) -> Vec<&'a str> {
        let mut keys: Vec<&'a str> = self.declared.iter().copied().collect();
        keys.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        keys
    }
}
