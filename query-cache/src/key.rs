use std::borrow::Cow;
use std::fmt;

/// Identifier used to deduplicate and route fetches.
///
/// Keys are usually plain names (`"cart"`, `"orders"`). A host that
/// shares one cache across several users or sessions can partition
/// entries with [`QueryKey::scoped`] so values never bleed between
/// principals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    name: Cow<'static, str>,
    scope: Option<String>,
}

impl QueryKey {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            scope: None,
        }
    }

    /// A key partitioned by a user or session scope.
    pub fn scoped(
        name: impl Into<Cow<'static, str>>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scope: Some(scope.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}@{scope}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::QueryKey;

    #[test]
    fn scoped_keys_are_distinct_from_plain_keys() {
        let plain = QueryKey::new("cart");
        let scoped = QueryKey::scoped("cart", "user-a");
        assert_ne!(plain, scoped);
        assert_ne!(scoped, QueryKey::scoped("cart", "user-b"));
        assert_eq!(plain.to_string(), "cart");
        assert_eq!(scoped.to_string(), "cart@user-a");
    }
}
