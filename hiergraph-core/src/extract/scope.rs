//! Namespace and nesting bookkeeping for declaration walkers.

/// Tracks where a walker currently is: namespace segments plus the chain of
/// enclosing type declarations.
///
/// Implement on a walker struct; the provided methods build `.`-joined names.
pub trait ScopePath {
    /// Namespace segments, outermost first.
    fn namespace_parts(&self) -> &[String];

    /// Names of the type declarations enclosing the current position.
    fn enclosing_types(&self) -> &[String];

    /// The current namespace as a `.` separated string.
    ///
    /// # Example
    /// `["Game", "Core"]` gives `"Game.Core"`.
    fn namespace_path(&self) -> String {
        self.namespace_parts().join(".")
    }

    /// Full name of a type declared at the current position.
    ///
    /// # Example
    /// Namespace `["Game"]`, enclosing `["Outer"]`, name `"Inner"` gives
    /// `"Game.Outer.Inner"`.
    fn qualified_name(&self, name: &str) -> String {
        self.namespace_parts()
            .iter()
            .chain(self.enclosing_types())
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestWalker {
        namespace: Vec<String>,
        enclosing: Vec<String>,
    }

    impl ScopePath for TestWalker {
        fn namespace_parts(&self) -> &[String] {
            &self.namespace
        }

        fn enclosing_types(&self) -> &[String] {
            &self.enclosing
        }
    }

    fn walker(ns: &[&str], enclosing: &[&str]) -> TestWalker {
        TestWalker {
            namespace: ns.iter().map(|s| s.to_string()).collect(),
            enclosing: enclosing.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_global_namespace() {
        let w = walker(&[], &[]);
        assert_eq!(w.namespace_path(), "");
        assert_eq!(w.qualified_name("Player"), "Player");
    }

    #[test]
    fn test_nested_namespace() {
        let w = walker(&["Game", "Core"], &[]);
        assert_eq!(w.namespace_path(), "Game.Core");
        assert_eq!(w.qualified_name("Player"), "Game.Core.Player");
    }

    #[test]
    fn test_nested_type() {
        let w = walker(&["Game"], &["Outer"]);
        assert_eq!(w.namespace_path(), "Game");
        assert_eq!(w.qualified_name("Inner"), "Game.Outer.Inner");
    }
}
