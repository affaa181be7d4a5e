use std::collections::HashSet;

/// Tokens that close a clause.
pub const DEFAULT_BOUNDARIES: &[&str] = &[",", ";", ":", "que", "y"];

/// Tokens after which a boundary does not close the clause ("lo que",
/// "de que", "es que").
pub const DEFAULT_PREFIXES: &[&str] = &["lo", "de", "es"];

/// One clause and the boundary token that closed it, if any.
pub type Clause = (Vec<String>, Option<String>);

/// Splits a sentence into clauses at boundary tokens so each clause can be
/// translated on its own. Matching ignores case.
#[derive(Debug, Clone)]
pub struct ClauseSplitter {
    boundaries: HashSet<String>,
    prefixes: HashSet<String>,
}

impl Default for ClauseSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNDARIES, DEFAULT_PREFIXES)
    }
}

impl ClauseSplitter {
    pub fn new<B, P>(boundaries: B, prefixes: P) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            boundaries: boundaries.into_iter().map(|b| b.as_ref().to_lowercase()).collect(),
            prefixes: prefixes.into_iter().map(|p| p.as_ref().to_lowercase()).collect(),
        }
    }

    /// Scan left to right. A boundary closes the current clause unless the
    /// token before it is a prefix; a boundary with nothing before it in the
    /// clause is kept as an ordinary token instead of yielding an empty
    /// clause. The last clause has no boundary.
    pub fn split(&self, tokens: &[String]) -> Vec<Clause> {
        let mut clauses = Vec::new();
        let mut buffer: Vec<String> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let after_prefix = i > 0 && self.prefixes.contains(&tokens[i - 1].to_lowercase());
            let is_boundary = self.boundaries.contains(&token.to_lowercase());

            if is_boundary && !after_prefix && !buffer.is_empty() {
                clauses.push((std::mem::take(&mut buffer), Some(token.clone())));
            } else {
                buffer.push(token.clone());
            }
        }

        clauses.push((buffer, None));
        clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn splitter() -> ClauseSplitter {
        ClauseSplitter::new([",", "que", "y"], ["lo", "de", "es"])
    }

    #[test]
    fn test_leading_boundary_folds_into_clause() {
        let clauses = splitter().split(&tokens(&[",", "corre"]));
        assert_eq!(clauses, vec![(tokens(&[",", "corre"]), None)]);
    }

    #[test]
    fn test_split_at_boundary() {
        let clauses = splitter().split(&tokens(&["gato", ",", "corre"]));
        assert_eq!(
            clauses,
            vec![
                (tokens(&["gato"]), Some(",".to_string())),
                (tokens(&["corre"]), None),
            ]
        );
    }

    #[test]
    fn test_prefix_suppresses_boundary() {
        let clauses = splitter().split(&tokens(&["sé", "lo", "que", "quiero"]));
        assert_eq!(clauses, vec![(tokens(&["sé", "lo", "que", "quiero"]), None)]);
    }

    #[test]
    fn test_trailing_boundary_leaves_empty_final_clause() {
        let clauses = splitter().split(&tokens(&["pan", "y"]));
        assert_eq!(
            clauses,
            vec![(tokens(&["pan"]), Some("y".to_string())), (Vec::new(), None)]
        );
    }

    #[test]
    fn test_boundaries_ignore_case() {
        let clauses = splitter().split(&tokens(&["sí", "Que", "no"]));
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].1.as_deref(), Some("Que"));
    }

    #[test]
    fn test_default_tables() {
        let clauses = ClauseSplitter::default().split(&tokens(&["a", ";", "b", ":", "c"]));
        assert_eq!(clauses.len(), 3);
        assert_eq!(ClauseSplitter::default().split(&[]), vec![(Vec::new(), None)]);
    }
}
