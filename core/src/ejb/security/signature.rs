//! Method signatures and descriptor method patterns.
//!
//! A [`MethodSignature`] names one concrete business method. A
//! [`MethodPattern`] is what a descriptor entry binds to: every method of the
//! bean (`*`), every overload of one name, or one exact signature.
//!
//! # Example
//!
//! ```
//! use jacc_ejb_security_core::ejb::security::{MethodPattern, MethodSignature, Specificity};
//!
//! let lookup = MethodSignature::new("lookup", &["java.lang.String"]);
//!
//! assert!(MethodPattern::all().matches(&lookup));
//! assert!(MethodPattern::named("lookup").matches(&lookup));
//! assert_eq!(MethodPattern::exact(lookup.clone()).specificity(), Specificity::Exact);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::ejb::error::LoadError;

/// A concrete business method: name plus ordered parameter type names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSignature {
    name: String,
    params: Vec<String>,
}

impl MethodSignature {
    /// Creates a signature. Parameter type names are normalized.
    pub fn new(name: &str, params: &[&str]) -> Self {
        MethodSignature {
            name: name.trim().to_string(),
            params: params.iter().map(|p| normalize_type_name(p)).collect(),
        }
    }

    /// Signature of a method taking no arguments.
    pub fn no_args(name: &str) -> Self {
        Self::new(name, &[])
    }

    pub fn from_params(name: &str, params: Vec<String>) -> Self {
        MethodSignature {
            name: name.trim().to_string(),
            params: params.iter().map(|p| normalize_type_name(p)).collect(),
        }
    }

    /// An overload of `name` that no bean or exact pattern declares. An
    /// empty name stands for a method no named pattern covers.
    pub(crate) fn undeclared(name: &str) -> Self {
        MethodSignature {
            name: name.to_string(),
            params: vec!["?".to_string()],
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(","))
    }
}

/// Parses `name(type1,type2)`. A bare `name` parses as a no-arg signature.
impl FromStr for MethodSignature {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || LoadError::InvalidSignature {
            input: s.to_string(),
        };

        let (name, params) = match s.find('(') {
            Some(open) => {
                let close = s.rfind(')').ok_or_else(invalid)?;
                if close < open || !s[close + 1..].trim().is_empty() {
                    return Err(invalid());
                }
                (&s[..open], parse_param_list(&s[open + 1..close]))
            }
            None => (s, Vec::new()),
        };

        let name = name.trim();
        if name.is_empty() || name == "*" || name.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(MethodSignature {
            name: name.to_string(),
            params,
        })
    }
}

/// How precisely a descriptor entry names a method.
///
/// Ordered so that a larger value wins when several entries of one category
/// match the same method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Specificity {
    /// `*` - every method of the bean.
    Bean = 1,
    /// A method name, any overload.
    Name = 2,
    /// Name plus parameter list.
    Exact = 3,
}

/// The method selector of a descriptor entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodPattern {
    AllMethods,
    Named(String),
    Exact(MethodSignature),
}

impl MethodPattern {
    pub fn all() -> Self {
        MethodPattern::AllMethods
    }

    pub fn named(name: &str) -> Self {
        MethodPattern::Named(name.trim().to_string())
    }

    pub fn exact(signature: MethodSignature) -> Self {
        MethodPattern::Exact(signature)
    }

    /// Builds a pattern from a descriptor method element.
    ///
    /// `*` selects every method regardless of parameters. A name without a
    /// parameter list selects every overload; an explicitly empty list selects
    /// the no-arg overload only.
    pub fn from_element(name: &str, params: Option<&[String]>) -> Self {
        let name = name.trim();
        if name == "*" {
            return MethodPattern::AllMethods;
        }
        match params {
            None => MethodPattern::named(name),
            Some(params) => MethodPattern::Exact(MethodSignature::from_params(
                name,
                params.iter().flat_map(|p| parse_param_list(p)).collect(),
            )),
        }
    }

    pub fn specificity(&self) -> Specificity {
        match self {
            MethodPattern::AllMethods => Specificity::Bean,
            MethodPattern::Named(_) => Specificity::Name,
            MethodPattern::Exact(_) => Specificity::Exact,
        }
    }

    pub fn matches(&self, method: &MethodSignature) -> bool {
        match self {
            MethodPattern::AllMethods => true,
            MethodPattern::Named(name) => name == method.get_name(),
            MethodPattern::Exact(signature) => signature == method,
        }
    }

    /// The signature of an exact pattern.
    pub fn as_signature(&self) -> Option<&MethodSignature> {
        match self {
            MethodPattern::Exact(signature) => Some(signature),
            _ => None,
        }
    }
}

impl fmt::Display for MethodPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodPattern::AllMethods => write!(f, "*"),
            MethodPattern::Named(name) => write!(f, "{}", name),
            MethodPattern::Exact(signature) => write!(f, "{}", signature),
        }
    }
}

/// Selects the entries whose pattern matches `method` at the highest specificity.
///
/// Returns `None` when nothing matches. Entries tied at the winning
/// specificity are all returned, in input order.
pub(crate) fn best_matches<'a, T>(
    entries: impl IntoIterator<Item = (&'a MethodPattern, T)>,
    method: &MethodSignature,
) -> Option<(Specificity, Vec<T>)> {
    let mut best: Option<(Specificity, Vec<T>)> = None;

    for (pattern, item) in entries {
        if !pattern.matches(method) {
            continue;
        }
        let specificity = pattern.specificity();
        match &mut best {
            Some((current, items)) if *current >= specificity => {
                if *current == specificity {
                    items.push(item);
                }
            }
            slot => *slot = Some((specificity, vec![item])),
        }
    }

    best
}

/// Splits a descriptor parameter list into normalized type names.
///
/// Tokens are separated by commas or whitespace. Blanks around array brackets
/// and generic arguments are dropped first, so `char [ ] [ ]` is one token.
pub fn parse_param_list(list: &str) -> Vec<String> {
    let mut compact = String::with_capacity(list.len());
    let mut skip_blanks = false;

    for c in list.chars() {
        if c.is_whitespace() {
            if !skip_blanks {
                compact.push(' ');
            }
            continue;
        }
        if matches!(c, '[' | ']' | '<' | '>') {
            let trimmed = compact.trim_end().len();
            compact.truncate(trimmed);
        }
        skip_blanks = matches!(c, '[' | '<' | ',');
        compact.push(c);
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in compact.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && (c == ',' || c == ' ') {
            if !current.is_empty() {
                tokens.push(normalize_type_name(&current));
                current.clear();
            }
            continue;
        }
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(normalize_type_name(&current));
    }

    tokens
}

/// Normalizes one parameter type name.
///
/// Whitespace is removed and JVM internal array names are rewritten to
/// source form: `[Ljava.lang.String;` becomes `java.lang.String[]`, `[[I`
/// becomes `int[][]`.
pub fn normalize_type_name(name: &str) -> String {
    let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();

    let dims = compact.chars().take_while(|&c| c == '[').count();
    if dims == 0 || dims == compact.len() {
        return compact;
    }

    let element = &compact[dims..];
    let base = match element {
        "B" => "byte".to_string(),
        "C" => "char".to_string(),
        "D" => "double".to_string(),
        "F" => "float".to_string(),
        "I" => "int".to_string(),
        "J" => "long".to_string(),
        "S" => "short".to_string(),
        "Z" => "boolean".to_string(),
        _ => match element
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
        {
            Some(class) => class.to_string(),
            None => return compact,
        },
    };

    format!("{}{}", base, "[]".repeat(dims))
}
