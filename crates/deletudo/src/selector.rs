//! Structural-match selectors and the delete-control strategy table.
//!
//! Only the subset of CSS the strategy table needs is understood here: compound
//! selectors made of a tag (or `*`), `#id`, `.class` and attribute predicates,
//! grouped with commas. The browser backend hands the original pattern text to
//! `querySelector`; the parsed form exists so patterns are validated before the
//! first key-press and so the mock DOM can evaluate them natively.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{DeletudoError, DeletudoResult};

/// Delete-control patterns in priority order.
///
/// Earlier entries describe more specific renderings of the toolbar button;
/// the last entry is a broad fallback on tooltip or accessible label.
pub const DEFAULT_DELETE_SELECTORS: &[&str] = &[
    // Main inbox toolbar
    r#".T-I[data-tooltip="Delete"][role="button"]"#,
    // Alternative view
    r#"[role="button"][title*="Delete" i]"#,
    // Mobile view
    r#"[data-tooltip*="delete" i]"#,
    r#"div[role="button"][aria-label*="Delete" i]"#,
    r#"[data-tooltip*="delete" i], [aria-label*="delete" i]"#,
];

/// Read access to an element's tag and attributes, enough to evaluate a
/// [`Selector`].
pub trait AttributeSource {
    /// Tag name, any case
    fn tag_name(&self) -> &str;

    /// Attribute value by name; names are matched case-insensitively
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// Attribute predicate operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrOperator {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals,
    /// `[attr~=value]` - whitespace-separated word
    Includes,
    /// `[attr|=value]` - exact or `value-` prefix
    DashMatch,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr*=value]`
    Substring,
}

/// A single `[...]` predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrPredicate {
    /// Attribute name, lowercased
    pub name: String,
    /// Comparison operator
    pub operator: AttrOperator,
    /// Expected value (empty for [`AttrOperator::Exists`])
    pub value: String,
    /// Whether the ` i` flag was present
    pub case_insensitive: bool,
}

impl AttrPredicate {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        if self.operator == AttrOperator::Exists {
            return true;
        }

        let (actual, expected) = if self.case_insensitive {
            (actual.to_lowercase(), self.value.to_lowercase())
        } else {
            (actual.to_string(), self.value.clone())
        };

        match self.operator {
            AttrOperator::Exists => true,
            AttrOperator::Equals => actual == expected,
            AttrOperator::Includes => {
                !expected.is_empty()
                    && !expected.contains(char::is_whitespace)
                    && actual.split_whitespace().any(|word| word == expected)
            }
            AttrOperator::DashMatch => {
                actual == expected || actual.starts_with(&format!("{expected}-"))
            }
            AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttrOperator::Substring => !expected.is_empty() && actual.contains(&expected),
        }
    }
}

/// A compound selector: everything between two commas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Tag constraint; `None` for `*` or no tag
    pub tag: Option<String>,
    /// `#id` constraint
    pub id: Option<String>,
    /// `.class` constraints
    pub classes: Vec<String>,
    /// `[...]` constraints
    pub attributes: Vec<AttrPredicate>,
}

impl Compound {
    /// Whether `element` satisfies every constraint
    pub fn matches(&self, element: &impl AttributeSource) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if element.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = element.attribute("class").unwrap_or_default();
            if !self
                .classes
                .iter()
                .all(|class| class_attr.split_whitespace().any(|c| c == class.as_str()))
            {
                return false;
            }
        }

        self.attributes
            .iter()
            .all(|predicate| predicate.matches(element.attribute(&predicate.name)))
    }
}

/// A parsed selector group (`a, b, c`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Compound>,
}

impl Selector {
    /// Parse a selector
    pub fn parse(source: &str) -> DeletudoResult<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(DeletudoError::invalid_selector(source, "empty selector"));
        }

        let mut parser = Parser::new(trimmed);
        let mut groups = Vec::new();
        loop {
            groups.push(parser.compound()?);
            parser.skip_whitespace();
            match parser.peek() {
                None => break,
                Some(',') => {
                    parser.bump();
                }
                Some(c) => {
                    return Err(parser.error(format!(
                        "unsupported combinator or token {c:?} at offset {}",
                        parser.pos
                    )));
                }
            }
        }

        Ok(Self {
            source: trimmed.to_string(),
            groups,
        })
    }

    /// The pattern text as given (trimmed)
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compound selectors in this group
    #[must_use]
    pub fn groups(&self) -> &[Compound] {
        &self.groups
    }

    /// Whether any compound in the group matches `element`
    pub fn matches(&self, element: &impl AttributeSource) -> bool {
        self.groups.iter().any(|compound| compound.matches(element))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> DeletudoError {
        DeletudoError::invalid_selector(self.source, message)
    }

    fn expect(&mut self, expected: char) -> DeletudoResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of input"))),
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn required_ident(&mut self, what: &str) -> DeletudoResult<String> {
        let ident = self.ident();
        if ident.is_empty() {
            return Err(self.error(format!("expected {what} at offset {}", self.pos)));
        }
        Ok(ident)
    }

    fn compound(&mut self) -> DeletudoResult<Compound> {
        self.skip_whitespace();
        let start = self.pos;
        let mut compound = Compound::default();

        match self.peek() {
            Some('*') => {
                self.bump();
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.required_ident("id")?);
                }
                Some('.') => {
                    self.bump();
                    let class = self.required_ident("class name")?;
                    compound.classes.push(class);
                }
                Some('[') => {
                    self.bump();
                    let predicate = self.attribute()?;
                    compound.attributes.push(predicate);
                }
                Some(':') => {
                    return Err(self.error("pseudo-classes are not supported"));
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.error(format!("expected selector at offset {}", self.pos)));
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> DeletudoResult<AttrPredicate> {
        self.skip_whitespace();
        let name = self.required_ident("attribute name")?.to_ascii_lowercase();
        self.skip_whitespace();

        let operator = match self.bump() {
            Some(']') => {
                return Ok(AttrPredicate {
                    name,
                    operator: AttrOperator::Exists,
                    value: String::new(),
                    case_insensitive: false,
                });
            }
            Some('=') => AttrOperator::Equals,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.expect('=')?;
                match c {
                    '~' => AttrOperator::Includes,
                    '|' => AttrOperator::DashMatch,
                    '^' => AttrOperator::Prefix,
                    '$' => AttrOperator::Suffix,
                    _ => AttrOperator::Substring,
                }
            }
            Some(c) => return Err(self.error(format!("unexpected {c:?} in attribute selector"))),
            None => return Err(self.error("unterminated attribute selector")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.quoted(quote)?
            }
            _ => self.required_ident("attribute value")?,
        };

        self.skip_whitespace();
        let mut case_insensitive = false;
        match self.peek() {
            Some('i' | 'I') => {
                self.bump();
                case_insensitive = true;
            }
            Some('s' | 'S') => {
                self.bump();
            }
            _ => {}
        }
        self.skip_whitespace();
        self.expect(']')?;

        Ok(AttrPredicate {
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    fn quoted(&mut self, quote: char) -> DeletudoResult<String> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Ordered, non-empty list of delete-control patterns.
///
/// Order is priority: the locator tries entries front to back and the first
/// pattern that matches anything wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorStrategy {
    selectors: Vec<Selector>,
}

impl SelectorStrategy {
    /// Build a strategy from patterns in priority order
    pub fn new<I, S>(patterns: I) -> DeletudoResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selectors = patterns
            .into_iter()
            .map(|pattern| Selector::parse(pattern.as_ref()))
            .collect::<DeletudoResult<Vec<_>>>()?;

        if selectors.is_empty() {
            return Err(DeletudoError::EmptyStrategies);
        }
        Ok(Self { selectors })
    }

    /// Patterns in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }

    /// Number of patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Always false for a constructed strategy
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl Default for SelectorStrategy {
    fn default() -> Self {
        Self {
            selectors: DEFAULT_DELETE_SELECTORS
                .iter()
                .filter_map(|pattern| Selector::parse(pattern).ok())
                .collect(),
        }
    }
}
