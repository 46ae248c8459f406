//! Selector parsing and matching for the in-memory document.
//!
//! Supports type, universal, `#id`, `.class`, attribute (`[a]`, `=`, `~=`,
//! `^=`, `$=`, `*=`), the pseudo-states the matchers use plus `:enabled`,
//! `:focus`, `:first-child` and `:last-child`, descendant and child
//! combinators, and comma-separated lists.

use super::{Dom, NodeId};
use crate::query::PseudoState;
use crate::result::{ShouldError, ShouldResult};

/// Parsed comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SelectorList(Vec<ComplexSelector>);

#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    parts: Vec<SelectorPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    compound: Compound,
    // Relation to the part on the left.
    combinator: Option<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudos: Vec<PseudoClass>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists(String),
    Compare {
        name: String,
        op: AttrOp,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PseudoClass {
    State(PseudoState),
    Enabled,
    Focus,
    FirstChild,
    LastChild,
}

/// Parse `selector` into a [`SelectorList`].
pub(super) fn parse(selector: &str) -> ShouldResult<SelectorList> {
    let mut cursor = Cursor {
        source: selector,
        chars: selector.chars().collect(),
        pos: 0,
    };
    let mut list = Vec::new();
    loop {
        cursor.skip_ws();
        list.push(cursor.complex()?);
        cursor.skip_ws();
        match cursor.peek() {
            None => break,
            Some(',') => cursor.pos += 1,
            Some(c) => return Err(cursor.error(format!("unexpected {c:?}"))),
        }
    }
    Ok(SelectorList(list))
}

struct Cursor<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn error(&self, message: impl Into<String>) -> ShouldError {
        ShouldError::selector(self.source, message)
    }

    fn complex(&mut self) -> ShouldResult<ComplexSelector> {
        let mut parts = vec![SelectorPart {
            compound: self.compound()?,
            combinator: None,
        }];
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(c) if had_ws && c != ',' => Combinator::Descendant,
                _ => break,
            };
            parts.push(SelectorPart {
                compound: self.compound()?,
                combinator: Some(combinator),
            });
        }
        Ok(ComplexSelector { parts })
    }

    fn compound(&mut self) -> ShouldResult<Compound> {
        let start = self.pos;
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.pos += 1;
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attr()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.pseudos.push(self.pseudo()?);
                }
                _ => break,
            }
        }
        if self.pos == start {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn ident(&mut self) -> ShouldResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attr(&mut self) -> ShouldResult<AttrCondition> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let op = match (self.peek(), self.peek_at(1)) {
            (Some(']'), _) => {
                self.pos += 1;
                return Ok(AttrCondition::Exists(name));
            }
            (Some('='), _) => {
                self.pos += 1;
                AttrOp::Equals
            }
            (Some(c @ ('~' | '^' | '$' | '*')), Some('=')) => {
                self.pos += 2;
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return Err(self.error("malformed attribute selector")),
        };
        self.skip_ws();
        let value = self.attr_value()?;
        self.skip_ws();
        if self.peek() != Some(']') {
            return Err(self.error("unclosed attribute selector"));
        }
        self.pos += 1;
        Ok(AttrCondition::Compare { name, op, value })
    }

    fn attr_value(&mut self) -> ShouldResult<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error("unclosed string"));
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(value)
            }
            _ => self.ident(),
        }
    }

    fn pseudo(&mut self) -> ShouldResult<PseudoClass> {
        let name = self.ident()?.to_ascii_lowercase();
        let pseudo = match name.as_str() {
            "visible" => PseudoClass::State(PseudoState::Visible),
            "hidden" => PseudoClass::State(PseudoState::Hidden),
            "selected" => PseudoClass::State(PseudoState::Selected),
            "checked" => PseudoClass::State(PseudoState::Checked),
            "disabled" => PseudoClass::State(PseudoState::Disabled),
            "empty" => PseudoClass::State(PseudoState::Empty),
            "enabled" => PseudoClass::Enabled,
            "focus" => PseudoClass::Focus,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            _ => return Err(self.error(format!("unsupported pseudo-class :{name}"))),
        };
        Ok(pseudo)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl Dom {
    pub(super) fn matches_selector(&self, node: NodeId, list: &SelectorList) -> bool {
        self.element(node).is_some() && list.0.iter().any(|c| self.matches_complex(node, &c.parts))
    }

    fn matches_complex(&self, node: NodeId, parts: &[SelectorPart]) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches_compound(node, &last.compound) {
            return false;
        }
        match last.combinator {
            None => true,
            Some(Combinator::Child) => self
                .parent_element(node)
                .is_some_and(|parent| self.matches_complex(parent, rest)),
            Some(Combinator::Descendant) => {
                let mut current = self.parent_element(node);
                while let Some(ancestor) = current {
                    if self.matches_complex(ancestor, rest) {
                        return true;
                    }
                    current = self.parent_element(ancestor);
                }
                false
            }
        }
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        if compound
            .tag
            .as_ref()
            .is_some_and(|tag| *tag != element.tag_name)
        {
            return false;
        }
        if compound
            .id
            .as_ref()
            .is_some_and(|id| element.attr("id") != Some(id.as_str()))
        {
            return false;
        }
        if !compound.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        if !compound
            .attrs
            .iter()
            .all(|cond| matches_attr(element.attr_value(cond), cond))
        {
            return false;
        }
        compound.pseudos.iter().all(|pseudo| match pseudo {
            PseudoClass::State(state) => self.is_state(node, *state),
            PseudoClass::Enabled => {
                self.is_form_control(node) && !self.is_state(node, PseudoState::Disabled)
            }
            PseudoClass::Focus => self.active == Some(node),
            PseudoClass::FirstChild => self.element_siblings(node).first() == Some(&node),
            PseudoClass::LastChild => self.element_siblings(node).last() == Some(&node),
        })
    }
}

impl super::Element {
    fn attr_value(&self, cond: &AttrCondition) -> Option<&str> {
        match cond {
            AttrCondition::Exists(name) | AttrCondition::Compare { name, .. } => self.attr(name),
        }
    }
}

fn matches_attr(actual: Option<&str>, cond: &AttrCondition) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match cond {
        AttrCondition::Exists(_) => true,
        AttrCondition::Compare { op, value, .. } => match op {
            AttrOp::Equals => actual == value,
            AttrOp::Includes => actual.split_whitespace().any(|token| token == value),
            AttrOp::Prefix => !value.is_empty() && actual.starts_with(value.as_str()),
            AttrOp::Suffix => !value.is_empty() && actual.ends_with(value.as_str()),
            AttrOp::Substring => !value.is_empty() && actual.contains(value.as_str()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let list = parse("div#main.a.b[data-x='1']:visible").unwrap();
        let part = &list.0[0].parts[0];
        assert_eq!(part.compound.tag.as_deref(), Some("div"));
        assert_eq!(part.compound.id.as_deref(), Some("main"));
        assert_eq!(part.compound.classes, vec!["a", "b"]);
        assert_eq!(part.compound.attrs.len(), 1);
        assert_eq!(
            part.compound.pseudos,
            vec![PseudoClass::State(PseudoState::Visible)]
        );
    }

    #[test]
    fn test_parse_combinators() {
        let list = parse("ul > li a, p").unwrap();
        assert_eq!(list.0.len(), 2);
        let combinators: Vec<_> = list.0[0].parts.iter().map(|p| p.combinator).collect();
        assert_eq!(
            combinators,
            vec![
                None,
                Some(Combinator::Child),
                Some(Combinator::Descendant)
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("div[").is_err());
        assert!(parse("a[href='x]").is_err());
        assert!(parse(":hover").is_err());
        assert!(parse("div >").is_err());
        assert!(parse("div,").is_err());
    }

    #[test]
    fn test_attr_ops() {
        assert!(matches_attr(
            Some("a b c"),
            &AttrCondition::Compare {
                name: "class".into(),
                op: AttrOp::Includes,
                value: "b".into()
            }
        ));
        assert!(!matches_attr(
            Some("abc"),
            &AttrCondition::Compare {
                name: "x".into(),
                op: AttrOp::Prefix,
                value: String::new()
            }
        ));
        assert!(!matches_attr(None, &AttrCondition::Exists("x".into())));
    }
}
