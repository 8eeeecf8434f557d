//! Evaluator for the XPath subset used by content locators
//!
//! Supported: absolute location paths made of `/` (child) and `//`
//! (descendant) steps, name tests and `*`, and the predicates
//! `[n]`, `[@attr]`, `[@attr="v"]`, `[contains(@attr, "v")]` and
//! `[text()="v"]`. Anything else fails to parse, which callers treat the
//! same as "no match".

use crate::dom::element::{element_children, self_and_descendants, tag_name};
use dom_query::{NodeId, NodeRef};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    HasAttr(String),
    AttrEquals(String, String),
    AttrContains(String, String),
    TextEquals(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    name: NameTest,
    predicates: Vec<Predicate>,
}

/// A parsed location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPathExpr {
    steps: Vec<Step>,
}

impl XPathExpr {
    /// Parse an expression, `None` when it is malformed or outside the subset
    pub fn parse(expression: &str) -> Option<Self> {
        let mut parser = Parser::new(expression);
        let steps = parser.path()?;
        parser.skip_ws();
        if !parser.at_end() {
            return None;
        }
        Some(Self { steps })
    }

    /// All matching elements in document order, evaluated from the document node
    pub fn evaluate<'a>(&self, document_root: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
        let mut context = vec![document_root.clone()];

        for step in &self.steps {
            let parents: Vec<NodeRef<'a>> = match step.axis {
                Axis::Child => context.clone(),
                Axis::Descendant => {
                    let mut all = Vec::new();
                    let mut seen = HashSet::new();
                    for node in &context {
                        // a seen node had its whole subtree collected with it
                        if seen.contains(&node.id) {
                            continue;
                        }
                        if !node.is_element() {
                            all.push(node.clone());
                        }
                        for candidate in self_and_descendants(node) {
                            if seen.insert(candidate.id) {
                                all.push(candidate);
                            }
                        }
                    }
                    all
                }
            };

            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for parent in &parents {
                let group: Vec<NodeRef<'a>> = element_children(parent)
                    .into_iter()
                    .filter(|child| step.name.matches(child))
                    .collect();

                for matched in apply_predicates(group, &step.predicates) {
                    if seen.insert(matched.id) {
                        next.push(matched);
                    }
                }
            }

            if next.is_empty() {
                return next;
            }
            context = next;
        }

        document_order(document_root, context)
    }

    /// First matching element in document order
    pub fn first<'a>(&self, document_root: &NodeRef<'a>) -> Option<NodeRef<'a>> {
        self.evaluate(document_root).into_iter().next()
    }
}

impl NameTest {
    fn matches(&self, node: &NodeRef) -> bool {
        match self {
            NameTest::Any => node.is_element(),
            NameTest::Named(name) => tag_name(node).is_some_and(|tag| tag.eq_ignore_ascii_case(name)),
        }
    }
}

impl Predicate {
    fn matches(&self, node: &NodeRef) -> bool {
        match self {
            Predicate::Position(_) => true,
            Predicate::HasAttr(name) => node.attr(name).is_some(),
            Predicate::AttrEquals(name, value) => node.attr(name).is_some_and(|v| &*v == value.as_str()),
            Predicate::AttrContains(name, value) => node.attr(name).is_some_and(|v| v.contains(value.as_str())),
            Predicate::TextEquals(value) => node
                .children()
                .iter()
                .any(|child| child.is_text() && &*child.text() == value.as_str()),
        }
    }
}

fn apply_predicates<'a>(mut group: Vec<NodeRef<'a>>, predicates: &[Predicate]) -> Vec<NodeRef<'a>> {
    for predicate in predicates {
        group = match predicate {
            Predicate::Position(position) => group
                .into_iter()
                .nth(position.wrapping_sub(1))
                .into_iter()
                .collect(),
            other => group.into_iter().filter(|node| other.matches(node)).collect(),
        };
    }
    group
}

fn document_order<'a>(document_root: &NodeRef<'a>, nodes: Vec<NodeRef<'a>>) -> Vec<NodeRef<'a>> {
    if nodes.len() < 2 {
        return nodes;
    }
    let wanted: HashSet<NodeId> = nodes.iter().map(|node| node.id).collect();
    self_and_descendants(document_root)
        .into_iter()
        .filter(|candidate| wanted.contains(&candidate.id))
        .collect()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.trim().chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        let len = expected.chars().count();
        let matches = self
            .chars
            .get(self.pos..self.pos + len)
            .is_some_and(|slice| slice.iter().copied().eq(expected.chars()));
        if matches {
            self.pos += len;
        }
        matches
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn path(&mut self) -> Option<Vec<Step>> {
        let mut steps = Vec::new();
        loop {
            self.skip_ws();
            if self.at_end() {
                break;
            }
            if !self.eat('/') {
                return None;
            }
            let axis = if self.eat('/') { Axis::Descendant } else { Axis::Child };
            steps.push(self.step(axis)?);
        }

        if steps.is_empty() { None } else { Some(steps) }
    }

    fn step(&mut self, axis: Axis) -> Option<Step> {
        self.skip_ws();
        let name = if self.eat('*') {
            NameTest::Any
        } else {
            NameTest::Named(self.name()?)
        };

        let mut predicates = Vec::new();
        loop {
            self.skip_ws();
            if !self.eat('[') {
                break;
            }
            self.skip_ws();
            predicates.push(self.predicate()?);
            self.skip_ws();
            if !self.eat(']') {
                return None;
            }
        }

        Some(Step { axis, name, predicates })
    }

    fn predicate(&mut self) -> Option<Predicate> {
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return self.number().map(Predicate::Position);
        }

        if self.eat('@') {
            let attr = self.name()?;
            self.skip_ws();
            if !self.eat('=') {
                return Some(Predicate::HasAttr(attr));
            }
            self.skip_ws();
            return Some(Predicate::AttrEquals(attr, self.literal()?));
        }

        if self.eat_str("contains(") {
            self.skip_ws();
            if !self.eat('@') {
                return None;
            }
            let attr = self.name()?;
            self.skip_ws();
            if !self.eat(',') {
                return None;
            }
            self.skip_ws();
            let value = self.literal()?;
            self.skip_ws();
            if !self.eat(')') {
                return None;
            }
            return Some(Predicate::AttrContains(attr, value));
        }

        if self.eat_str("text()") {
            self.skip_ws();
            if !self.eat('=') {
                return None;
            }
            self.skip_ws();
            return Some(Predicate::TextEquals(self.literal()?));
        }

        None
    }

    fn name(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let valid = if self.pos == start {
                c.is_ascii_alphabetic() || c == '_'
            } else {
                c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
            };
            if !valid {
                break;
            }
            self.pos += 1;
        }

        if self.pos == start {
            None
        } else {
            Some(self.chars[start..self.pos].iter().collect())
        }
    }

    fn number(&mut self) -> Option<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect::<String>().parse().ok()
    }

    fn literal(&mut self) -> Option<String> {
        let quote = self.peek().filter(|c| *c == '"' || *c == '\'')?;
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Some(value);
            }
            self.pos += 1;
        }
        None
    }
}
