//! Expression evaluation over any [`TreeCursor`].
//!
//! Node-sets are cursor clones. Every location step and union result is put
//! back into document order with [`TreeCursor::compare_position`], so callers
//! always see node-sets sorted and free of duplicates. Predicates count
//! positions along the step's axis, which is backwards for reverse axes.

use std::collections::{HashMap, HashSet};

use bramble_common::MAX_TREE_DEPTH;

use super::ast::{Axis, BinaryOp, Expr, NodeTest, Step};
use super::value::{XPathValue, parse_number};
use crate::cursor::{CursorNodeType, NamespaceScope, TreeCursor};
use crate::error::XPathError;

/// Variable values and namespace prefixes visible to an expression.
#[derive(Debug, Clone)]
pub struct Bindings<C> {
    variables: HashMap<String, XPathValue<C>>,
    namespaces: HashMap<String, String>,
    namespace_scope: NamespaceScope,
}

impl<C> Default for Bindings<C> {
    fn default() -> Self {
        Self {
            variables: HashMap::new(),
            namespaces: HashMap::new(),
            namespace_scope: NamespaceScope::default(),
        }
    }
}

impl<C> Bindings<C> {
    /// No variables and no prefixes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `$name`.
    #[must_use]
    pub fn with_variable(mut self, name: &str, value: XPathValue<C>) -> Self {
        let _ = self.variables.insert(name.to_string(), value);
        self
    }

    /// Bind a prefix used in name tests such as `svg:rect`.
    #[must_use]
    pub fn with_namespace(mut self, prefix: &str, uri: &str) -> Self {
        let _ = self.namespaces.insert(prefix.to_string(), uri.to_string());
        self
    }

    /// Which bindings the `namespace::` axis visits.
    #[must_use]
    pub const fn with_namespace_scope(mut self, scope: NamespaceScope) -> Self {
        self.namespace_scope = scope;
        self
    }

    /// Value of `$name`.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&XPathValue<C>> {
        self.variables.get(name)
    }

    /// URI bound to `prefix`.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Scope of the `namespace::` axis.
    #[must_use]
    pub const fn namespace_scope(&self) -> NamespaceScope {
        self.namespace_scope
    }
}

/// Evaluate `expr` with `context` as the context node.
///
/// # Errors
///
/// Returns [`XPathError`] for unknown functions, wrong argument counts,
/// unbound variables or prefixes, and path operations on non-node-sets.
pub fn evaluate<C: TreeCursor>(
    expr: &Expr,
    context: &C,
    bindings: &Bindings<C>,
) -> Result<XPathValue<C>, XPathError> {
    let focus = Focus {
        node: context.clone(),
        position: 1,
        size: 1,
    };
    Evaluator { bindings }.eval(expr, &focus)
}

/// Sort cursors into document order and drop duplicates.
#[must_use]
pub fn document_order<C: TreeCursor>(mut nodes: Vec<C>) -> Vec<C> {
    nodes.sort_by(C::compare_position);
    nodes.dedup_by(|a, b| a.is_same_position(b));
    nodes
}

struct Focus<C> {
    node: C,
    position: usize,
    size: usize,
}

struct Evaluator<'b, C> {
    bindings: &'b Bindings<C>,
}

#[allow(clippy::cast_precision_loss)]
const fn as_number(n: usize) -> f64 {
    n as f64
}

impl<C: TreeCursor> Evaluator<'_, C> {
    fn eval(&self, expr: &Expr, focus: &Focus<C>) -> Result<XPathValue<C>, XPathError> {
        match expr {
            Expr::Number(n) => Ok(XPathValue::Number(*n)),
            Expr::Literal(s) => Ok(XPathValue::String(s.clone())),
            Expr::Variable(name) => self
                .bindings
                .variable(name)
                .cloned()
                .ok_or_else(|| XPathError::UnboundVariable(name.clone())),
            Expr::Negate(inner) => Ok(XPathValue::Number(-self.eval(inner, focus)?.to_number())),
            Expr::Binary { op, left, right } => self.binary(*op, left, right, focus),
            Expr::Call { name, args } => self.call(name, args, focus),
            Expr::Path { absolute, steps } => {
                let mut start = focus.node.clone();
                if *absolute {
                    start.move_to_root();
                }
                self.steps(vec![start], steps).map(XPathValue::NodeSet)
            }
            Expr::Filter {
                primary,
                predicates,
                steps,
            } => {
                let mut nodes = self.node_set(primary, focus)?;
                for predicate in predicates {
                    nodes = self.filter(nodes, predicate)?;
                }
                self.steps(nodes, steps).map(XPathValue::NodeSet)
            }
            Expr::Union(left, right) => {
                let mut nodes = self.node_set(left, focus)?;
                nodes.extend(self.node_set(right, focus)?);
                Ok(XPathValue::NodeSet(document_order(nodes)))
            }
        }
    }

    fn node_set(&self, expr: &Expr, focus: &Focus<C>) -> Result<Vec<C>, XPathError> {
        match self.eval(expr, focus)? {
            XPathValue::NodeSet(nodes) => Ok(nodes),
            _ => Err(XPathError::NotANodeSet),
        }
    }

    // =========================================================================
    // Location steps
    // =========================================================================

    fn steps(&self, mut nodes: Vec<C>, steps: &[Step]) -> Result<Vec<C>, XPathError> {
        for step in steps {
            let mut selected = Vec::new();
            for node in &nodes {
                let mut candidates = Vec::new();
                for candidate in self.axis(node, step.axis) {
                    if self.matches(&candidate, &step.test, step.axis)? {
                        candidates.push(candidate);
                    }
                }
                for predicate in &step.predicates {
                    candidates = self.filter(candidates, predicate)?;
                }
                selected.extend(candidates);
            }
            nodes = document_order(selected);
        }
        Ok(nodes)
    }

    /// Keep the nodes for which `predicate` holds, positions counted in the
    /// order given.
    fn filter(&self, nodes: Vec<C>, predicate: &Expr) -> Result<Vec<C>, XPathError> {
        let size = nodes.len();
        let mut kept = Vec::new();
        for (index, node) in nodes.into_iter().enumerate() {
            let focus = Focus {
                node,
                position: index + 1,
                size,
            };
            let keep = match self.eval(predicate, &focus)? {
                XPathValue::Number(n) => (n - as_number(focus.position)).abs() < f64::EPSILON,
                other => other.to_boolean(),
            };
            if keep {
                kept.push(focus.node);
            }
        }
        Ok(kept)
    }

    fn axis(&self, node: &C, axis: Axis) -> Vec<C> {
        let mut out = Vec::new();
        match axis {
            Axis::SelfAxis => out.push(node.clone()),
            Axis::Child => children(node, &mut out),
            Axis::Descendant => descendants(node, &mut out),
            Axis::DescendantOrSelf => {
                out.push(node.clone());
                descendants(node, &mut out);
            }
            Axis::Parent => {
                let mut parent = node.clone();
                if parent.move_to_parent() {
                    out.push(parent);
                }
            }
            Axis::Ancestor => ancestors(node, &mut out),
            Axis::AncestorOrSelf => {
                out.push(node.clone());
                ancestors(node, &mut out);
            }
            Axis::FollowingSibling => {
                let mut sibling = node.clone();
                while sibling.move_to_next_sibling() {
                    out.push(sibling.clone());
                }
            }
            Axis::PrecedingSibling => {
                let mut sibling = node.clone();
                while sibling.move_to_previous_sibling() {
                    out.push(sibling.clone());
                }
            }
            Axis::Following => following(node, &mut out),
            Axis::Preceding => preceding(node, &mut out),
            Axis::Attribute => {
                let mut attribute = node.clone();
                if attribute.move_to_first_attribute() {
                    out.push(attribute.clone());
                    while attribute.move_to_next_attribute() {
                        out.push(attribute.clone());
                    }
                }
            }
            Axis::Namespace => {
                let scope = self.bindings.namespace_scope();
                let mut namespace = node.clone();
                if namespace.move_to_first_namespace(scope) {
                    out.push(namespace.clone());
                    while namespace.move_to_next_namespace(scope) {
                        out.push(namespace.clone());
                    }
                }
            }
        }
        out
    }

    fn resolve(&self, prefix: &str) -> Result<&str, XPathError> {
        self.bindings
            .namespace(prefix)
            .ok_or_else(|| XPathError::UnboundPrefix(prefix.to_string()))
    }

    fn matches(&self, node: &C, test: &NodeTest, axis: Axis) -> Result<bool, XPathError> {
        let principal = match axis {
            Axis::Attribute => CursorNodeType::Attribute,
            Axis::Namespace => CursorNodeType::Namespace,
            _ => CursorNodeType::Element,
        };
        let kind = node.node_type();
        Ok(match test {
            NodeTest::Node => true,
            NodeTest::Text => kind == CursorNodeType::Text,
            NodeTest::Comment => kind == CursorNodeType::Comment,
            NodeTest::ProcessingInstruction(target) => {
                kind == CursorNodeType::ProcessingInstruction
                    && target.as_ref().is_none_or(|t| node.local_name() == t.as_str())
            }
            NodeTest::Any => kind == principal,
            NodeTest::AnyInNamespace(prefix) => {
                kind == principal && node.namespace_uri() == self.resolve(prefix)?
            }
            NodeTest::Name {
                prefix: None,
                local,
            } => kind == principal && node.local_name() == local.as_str(),
            NodeTest::Name {
                prefix: Some(prefix),
                local,
            } => {
                kind == principal
                    && node.local_name() == local.as_str()
                    && node.namespace_uri() == self.resolve(prefix)?
            }
        })
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn binary(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        focus: &Focus<C>,
    ) -> Result<XPathValue<C>, XPathError> {
        match op {
            BinaryOp::Or => Ok(XPathValue::Boolean(
                self.eval(left, focus)?.to_boolean() || self.eval(right, focus)?.to_boolean(),
            )),
            BinaryOp::And => Ok(XPathValue::Boolean(
                self.eval(left, focus)?.to_boolean() && self.eval(right, focus)?.to_boolean(),
            )),
            BinaryOp::Eq | BinaryOp::Neq => {
                let (l, r) = (self.eval(left, focus)?, self.eval(right, focus)?);
                let equal = equals(&l, &r, op == BinaryOp::Neq);
                Ok(XPathValue::Boolean(equal))
            }
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
                let (l, r) = (self.eval(left, focus)?, self.eval(right, focus)?);
                Ok(XPathValue::Boolean(relational(op, &l, &r)))
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                let l = self.eval(left, focus)?.to_number();
                let r = self.eval(right, focus)?.to_number();
                Ok(XPathValue::Number(match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    _ => l % r,
                }))
            }
        }
    }

    // =========================================================================
    // Core function library
    // =========================================================================

    fn call(
        &self,
        name: &str,
        args: &[Expr],
        focus: &Focus<C>,
    ) -> Result<XPathValue<C>, XPathError> {
        let arity = |min: usize, max: usize, expected: &'static str| {
            if (min..=max).contains(&args.len()) {
                Ok(())
            } else {
                Err(XPathError::WrongArity {
                    name: name.to_string(),
                    expected,
                    found: args.len(),
                })
            }
        };
        let string = |i: usize| -> Result<String, XPathError> {
            Ok(self.eval(&args[i], focus)?.to_xpath_string())
        };
        let number = |i: usize| -> Result<f64, XPathError> {
            Ok(self.eval(&args[i], focus)?.to_number())
        };
        let string_or_context = || -> Result<String, XPathError> {
            if args.is_empty() {
                Ok(focus.node.value().into_owned())
            } else {
                string(0)
            }
        };
        let node_or_context = || -> Result<Option<C>, XPathError> {
            if args.is_empty() {
                Ok(Some(focus.node.clone()))
            } else {
                Ok(self.node_set(&args[0], focus)?.into_iter().next())
            }
        };

        let value = match name {
            "last" => {
                arity(0, 0, "0")?;
                XPathValue::Number(as_number(focus.size))
            }
            "position" => {
                arity(0, 0, "0")?;
                XPathValue::Number(as_number(focus.position))
            }
            "count" => {
                arity(1, 1, "1")?;
                XPathValue::Number(as_number(self.node_set(&args[0], focus)?.len()))
            }
            "id" => {
                arity(1, 1, "1")?;
                XPathValue::NodeSet(self.id(&args[0], focus)?)
            }
            "local-name" | "namespace-uri" | "name" => {
                arity(0, 1, "0 or 1")?;
                let text = node_or_context()?.map_or_else(String::new, |node| {
                    let part = match name {
                        "local-name" => node.local_name(),
                        "namespace-uri" => node.namespace_uri(),
                        _ => node.name(),
                    };
                    part.into_owned()
                });
                XPathValue::String(text)
            }
            "string" => {
                arity(0, 1, "0 or 1")?;
                XPathValue::String(string_or_context()?)
            }
            "concat" => {
                arity(2, usize::MAX, "2 or more")?;
                let mut out = String::new();
                for i in 0..args.len() {
                    out.push_str(&string(i)?);
                }
                XPathValue::String(out)
            }
            "starts-with" => {
                arity(2, 2, "2")?;
                XPathValue::Boolean(string(0)?.starts_with(string(1)?.as_str()))
            }
            "contains" => {
                arity(2, 2, "2")?;
                XPathValue::Boolean(string(0)?.contains(string(1)?.as_str()))
            }
            "substring-before" => {
                arity(2, 2, "2")?;
                let (s, pattern) = (string(0)?, string(1)?);
                let before = s.split_once(pattern.as_str()).map(|(b, _)| b);
                XPathValue::String(before.unwrap_or_default().to_string())
            }
            "substring-after" => {
                arity(2, 2, "2")?;
                let (s, pattern) = (string(0)?, string(1)?);
                let after = s.split_once(pattern.as_str()).map(|(_, a)| a);
                XPathValue::String(after.unwrap_or_default().to_string())
            }
            "substring" => {
                arity(2, 3, "2 or 3")?;
                let s = string(0)?;
                let start = round(number(1)?);
                let end = if args.len() == 3 {
                    start + round(number(2)?)
                } else {
                    f64::INFINITY
                };
                let text = s
                    .chars()
                    .enumerate()
                    .filter(|&(i, _)| {
                        let p = as_number(i + 1);
                        p >= start && p < end
                    })
                    .map(|(_, c)| c)
                    .collect();
                XPathValue::String(text)
            }
            "string-length" => {
                arity(0, 1, "0 or 1")?;
                XPathValue::Number(as_number(string_or_context()?.chars().count()))
            }
            "normalize-space" => {
                arity(0, 1, "0 or 1")?;
                let s = string_or_context()?;
                let words: Vec<&str> = s.split(is_xml_space).filter(|w| !w.is_empty()).collect();
                XPathValue::String(words.join(" "))
            }
            "translate" => {
                arity(3, 3, "3")?;
                let (s, from, to) = (string(0)?, string(1)?, string(2)?);
                let to: Vec<char> = to.chars().collect();
                let text = s
                    .chars()
                    .filter_map(|c| match from.chars().position(|f| f == c) {
                        Some(i) => to.get(i).copied(),
                        None => Some(c),
                    })
                    .collect();
                XPathValue::String(text)
            }
            "boolean" => {
                arity(1, 1, "1")?;
                XPathValue::Boolean(self.eval(&args[0], focus)?.to_boolean())
            }
            "not" => {
                arity(1, 1, "1")?;
                XPathValue::Boolean(!self.eval(&args[0], focus)?.to_boolean())
            }
            "true" => {
                arity(0, 0, "0")?;
                XPathValue::Boolean(true)
            }
            "false" => {
                arity(0, 0, "0")?;
                XPathValue::Boolean(false)
            }
            "lang" => {
                arity(1, 1, "1")?;
                XPathValue::Boolean(lang_matches(&focus.node, &string(0)?))
            }
            "number" => {
                arity(0, 1, "0 or 1")?;
                if args.is_empty() {
                    XPathValue::Number(parse_number(&focus.node.value()))
                } else {
                    XPathValue::Number(number(0)?)
                }
            }
            "sum" => {
                arity(1, 1, "1")?;
                let nodes = self.node_set(&args[0], focus)?;
                XPathValue::Number(nodes.iter().map(|n| parse_number(&n.value())).sum())
            }
            "floor" => {
                arity(1, 1, "1")?;
                XPathValue::Number(number(0)?.floor())
            }
            "ceiling" => {
                arity(1, 1, "1")?;
                XPathValue::Number(number(0)?.ceil())
            }
            "round" => {
                arity(1, 1, "1")?;
                XPathValue::Number(round(number(0)?))
            }
            unknown => return Err(XPathError::UnknownFunction(unknown.to_string())),
        };
        Ok(value)
    }

    /// Elements whose `id` attribute is one of the whitespace-separated
    /// tokens in the argument.
    fn id(&self, arg: &Expr, focus: &Focus<C>) -> Result<Vec<C>, XPathError> {
        let text = match self.eval(arg, focus)? {
            XPathValue::NodeSet(nodes) => nodes
                .iter()
                .map(|n| n.value().into_owned())
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_xpath_string(),
        };
        let wanted: HashSet<&str> = text.split(is_xml_space).filter(|t| !t.is_empty()).collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let mut root = focus.node.clone();
        root.move_to_root();
        let mut all = Vec::new();
        descendants(&root, &mut all);

        let mut found = Vec::new();
        for element in all {
            if element.node_type() != CursorNodeType::Element {
                continue;
            }
            let mut attribute = element.clone();
            let mut more = attribute.move_to_first_attribute();
            while more {
                if attribute.local_name().eq_ignore_ascii_case("id")
                    && wanted.contains(attribute.value().as_ref())
                {
                    found.push(element.clone());
                    break;
                }
                more = attribute.move_to_next_attribute();
            }
        }
        Ok(found)
    }
}

// =============================================================================
// Axis walks
// =============================================================================

fn children<C: TreeCursor>(node: &C, out: &mut Vec<C>) {
    let mut child = node.clone();
    if child.move_to_first_child() {
        out.push(child.clone());
        while child.move_to_next_sibling() {
            out.push(child.clone());
        }
    }
}

/// Pre-order walk below `node`.
fn descendants<C: TreeCursor>(node: &C, out: &mut Vec<C>) {
    let mut cursor = node.clone();
    if !cursor.move_to_first_child() {
        return;
    }
    let mut depth = 1;
    loop {
        out.push(cursor.clone());
        if depth < MAX_TREE_DEPTH && cursor.move_to_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if cursor.move_to_next_sibling() {
                break;
            }
            if !cursor.move_to_parent() {
                return;
            }
            depth -= 1;
            if depth == 0 {
                return;
            }
        }
    }
}

fn ancestors<C: TreeCursor>(node: &C, out: &mut Vec<C>) {
    let mut cursor = node.clone();
    while out.len() < MAX_TREE_DEPTH && cursor.move_to_parent() {
        out.push(cursor.clone());
    }
}

/// The node itself for tree nodes, the owning element for attributes and
/// namespace nodes.
fn tree_anchor<C: TreeCursor>(node: &C) -> (C, bool) {
    let mut anchor = node.clone();
    let detached = matches!(
        node.node_type(),
        CursorNodeType::Attribute | CursorNodeType::Namespace
    );
    if detached {
        let _ = anchor.move_to_parent();
    }
    (anchor, detached)
}

fn following<C: TreeCursor>(node: &C, out: &mut Vec<C>) {
    let (mut cursor, detached) = tree_anchor(node);
    if detached {
        descendants(&cursor, out);
    }
    for _ in 0..MAX_TREE_DEPTH {
        let mut sibling = cursor.clone();
        while sibling.move_to_next_sibling() {
            out.push(sibling.clone());
            descendants(&sibling, out);
        }
        if !cursor.move_to_parent() {
            break;
        }
    }
}

/// Nearest first.
fn preceding<C: TreeCursor>(node: &C, out: &mut Vec<C>) {
    let (mut cursor, _) = tree_anchor(node);
    for _ in 0..MAX_TREE_DEPTH {
        let mut sibling = cursor.clone();
        while sibling.move_to_previous_sibling() {
            let mut subtree = vec![sibling.clone()];
            descendants(&sibling, &mut subtree);
            out.extend(subtree.into_iter().rev());
        }
        if !cursor.move_to_parent() {
            break;
        }
    }
}

// =============================================================================
// Comparisons
// =============================================================================

#[allow(clippy::float_cmp)]
fn equals<C: TreeCursor>(left: &XPathValue<C>, right: &XPathValue<C>, negate: bool) -> bool {
    let strings_match = |a: &str, b: &str| (a == b) != negate;
    let numbers_match = |a: f64, b: f64| (a == b) != negate;
    match (left, right) {
        (XPathValue::NodeSet(ls), XPathValue::NodeSet(rs)) => ls.iter().any(|l| {
            let lv = l.value();
            rs.iter().any(|r| strings_match(&lv, &r.value()))
        }),
        (XPathValue::NodeSet(ns), XPathValue::Boolean(b))
        | (XPathValue::Boolean(b), XPathValue::NodeSet(ns)) => (!ns.is_empty() == *b) != negate,
        (XPathValue::NodeSet(ns), XPathValue::Number(n))
        | (XPathValue::Number(n), XPathValue::NodeSet(ns)) => {
            ns.iter().any(|node| numbers_match(parse_number(&node.value()), *n))
        }
        (XPathValue::NodeSet(ns), XPathValue::String(s))
        | (XPathValue::String(s), XPathValue::NodeSet(ns)) => {
            ns.iter().any(|node| strings_match(&node.value(), s))
        }
        (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => {
            (left.to_boolean() == right.to_boolean()) != negate
        }
        (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => {
            numbers_match(left.to_number(), right.to_number())
        }
        _ => strings_match(&left.to_xpath_string(), &right.to_xpath_string()),
    }
}

fn relational<C: TreeCursor>(op: BinaryOp, left: &XPathValue<C>, right: &XPathValue<C>) -> bool {
    let holds = |a: f64, b: f64| match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Lte => a <= b,
        BinaryOp::Gt => a > b,
        _ => a >= b,
    };
    let numbers = |value: &XPathValue<C>| -> Vec<f64> {
        match value {
            XPathValue::NodeSet(nodes) => nodes.iter().map(|n| parse_number(&n.value())).collect(),
            other => vec![other.to_number()],
        }
    };
    let bool_side = matches!(left, XPathValue::Boolean(_)) || matches!(right, XPathValue::Boolean(_));
    if bool_side {
        let as_bool = |v: &XPathValue<C>| f64::from(u8::from(v.to_boolean()));
        return holds(as_bool(left), as_bool(right));
    }
    let (ls, rs) = (numbers(left), numbers(right));
    ls.iter().any(|&l| rs.iter().any(|&r| holds(l, r)))
}

// =============================================================================
// Helpers
// =============================================================================

/// Round half up, keeping `NaN` and infinities.
fn round(n: f64) -> f64 {
    if n.is_finite() { (n + 0.5).floor() } else { n }
}

const fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Whether the nearest `xml:lang` or `lang` attribute on the node or an
/// ancestor is `lang` or a sublanguage of it.
fn lang_matches<C: TreeCursor>(node: &C, lang: &str) -> bool {
    let (mut element, _) = tree_anchor(node);
    for _ in 0..MAX_TREE_DEPTH {
        let mut attribute = element.clone();
        let mut more = attribute.move_to_first_attribute();
        while more {
            if attribute.local_name().eq_ignore_ascii_case("lang") {
                let value = attribute.value();
                let sublanguage = value
                    .get(..lang.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(lang))
                    && value[lang.len()..].starts_with('-');
                return sublanguage || value.eq_ignore_ascii_case(lang);
            }
            more = attribute.move_to_next_attribute();
        }
        if !element.move_to_parent() {
            break;
        }
    }
    false
}
