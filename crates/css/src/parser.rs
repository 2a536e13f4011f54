//! Strict recursive-descent selector parser.
//!
//! ```text
//! selector-list     := complex-selector (',' complex-selector)*
//! complex-selector  := compound-selector (combinator compound-selector)*
//! compound-selector := (type | universal)? (id | class | attribute | pseudo)*
//! combinator        := whitespace | '>' | '>>' | '+' | '~' | '||'
//! ```
//!
//! The raw tokenizer has no notion of combinators or namespace prefixes, so a
//! pre-pass rewrites the stream first: whitespace and combinator delims become
//! [`CssToken::Combinator`], and `ns|name` sequences become
//! [`CssToken::QualifiedName`]. Any error aborts the whole parse.

use std::sync::Arc;

use log::trace;
use smallvec::SmallVec;

use crate::error::{Result, SelectorErrorKind, SelectorParseError};
use crate::selector::{
    AttrOperator, Combinator, ComplexId, ComplexSelector, CompoundId, NamespaceConstraint,
    SelectorArena, SelectorList, SimpleId, SimpleSelector,
};
use crate::specificity::Specificity;
use crate::stream::{EOF, TokenStream};
use crate::token::{CssToken, tokenize};

/// Parse a comma-separated selector list.
pub fn parse(tokens: &[CssToken]) -> Result<SelectorList> {
    let mut parser = Parser::new(tokens)?;
    let members = parser.parse_list()?;
    trace!("parsed selector list with {} member(s)", members.len());
    Ok(SelectorList::new(Arc::new(parser.arena), members))
}

/// Parse exactly one complex selector; a comma is an error.
pub fn parse_single(tokens: &[CssToken]) -> Result<ComplexSelector> {
    let mut parser = Parser::new(tokens)?;
    let id = parser.parse_complex()?;
    if !parser.stream.at_eof() {
        return Err(parser.error(SelectorErrorKind::UnexpectedToken));
    }
    Ok(ComplexSelector::new(Arc::new(parser.arena), id))
}

/// Tokenize and parse a selector list.
pub fn parse_str(input: &str) -> Result<SelectorList> {
    parse(&tokenize(input))
}

/// Tokenize and parse a single complex selector.
pub fn parse_single_str(input: &str) -> Result<ComplexSelector> {
    parse_single(&tokenize(input))
}

// ─────────────────────────────────────────────────────────────────────────────
// Pre-pass
// ─────────────────────────────────────────────────────────────────────────────

/// Rewrite raw tokens into the stream the grammar expects.
fn synthesize(raw: &[CssToken]) -> Result<TokenStream> {
    let (tokens, origins) = mark_combinators_and_prefixes(raw);
    let (tokens, origins) = fuse_qualified_names(tokens, origins)?;
    Ok(TokenStream::with_origins(tokens, origins))
}

/// First pass: combinators and namespace prefixes. Tokens inside function
/// parentheses are pseudo-class arguments and pass through untouched, as does
/// whitespace inside attribute brackets.
fn mark_combinators_and_prefixes(raw: &[CssToken]) -> (Vec<CssToken>, Vec<usize>) {
    let at = |i: usize| raw.get(i).unwrap_or(&EOF);
    let mut out = Vec::with_capacity(raw.len() + 1);
    let mut origins = Vec::with_capacity(raw.len() + 1);
    let mut paren_depth = 0usize;
    let mut in_brackets = false;
    let mut i = 0;

    while i < raw.len() {
        let tok = &raw[i];
        if tok.is_eof() {
            break;
        }

        if paren_depth > 0 {
            match tok {
                CssToken::Function(_) | CssToken::LParen => paren_depth += 1,
                CssToken::RParen => paren_depth -= 1,
                _ => {}
            }
            out.push(tok.clone());
            origins.push(i);
            i += 1;
            continue;
        }

        let (synthesized, width) = match tok {
            CssToken::Whitespace if !in_brackets => {
                let start = i;
                while at(i).is_whitespace() {
                    i += 1;
                }
                let after_separator = matches!(
                    out.last(),
                    None | Some(CssToken::Comma) | Some(CssToken::Combinator(_))
                );
                let before_separator = matches!(
                    at(i),
                    CssToken::EOF
                        | CssToken::Comma
                        | CssToken::Column
                        | CssToken::Delim('>' | '+' | '~')
                );
                if !after_separator && !before_separator {
                    out.push(CssToken::Combinator(Combinator::Descendant));
                    origins.push(start);
                }
                continue;
            }
            CssToken::Delim('>') if !in_brackets => {
                if at(i + 1) == &CssToken::Delim('>') {
                    (CssToken::Combinator(Combinator::Descendant), 2)
                } else {
                    (CssToken::Combinator(Combinator::Child), 1)
                }
            }
            CssToken::Delim('+') if !in_brackets => {
                (CssToken::Combinator(Combinator::NextSibling), 1)
            }
            CssToken::Delim('~') if !in_brackets => {
                (CssToken::Combinator(Combinator::SubsequentSibling), 1)
            }
            CssToken::Column if !in_brackets => (CssToken::Combinator(Combinator::Column), 1),
            CssToken::Ident(prefix) if at(i + 1) == &CssToken::Delim('|') => (
                CssToken::NamespacePrefix(NamespaceConstraint::Prefix(prefix.clone())),
                2,
            ),
            CssToken::Delim('*') if at(i + 1) == &CssToken::Delim('|') => {
                (CssToken::NamespacePrefix(NamespaceConstraint::Any), 2)
            }
            CssToken::Delim('|') => (CssToken::NamespacePrefix(NamespaceConstraint::None), 1),
            other => {
                match other {
                    CssToken::Function(_) | CssToken::LParen => paren_depth = 1,
                    CssToken::LBracket => in_brackets = true,
                    CssToken::RBracket => in_brackets = false,
                    _ => {}
                }
                (other.clone(), 1)
            }
        };
        out.push(synthesized);
        origins.push(i);
        i += width;
    }

    out.push(CssToken::EOF);
    origins.push(i.min(raw.len()));
    (out, origins)
}

/// Second pass: a namespace prefix must be followed directly by a name or `*`.
fn fuse_qualified_names(
    tokens: Vec<CssToken>,
    origins: Vec<usize>,
) -> Result<(Vec<CssToken>, Vec<usize>)> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut out_origins = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().zip(origins).peekable();

    while let Some((tok, origin)) = iter.next() {
        let namespace = match tok {
            CssToken::NamespacePrefix(namespace) => namespace,
            other => {
                out.push(other);
                out_origins.push(origin);
                continue;
            }
        };
        let local_name = match iter.peek() {
            Some((CssToken::Ident(name), _)) => Some(name.clone()),
            Some((CssToken::Delim('*'), _)) => None,
            Some((other, position)) => {
                return Err(SelectorParseError::new(
                    SelectorErrorKind::MissingLocalName,
                    other.clone(),
                    *position,
                ));
            }
            None => {
                return Err(SelectorParseError::new(
                    SelectorErrorKind::MissingLocalName,
                    CssToken::EOF,
                    origin + 1,
                ));
            }
        };
        iter.next();
        out.push(CssToken::QualifiedName {
            namespace,
            local_name,
        });
        out_origins.push(origin);
    }
    Ok((out, out_origins))
}

// ─────────────────────────────────────────────────────────────────────────────
// Grammar
// ─────────────────────────────────────────────────────────────────────────────

struct Parser {
    stream: TokenStream,
    arena: SelectorArena,
}

impl Parser {
    fn new(tokens: &[CssToken]) -> Result<Self> {
        Ok(Self {
            stream: synthesize(tokens)?,
            arena: SelectorArena::new(),
        })
    }

    /// Error at the current token.
    fn error(&self, kind: SelectorErrorKind) -> SelectorParseError {
        SelectorParseError::new(kind, self.stream.next().clone(), self.stream.position())
    }

    /// `UnexpectedEof` at the end of input, `UnexpectedToken` elsewhere.
    fn unexpected(&self) -> SelectorParseError {
        if self.stream.at_eof() {
            self.error(SelectorErrorKind::UnexpectedEof)
        } else {
            self.error(SelectorErrorKind::UnexpectedToken)
        }
    }

    fn parse_list(&mut self) -> Result<SmallVec<[ComplexId; 1]>> {
        let mut members = SmallVec::new();
        loop {
            members.push(self.parse_complex()?);
            match self.stream.next() {
                CssToken::EOF => return Ok(members),
                CssToken::Comma => self.stream.advance(1),
                _ => return Err(self.error(SelectorErrorKind::UnexpectedToken)),
            }
        }
    }

    fn parse_complex(&mut self) -> Result<ComplexId> {
        if matches!(self.stream.next(), CssToken::EOF | CssToken::Comma) {
            return Err(self.error(SelectorErrorKind::EmptySelector));
        }

        let mut specificity = Specificity::ZERO;
        let mut ancestors = Vec::new();
        loop {
            let compound = self.parse_compound(&mut specificity)?;
            let &CssToken::Combinator(combinator) = self.stream.next() else {
                return Ok(self.arena.alloc_complex(ancestors, compound, specificity));
            };
            let dangling = self.error(SelectorErrorKind::DanglingCombinator);
            self.stream.advance(1);
            if matches!(self.stream.next(), CssToken::EOF | CssToken::Comma) {
                return Err(dangling);
            }
            ancestors.push((compound, combinator));
        }
    }

    fn parse_compound(&mut self, specificity: &mut Specificity) -> Result<CompoundId> {
        let mut simples: SmallVec<[SimpleId; 4]> = SmallVec::new();

        if let Some(simple) = self.parse_type_or_universal()? {
            *specificity += Specificity::of_simple(&simple);
            simples.push(self.arena.alloc_simple(simple));
        }

        loop {
            let simple = match self.stream.next() {
                CssToken::Hash { value, is_id: true } => {
                    let id = SimpleSelector::Id(value.clone());
                    self.stream.advance(1);
                    id
                }
                CssToken::Delim('.') => {
                    self.stream.advance(1);
                    let CssToken::Ident(class) = self.stream.next() else {
                        return Err(self.unexpected());
                    };
                    let class = SimpleSelector::Class(class.clone());
                    self.stream.advance(1);
                    class
                }
                CssToken::LBracket => self.parse_attribute()?,
                CssToken::Colon => self.parse_pseudo()?,
                CssToken::Function(_) => {
                    return Err(self.error(SelectorErrorKind::UnexpectedFunction));
                }
                // Type and universal selectors may only lead a compound.
                CssToken::Ident(_) | CssToken::QualifiedName { .. } | CssToken::Delim('*') => {
                    return Err(self.error(SelectorErrorKind::UnexpectedToken));
                }
                _ => break,
            };
            *specificity += Specificity::of_simple(&simple);
            simples.push(self.arena.alloc_simple(simple));
        }

        if simples.is_empty() {
            return Err(self.unexpected());
        }
        Ok(self.arena.alloc_compound(simples))
    }

    fn parse_type_or_universal(&mut self) -> Result<Option<SimpleSelector>> {
        let simple = match self.stream.next() {
            CssToken::Ident(name) => SimpleSelector::Type {
                namespace: NamespaceConstraint::Default,
                local_name: name.to_ascii_lowercase(),
            },
            CssToken::QualifiedName {
                namespace,
                local_name: Some(name),
            } => SimpleSelector::Type {
                namespace: namespace.clone(),
                local_name: name.to_ascii_lowercase(),
            },
            CssToken::QualifiedName {
                namespace,
                local_name: None,
            } => SimpleSelector::Universal {
                namespace: namespace.clone(),
            },
            CssToken::Delim('*') => SimpleSelector::Universal {
                namespace: NamespaceConstraint::Default,
            },
            _ => return Ok(None),
        };
        self.stream.advance(1);
        // `*div` or `div*`: a second name with no `|` between them.
        if matches!(self.stream.next(), CssToken::Ident(_) | CssToken::Delim('*')) {
            return Err(self.error(SelectorErrorKind::ExpectedNamespaceSeparator));
        }
        Ok(Some(simple))
    }

    fn parse_attribute(&mut self) -> Result<SimpleSelector> {
        use SelectorErrorKind::{
            InvalidAttributeOperator, InvalidAttributeValue, MissingLocalName,
            UnterminatedAttribute,
        };

        self.stream.advance(1); // '['
        self.stream.skip_whitespace();

        let (namespace, name) = match self.stream.next() {
            CssToken::Ident(name) => (NamespaceConstraint::Default, name.to_ascii_lowercase()),
            CssToken::QualifiedName {
                namespace,
                local_name: Some(name),
            } => (namespace.clone(), name.to_ascii_lowercase()),
            CssToken::QualifiedName {
                local_name: None, ..
            } => return Err(self.error(MissingLocalName)),
            CssToken::EOF => return Err(self.error(UnterminatedAttribute)),
            _ => return Err(self.error(SelectorErrorKind::UnexpectedToken)),
        };
        self.stream.advance(1);
        self.stream.skip_whitespace();

        let operator = match self.stream.next() {
            CssToken::RBracket => {
                self.stream.advance(1);
                return Ok(SimpleSelector::Attribute {
                    namespace,
                    name,
                    operator: AttrOperator::Exists,
                    value: String::new(),
                });
            }
            CssToken::Delim('=') => AttrOperator::Equals,
            CssToken::IncludeMatch => AttrOperator::Includes,
            CssToken::DashMatch => AttrOperator::DashMatch,
            CssToken::PrefixMatch => AttrOperator::Prefix,
            CssToken::SuffixMatch => AttrOperator::Suffix,
            CssToken::SubstringMatch => AttrOperator::Substring,
            CssToken::EOF => return Err(self.error(UnterminatedAttribute)),
            _ => return Err(self.error(InvalidAttributeOperator)),
        };
        self.stream.advance(1);
        self.stream.skip_whitespace();

        let value = match self.stream.next() {
            CssToken::Ident(value) | CssToken::String(value) => value.clone(),
            CssToken::EOF => return Err(self.error(UnterminatedAttribute)),
            _ => return Err(self.error(InvalidAttributeValue)),
        };
        self.stream.advance(1);
        self.stream.skip_whitespace();

        if !self.stream.eat(&CssToken::RBracket) {
            return Err(self.error(UnterminatedAttribute));
        }
        Ok(SimpleSelector::Attribute {
            namespace,
            name,
            operator,
            value,
        })
    }

    fn parse_pseudo(&mut self) -> Result<SimpleSelector> {
        self.stream.advance(1); // ':'
        let is_element = self.stream.eat(&CssToken::Colon);

        let (name, arguments) = match self.stream.next() {
            CssToken::Ident(name) => {
                let name = name.to_ascii_lowercase();
                self.stream.advance(1);
                (name, None)
            }
            CssToken::Function(name) => {
                let name = name.to_ascii_lowercase();
                self.stream.advance(1);
                (name, Some(self.consume_arguments()?))
            }
            _ => return Err(self.unexpected()),
        };

        Ok(if is_element {
            SimpleSelector::PseudoElement { name, arguments }
        } else {
            SimpleSelector::PseudoClass { name, arguments }
        })
    }

    /// Collect tokens up to the `)` that closes the current function, with
    /// surrounding whitespace trimmed. Nested parentheses stay balanced.
    fn consume_arguments(&mut self) -> Result<Vec<CssToken>> {
        let mut arguments = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.stream.next() {
                CssToken::EOF => {
                    return Err(self.error(SelectorErrorKind::UnterminatedFunction));
                }
                CssToken::RParen if depth == 0 => {
                    self.stream.advance(1);
                    break;
                }
                CssToken::RParen => depth -= 1,
                CssToken::Function(_) | CssToken::LParen => depth += 1,
                _ => {}
            }
            arguments.push(self.stream.consume());
        }

        while arguments.last().is_some_and(CssToken::is_whitespace) {
            arguments.pop();
        }
        let leading = arguments.iter().take_while(|t| t.is_whitespace()).count();
        arguments.drain(..leading);
        Ok(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectorErrorKind as Kind;

    fn parse_ok(input: &str) -> SelectorList {
        parse_str(input).unwrap()
    }

    fn single(input: &str) -> ComplexSelector {
        parse_single_str(input).unwrap()
    }

    fn fail(input: &str) -> SelectorParseError {
        parse_str(input).unwrap_err()
    }

    fn simples(sel: &ComplexSelector, step: usize) -> Vec<SimpleSelector> {
        sel.step(step).unwrap().compound.simples().cloned().collect()
    }

    fn type_sel(name: &str) -> SimpleSelector {
        SimpleSelector::Type {
            namespace: NamespaceConstraint::Default,
            local_name: name.into(),
        }
    }

    // -- Structure -------------------------------------------------------------

    #[test]
    fn child_combinator_with_class() {
        let sel = single("ul > li.active");
        assert_eq!(sel.len(), 2);
        let combinators: Vec<_> = sel.steps().map(|s| s.combinator).collect();
        assert_eq!(combinators, vec![Combinator::Child, Combinator::None]);
        assert_eq!(simples(&sel, 0), vec![type_sel("ul")]);
        assert_eq!(
            simples(&sel, 1),
            vec![type_sel("li"), SimpleSelector::Class("active".into())]
        );
        assert_eq!(sel.specificity(), Specificity::new(0, 1, 2));
    }

    #[test]
    fn every_combinator() {
        let sel = single("a b>c + d~e || f >> g");
        let combinators: Vec<_> = sel.steps().map(|s| s.combinator).collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
                Combinator::Column,
                Combinator::Descendant,
                Combinator::None,
            ]
        );
    }

    #[test]
    fn whitespace_collapses_and_is_trimmed() {
        let list = parse_ok("  div \t\n  p  ,   span  ");
        assert_eq!(list.len(), 2);
        assert_eq!(list.to_string(), "div p, span");
    }

    #[test]
    fn selector_list_members() {
        let list = parse_ok("h1, h2.title, #main");
        assert_eq!(list.len(), 3);
        let specs: Vec<_> = list.iter().map(|s| s.specificity()).collect();
        assert_eq!(
            specs,
            vec![
                Specificity::new(0, 0, 1),
                Specificity::new(0, 1, 1),
                Specificity::new(1, 0, 0),
            ]
        );
        assert_eq!(list.max_specificity(), Specificity::new(1, 0, 0));
    }

    #[test]
    fn case_folding() {
        let sel = single("DIV#Main.Big:HOVER");
        assert_eq!(
            simples(&sel, 0),
            vec![
                type_sel("div"),
                SimpleSelector::Id("Main".into()),
                SimpleSelector::Class("Big".into()),
                SimpleSelector::PseudoClass {
                    name: "hover".into(),
                    arguments: None
                },
            ]
        );
    }

    #[test]
    fn display_is_canonical() {
        for (input, expected) in [
            ("ul   >  li", "ul > li"),
            ("a>>b", "a b"),
            ("*|*", "*|*"),
            ("a||b", "a || b"),
            ("[ href ]", "[href]"),
            ("[lang|=en]", "[lang|=\"en\"]"),
            (":nth-child( 2n+1 )", ":nth-child(2n+1)"),
            ("p::before", "p::before"),
        ] {
            assert_eq!(single(input).to_string(), expected, "input {input:?}");
        }
    }

    // -- Namespaces ------------------------------------------------------------

    #[test]
    fn namespace_forms() {
        let cases = [
            (
                "svg|rect",
                SimpleSelector::Type {
                    namespace: NamespaceConstraint::Prefix("svg".into()),
                    local_name: "rect".into(),
                },
            ),
            (
                "*|rect",
                SimpleSelector::Type {
                    namespace: NamespaceConstraint::Any,
                    local_name: "rect".into(),
                },
            ),
            (
                "|rect",
                SimpleSelector::Type {
                    namespace: NamespaceConstraint::None,
                    local_name: "rect".into(),
                },
            ),
            (
                "svg|*",
                SimpleSelector::Universal {
                    namespace: NamespaceConstraint::Prefix("svg".into()),
                },
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(simples(&single(input), 0), vec![expected], "input {input:?}");
        }
    }

    #[test]
    fn prefix_without_local_name() {
        let err = fail("svg|");
        assert_eq!(err.kind, Kind::MissingLocalName);
        assert_eq!(err.token, CssToken::EOF);

        let err = fail("svg| rect");
        assert_eq!(err.kind, Kind::MissingLocalName);
        assert_eq!(err.position, 2);
    }

    #[test]
    fn missing_separator() {
        assert_eq!(fail("*div").kind, Kind::ExpectedNamespaceSeparator);
        assert_eq!(fail("div*").kind, Kind::ExpectedNamespaceSeparator);
    }

    // -- Attributes ------------------------------------------------------------

    #[test]
    fn attribute_operators() {
        let cases = [
            ("[a]", AttrOperator::Exists, ""),
            ("[a=b]", AttrOperator::Equals, "b"),
            ("[a~=b]", AttrOperator::Includes, "b"),
            ("[a|=b]", AttrOperator::DashMatch, "b"),
            ("[a^=b]", AttrOperator::Prefix, "b"),
            ("[a$=b]", AttrOperator::Suffix, "b"),
            ("[a*=b]", AttrOperator::Substring, "b"),
            ("[ a = \"b c\" ]", AttrOperator::Equals, "b c"),
        ];
        for (input, operator, value) in cases {
            let expected = SimpleSelector::Attribute {
                namespace: NamespaceConstraint::Default,
                name: "a".into(),
                operator,
                value: value.into(),
            };
            assert_eq!(simples(&single(input), 0), vec![expected], "input {input:?}");
        }
    }

    #[test]
    fn namespaced_attributes() {
        let sel = single("[xlink|HREF][*|title][|lang]");
        let namespaces: Vec<_> = simples(&sel, 0)
            .into_iter()
            .map(|s| match s {
                SimpleSelector::Attribute {
                    namespace, name, ..
                } => (namespace, name),
                other => panic!("not an attribute: {other:?}"),
            })
            .collect();
        assert_eq!(
            namespaces,
            vec![
                (NamespaceConstraint::Prefix("xlink".into()), "href".into()),
                (NamespaceConstraint::Any, "title".into()),
                (NamespaceConstraint::None, "lang".into()),
            ]
        );
    }

    #[test]
    fn attribute_failures() {
        assert_eq!(fail("[a").kind, Kind::UnterminatedAttribute);
        assert_eq!(fail("[a=b").kind, Kind::UnterminatedAttribute);
        assert_eq!(fail("[a=b c]").kind, Kind::UnterminatedAttribute);
        assert_eq!(fail("[a!b]").kind, Kind::InvalidAttributeOperator);
        assert_eq!(fail("[a=]").kind, Kind::InvalidAttributeValue);
        assert_eq!(fail("[a=1]").kind, Kind::InvalidAttributeValue);
        assert_eq!(fail("[*|*]").kind, Kind::MissingLocalName);
        assert_eq!(fail("[.a]").kind, Kind::UnexpectedToken);
    }

    // -- Pseudo-classes and pseudo-elements --------------------------------

    #[test]
    fn pseudo_arguments_are_opaque() {
        let sel = single(":not(.a, (b)) ::SLOTTED(span)");
        let first = simples(&sel, 0);
        let SimpleSelector::PseudoClass {
            name,
            arguments: Some(args),
        } = &first[0]
        else {
            panic!("expected functional pseudo-class, got {first:?}");
        };
        assert_eq!(name, "not");
        assert_eq!(args.first(), Some(&CssToken::Delim('.')));
        assert_eq!(args.last(), Some(&CssToken::RParen));

        assert_eq!(
            simples(&sel, 1),
            vec![SimpleSelector::PseudoElement {
                name: "slotted".into(),
                arguments: Some(vec![CssToken::Ident("span".into())]),
            }]
        );
    }

    #[test]
    fn pseudo_failures() {
        assert_eq!(fail(":nth-child(2n+1").kind, Kind::UnterminatedFunction);
        assert_eq!(fail(":not((a)").kind, Kind::UnterminatedFunction);
        assert_eq!(fail("a:").kind, Kind::UnexpectedEof);
        assert_eq!(fail("a:1").kind, Kind::UnexpectedToken);
        assert_eq!(fail("div foo(x)").kind, Kind::UnexpectedFunction);
    }

    // -- Failure policy ------------------------------------------------------

    #[test]
    fn empty_members() {
        assert_eq!(fail("").kind, Kind::EmptySelector);
        assert_eq!(fail("   ").kind, Kind::EmptySelector);
        assert_eq!(fail("a,").kind, Kind::EmptySelector);
        assert_eq!(fail(",a").kind, Kind::EmptySelector);
        assert_eq!(fail("a,,b").kind, Kind::EmptySelector);
    }

    #[test]
    fn dangling_combinators() {
        let err = fail("a >");
        assert_eq!(err.kind, Kind::DanglingCombinator);
        assert_eq!(err.token, CssToken::Combinator(Combinator::Child));
        assert_eq!(err.position, 2);
        assert_eq!(fail("a + , b").kind, Kind::DanglingCombinator);
        assert_eq!(fail("> a").kind, Kind::UnexpectedToken);
        assert_eq!(fail("a > > b").kind, Kind::UnexpectedToken);
    }

    #[test]
    fn one_bad_member_fails_the_list() {
        let err = fail("a, ]");
        assert_eq!(err.kind, Kind::UnexpectedToken);
        assert_eq!(err.token, CssToken::RBracket);
        assert_eq!(err.position, 3);
    }

    #[test]
    fn misplaced_type_selector() {
        assert_eq!(fail(".a*").kind, Kind::UnexpectedToken);
        assert_eq!(fail("[x]span").kind, Kind::UnexpectedToken);
        assert_eq!(fail("#a#1").kind, Kind::UnexpectedToken);
        assert_eq!(fail(".").kind, Kind::UnexpectedEof);
    }

    #[test]
    fn single_rejects_lists() {
        let err = parse_single_str("a, b").unwrap_err();
        assert_eq!(err.kind, Kind::UnexpectedToken);
        assert_eq!(err.token, CssToken::Comma);
    }

    #[test]
    fn missing_trailing_eof_is_implied() {
        let tokens = vec![
            CssToken::Ident("a".into()),
            CssToken::Delim('.'),
            CssToken::Ident("b".into()),
        ];
        let list = parse(&tokens).unwrap();
        assert_eq!(list.to_string(), "a.b");
    }
}
