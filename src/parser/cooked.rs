use log::{debug, trace, warn};
use xmlparser::{ElementEnd, StrSpan, Stream, TextPos, Token};

prelude! {
    parser::helpers,
}
use crate::prelude::res::Error as PrError;

/// Maximum nesting depth of features below the root element.
pub const MAX_FEATURE_DEPTH: usize = 100;

/// A user friendly entry-point to this module functionality
pub fn parse<'input>(input: &'input str, ctx: &mut Ctx) -> WalkResult<'input, ()> {
    let mut walker = KmlWalker::new(input);
    walker.start_visit(ctx)
}

#[derive(Debug)]
pub enum Error<'stream> {
    NoMoreTokens,
    NoRootElement,
    LexingError {
        inner: xmlparser::Error,
    },
    UnexpectedToken {
        textpos: TextPos,
        expected: &'static str,
        found: &'stream str,
    },
    MismatchedClose {
        textpos: TextPos,
        expected: String,
        found: &'stream str,
    },
    TooDeep {
        textpos: TextPos,
        limit: usize,
    },
    PreludeError {
        inner: PrError,
        textpos: TextPos,
    },
}

/// Span of the source text a token comes from.
fn token_span<'a>(token: &Token<'a>) -> StrSpan<'a> {
    match token {
        Token::Declaration { span, .. }
        | Token::ProcessingInstruction { span, .. }
        | Token::Comment { span, .. }
        | Token::DtdStart { span, .. }
        | Token::EmptyDtd { span, .. }
        | Token::EntityDeclaration { span, .. }
        | Token::DtdEnd { span, .. }
        | Token::ElementStart { span, .. }
        | Token::Attribute { span, .. }
        | Token::ElementEnd { span, .. }
        | Token::Cdata { span, .. } => *span,
        Token::Text { text, .. } => *text,
    }
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

#[derive(Debug)]
pub struct OwningError {
    pub msg: String,
    pub position: Option<TextPos>,
}

impl<'stream> Error<'stream> {
    pub fn into_owning(self) -> OwningError {
        let msg;
        let position;
        match self {
            Error::NoMoreTokens => {
                msg = "Premature end of file".into();
                position = None
            }
            Error::NoRootElement => {
                msg = "Document has no root element".into();
                position = None
            }
            Error::LexingError { inner } => {
                msg = format!("There was an error lexing the XML: {inner}.");
                position = None
            }
            Error::UnexpectedToken {
                textpos,
                expected,
                found,
            } => {
                msg = format!("Unexpected token \"{found}\". Expected: {expected}.");
                position = Some(textpos)
            }
            Error::MismatchedClose {
                textpos,
                expected,
                found,
            } => {
                msg = format!("Closing tag \"{found}\" does not match opening tag <{expected}>.");
                position = Some(textpos)
            }
            Error::TooDeep { textpos, limit } => {
                msg = format!("Features are nested deeper than {limit} levels.");
                position = Some(textpos)
            }
            Error::PreludeError { inner, textpos } => {
                msg = format!("{inner}");
                position = Some(textpos)
            }
        }
        OwningError { msg, position }
    }
}

impl Display for OwningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(textpos) => {
                let col = textpos.col;
                let row = textpos.row;
                write!(f, "Line {}, Col {}: {}", row, col, self.msg)
            }
            None => write!(f, "{}", self.msg),
        }
    }
}

impl From<xmlparser::Error> for Error<'_> {
    fn from(inner: xmlparser::Error) -> Self {
        Error::LexingError { inner }
    }
}

pub type WalkResult<'a, T> = Result<T, Error<'a>>;

/// Walks the tokens of a KML document and populates a [`Ctx`].
///
/// Only `<kml>`, features, and the `id`/`<name>`/`<visibility>` of features are recorded,
/// everything else is checked for well-formedness and skipped.
pub struct KmlWalker<'a> {
    inner: xmlparser::Tokenizer<'a>,
    /// Used to turn token offsets into text positions.
    stream: Stream<'a>,
}

impl<'a> KmlWalker<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: xmlparser::Tokenizer::from(input),
            stream: Stream::from(input),
        }
    }

    fn textpos(&self, span: StrSpan<'a>) -> TextPos {
        self.stream.gen_text_pos_from(span.start())
    }

    fn unexpected_token(&self, tkn: &Token<'a>, expected: &'static str) -> Error<'a> {
        let span = token_span(tkn);
        Error::UnexpectedToken {
            textpos: self.textpos(span),
            expected,
            found: span.as_str(),
        }
    }

    fn prelude_error(&self, inner: PrError, span: StrSpan<'a>) -> Error<'a> {
        Error::PreludeError {
            inner,
            textpos: self.textpos(span),
        }
    }

    fn next_token(&mut self) -> WalkResult<'a, Token<'a>> {
        let tkn = self.inner.next().ok_or(Error::NoMoreTokens)??;
        Ok(tkn)
    }

    /// Next token that is not a comment, a processing instruction or blank text.
    fn next_markup(&mut self) -> WalkResult<'a, Token<'a>> {
        loop {
            let tkn = self.next_token()?;
            match tkn {
                Token::Comment { .. } | Token::ProcessingInstruction { .. } => continue,
                Token::Text { text, .. } if text.as_str().trim().is_empty() => continue,
                _ => return Ok(tkn),
            }
        }
    }

    pub fn start_visit(&mut self, ctx: &mut Ctx) -> WalkResult<'a, ()> {
        loop {
            let tkn = match self.next_markup() {
                Ok(tkn) => tkn,
                Err(Error::NoMoreTokens) => return Err(Error::NoRootElement),
                Err(e) => return Err(e),
            };
            match tkn {
                Token::Declaration { .. }
                | Token::DtdStart { .. }
                | Token::EmptyDtd { .. }
                | Token::EntityDeclaration { .. }
                | Token::DtdEnd { .. } => continue,
                Token::ElementStart { prefix, local, .. } => {
                    let root = self.walk_element(ctx, prefix, local, 0)?;
                    debug!("document root is {}", ctx[root].desc());
                    ctx.set_root(root);
                    break;
                }
                _ => return Err(self.unexpected_token(&tkn, "root element")),
            }
        }
        match self.next_markup() {
            Err(Error::NoMoreTokens) => Ok(()),
            Ok(tkn) => Err(self.unexpected_token(&tkn, "end of file")),
            Err(e) => Err(e),
        }
    }

    /// Consumes the attributes of a start tag, feeding them to `on_attr`.
    ///
    /// Returns `true` if the element has content, `false` if it was an empty element `<.../>`.
    fn walk_attributes(
        &mut self,
        mut on_attr: impl FnMut(StrSpan<'a>, StrSpan<'a>, StrSpan<'a>),
    ) -> WalkResult<'a, bool> {
        loop {
            let tkn = self.next_token()?;
            match tkn {
                Token::Attribute {
                    prefix,
                    local,
                    value,
                    ..
                } => on_attr(prefix, local, value),
                Token::ElementEnd {
                    end: ElementEnd::Open,
                    ..
                } => return Ok(true),
                Token::ElementEnd {
                    end: ElementEnd::Empty,
                    ..
                } => return Ok(false),
                _ => {
                    return Err(self.unexpected_token(&tkn, "attribute, > or /> in start tag"))
                }
            }
        }
    }

    fn check_close(
        &self,
        (prefix, local): (StrSpan<'a>, StrSpan<'a>),
        (close_prefix, close_local): (StrSpan<'a>, StrSpan<'a>),
        span: StrSpan<'a>,
    ) -> WalkResult<'a, ()> {
        if prefix.as_str() == close_prefix.as_str() && local.as_str() == close_local.as_str() {
            Ok(())
        } else {
            Err(Error::MismatchedClose {
                textpos: self.textpos(span),
                expected: qualified(prefix.as_str(), local.as_str()),
                found: span.as_str(),
            })
        }
    }

    /// Walks an element whose start tag was just read, and registers it in `ctx`.
    fn walk_element(
        &mut self,
        ctx: &mut Ctx,
        prefix: StrSpan<'a>,
        local: StrSpan<'a>,
        depth: usize,
    ) -> WalkResult<'a, idx::Elem> {
        let typ = Typ::from_xml_name(prefix.as_str(), local.as_str());
        let idx = match typ {
            Typ::Other => ctx.create_other(qualified(prefix.as_str(), local.as_str())),
            typ => ctx.create(typ),
        };
        let has_content = self.walk_attributes(|a_prefix, a_local, value| {
            if typ != Typ::Other && a_prefix.as_str().is_empty() && a_local.as_str() == "id" {
                ctx[idx].set_id(helpers::unescape(value.as_str()));
            } else {
                trace!(
                    "skipping attribute `{}` of {}",
                    qualified(a_prefix.as_str(), a_local.as_str()),
                    ctx[idx].desc(),
                )
            }
        })?;
        if has_content {
            self.walk_content(ctx, idx, (prefix, local), depth)?;
        }
        Ok(idx)
    }

    /// Walks the children of `idx` up to and including its closing tag.
    ///
    /// `depth` is the nesting depth of `idx`, the root element is at depth `0`.
    fn walk_content(
        &mut self,
        ctx: &mut Ctx,
        idx: idx::Elem,
        open: (StrSpan<'a>, StrSpan<'a>),
        depth: usize,
    ) -> WalkResult<'a, ()> {
        let typ = ctx[idx].typ();
        loop {
            let tkn = self.next_markup()?;
            match tkn {
                Token::ElementStart {
                    prefix,
                    local,
                    span,
                    ..
                } => {
                    let child_typ = Typ::from_xml_name(prefix.as_str(), local.as_str());
                    if child_typ.is_feature() && typ.holds_features() {
                        if depth >= MAX_FEATURE_DEPTH {
                            return Err(Error::TooDeep {
                                textpos: self.textpos(span),
                                limit: MAX_FEATURE_DEPTH,
                            });
                        }
                        let child = self.walk_element(ctx, prefix, local, depth + 1)?;
                        self.attach(ctx, idx, child, span)?;
                    } else if typ.is_feature() && local.as_str() == "name" {
                        let name = self.walk_text((prefix, local))?;
                        ctx[idx].set_name(name);
                    } else if typ.is_feature() && local.as_str() == "visibility" {
                        let txt = self.walk_text((prefix, local))?;
                        let flag = helpers::bool(&txt).unwrap_or_else(|| {
                            let pos = self.textpos(span);
                            warn!(
                                "Line {}, Col {}: cannot interpret \"{}\" as a boolean, \
                                 visibility of {} set to false",
                                pos.row,
                                pos.col,
                                txt,
                                ctx[idx].desc(),
                            );
                            false
                        });
                        ctx[idx].set_visibility(flag);
                    } else {
                        if child_typ.is_feature() {
                            warn!(
                                "skipping misplaced {} inside {}",
                                child_typ,
                                ctx[idx].desc()
                            );
                        } else {
                            debug!(
                                "skipping <{}> inside {}",
                                qualified(prefix.as_str(), local.as_str()),
                                ctx[idx].desc()
                            );
                        }
                        self.skip_element((prefix, local))?;
                    }
                }
                Token::ElementEnd {
                    end: ElementEnd::Close(prefix, local),
                    span,
                    ..
                } => {
                    self.check_close(open, (prefix, local), span)?;
                    return Ok(());
                }
                Token::Text { .. } | Token::Cdata { .. } => {
                    debug!("skipping text inside {}", ctx[idx].desc());
                }
                _ => {
                    return Err(self.unexpected_token(&tkn, "child element or closing tag"));
                }
            }
        }
    }

    /// Attaches a freshly parsed feature to its parent.
    fn attach(
        &self,
        ctx: &mut Ctx,
        parent: idx::Elem,
        child: idx::Elem,
        span: StrSpan<'a>,
    ) -> WalkResult<'a, ()> {
        let res = if ctx[parent].typ().is_kml() {
            if let Some(previous) = ctx[parent].features().first() {
                warn!(
                    "{} already has feature {}, replacing it with {}",
                    ctx[parent].desc(),
                    ctx[*previous].desc(),
                    ctx[child].desc(),
                );
            }
            ctx.set_feature(parent, child)
        } else {
            ctx.add_feature(parent, child)
        };
        res.map_err(|inner| self.prelude_error(inner, span))
    }

    /// Reads the text content of a simple element, up to and including its closing tag.
    fn walk_text(&mut self, open: (StrSpan<'a>, StrSpan<'a>)) -> WalkResult<'a, String> {
        let mut txt = String::new();
        if !self.walk_attributes(|_, _, _| ())? {
            return Ok(txt);
        }
        loop {
            let tkn = self.next_token()?;
            match tkn {
                Token::Text { text, .. } => txt.push_str(&helpers::unescape(text.as_str())),
                Token::Cdata { text, .. } => txt.push_str(text.as_str()),
                Token::Comment { .. } | Token::ProcessingInstruction { .. } => continue,
                Token::ElementStart { prefix, local, .. } => {
                    warn!(
                        "skipping <{}> inside simple element <{}>",
                        qualified(prefix.as_str(), local.as_str()),
                        qualified(open.0.as_str(), open.1.as_str()),
                    );
                    self.skip_element((prefix, local))?;
                }
                Token::ElementEnd {
                    end: ElementEnd::Close(prefix, local),
                    span,
                    ..
                } => {
                    self.check_close(open, (prefix, local), span)?;
                    return Ok(txt);
                }
                _ => return Err(self.unexpected_token(&tkn, "text or closing tag")),
            }
        }
    }

    /// Skips an element whose start tag was just read, up to and including its closing tag.
    ///
    /// Open descendants are tracked on a stack so that arbitrarily deep content can be skipped.
    fn skip_element(&mut self, open: (StrSpan<'a>, StrSpan<'a>)) -> WalkResult<'a, ()> {
        if !self.walk_attributes(|_, _, _| ())? {
            return Ok(());
        }
        let mut stack: Vec<(StrSpan<'a>, StrSpan<'a>)> = vec![open];
        while let Some(&current) = stack.last() {
            let tkn = self.next_token()?;
            match tkn {
                Token::ElementStart { prefix, local, .. } => {
                    if self.walk_attributes(|_, _, _| ())? {
                        stack.push((prefix, local))
                    }
                }
                Token::ElementEnd {
                    end: ElementEnd::Close(prefix, local),
                    span,
                    ..
                } => {
                    self.check_close(current, (prefix, local), span)?;
                    stack.pop();
                }
                Token::Text { .. }
                | Token::Cdata { .. }
                | Token::Comment { .. }
                | Token::ProcessingInstruction { .. } => continue,
                _ => return Err(self.unexpected_token(&tkn, "element content")),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(txt: &str) -> Ctx {
        let mut ctx = Ctx::new();
        parse(txt, &mut ctx)
            .map_err(|e| e.into_owning().to_string())
            .unwrap();
        ctx
    }
    fn parse_err(txt: &str) -> String {
        let mut ctx = Ctx::new();
        parse(txt, &mut ctx).unwrap_err().into_owning().to_string()
    }

    #[test]
    fn kml_with_nested_containers() {
        let ctx = parse_ok(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <!-- a comment -->
  <Document id="doc">
    <name>My &amp; doc</name>
    <Style id="s"><IconStyle><scale>1.1</scale></IconStyle></Style>
    <Folder id="f1">
      <visibility>0</visibility>
      <Placemark id="p1"><Point><coordinates>1,2,0</coordinates></Point></Placemark>
      <Placemark id="p2"/>
    </Folder>
    <Placemark><name><![CDATA[<raw>]]></name></Placemark>
  </Document>
</kml>
"#,
        );
        let kml = ctx.as_kml(ctx.root().unwrap()).expect("root is kml");
        let doc = kml.feature().expect("kml has a feature");
        assert_eq!(doc.id(), "doc");
        assert_eq!(doc.name(), "My & doc");
        assert!(doc.visibility());

        let doc = doc.as_container().unwrap();
        assert_eq!(doc.feature_array_size(), 2);
        let folder = doc.feature_array_at(0).unwrap();
        assert_eq!(folder.id(), "f1");
        assert!(!folder.visibility());
        let ids: Vec<&str> = folder
            .as_container()
            .unwrap()
            .features()
            .map(|f| f.id())
            .collect();
        assert_eq!(ids, vec!["p1", "p2"]);

        let last = doc.feature_array_at(1).unwrap();
        assert!(!last.has_id());
        assert_eq!(last.name(), "<raw>");
    }

    #[test]
    fn bare_feature_root() {
        let ctx = parse_ok(r#"<Placemark id="pm"><name>x</name></Placemark>"#);
        let root = ctx.as_feature(ctx.root().unwrap()).unwrap();
        assert_eq!(root.typ(), Typ::Placemark);
        assert_eq!(root.id(), "pm");
    }

    #[test]
    fn other_root_is_skipped() {
        let ctx = parse_ok(r#"<Point><coordinates>1,2</coordinates></Point>"#);
        let root = ctx.root().unwrap();
        assert_eq!(ctx[root].typ(), Typ::Other);
        assert_eq!(ctx[root].xml_name(), "Point");
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn kml_keeps_last_feature() {
        let ctx = parse_ok(r#"<kml><Placemark id="a"/><Folder id="b"/></kml>"#);
        let kml = ctx.as_kml(ctx.root().unwrap()).unwrap();
        assert_eq!(kml.feature().map(|f| f.id()), Some("b"));
    }

    #[test]
    fn prefixes() {
        let ctx = parse_ok(
            r#"<kml:kml xmlns:kml="http://www.opengis.net/kml/2.2" xmlns:gx="http://www.google.com/kml/ext/2.2">
                <kml:Folder><gx:Tour id="t"/><Tour id="not-a-tour"/></kml:Folder>
            </kml:kml>"#,
        );
        let kml = ctx.as_kml(ctx.root().unwrap()).unwrap();
        let folder = kml.feature().unwrap().as_container().unwrap();
        assert_eq!(folder.feature_array_size(), 1);
        assert_eq!(folder.feature_array_at(0).map(|f| f.typ()), Some(Typ::Tour));
    }

    #[test]
    fn misplaced_feature_is_skipped() {
        let ctx = parse_ok(r#"<Placemark id="a"><Placemark id="b"/></Placemark>"#);
        let root = ctx.root().unwrap();
        assert!(ctx[root].features().is_empty());
    }

    #[test]
    fn errors() {
        assert_eq!(parse_err(""), "Document has no root element");
        assert_eq!(
            parse_err(r#"<?xml version="1.0"?>"#),
            "Document has no root element"
        );
        assert!(parse_err("<kml><Folder></kml>").contains("does not match"));
        assert!(!parse_err("<kml>").is_empty());
        let err = parse_err("<Placemark>\n</Folder>");
        assert!(err.starts_with("Line 2, Col 1:"), "{}", err);
        assert!(err.contains("</Folder>"));
        let err = parse_err("<Folder><ExtendedData><a><b></a></b></ExtendedData></Folder>");
        assert!(err.contains("does not match opening tag <b>"), "{}", err);
    }

    #[test]
    fn unknown_visibility_is_false() {
        let ctx = parse_ok(
            r#"<kml><Document id="d"><visibility>True</visibility><Placemark id="p">
                <visibility>maybe</visibility></Placemark></Document></kml>"#,
        );
        let kml = ctx.as_kml(ctx.root().unwrap()).unwrap();
        let doc = kml.feature().unwrap();
        assert_eq!(doc.id(), "d");
        assert!(!doc.visibility());
        let doc = doc.as_container().unwrap();
        let placemark = doc.feature_array_at(0).unwrap();
        assert_eq!(placemark.id(), "p");
        assert!(!placemark.visibility());
    }

    #[test]
    fn deeply_nested_content_is_skipped() {
        let depth = 5000;
        let txt = format!(
            r#"<kml><Placemark id="p"><ExtendedData>{}<y/>{}</ExtendedData><name>n</name></Placemark></kml>"#,
            "<x>".repeat(depth),
            "</x>".repeat(depth),
        );
        let ctx = parse_ok(&txt);
        let kml = ctx.as_kml(ctx.root().unwrap()).unwrap();
        let placemark = kml.feature().unwrap();
        assert_eq!(placemark.id(), "p");
        assert_eq!(placemark.name(), "n");
        // skipped elements are not recorded
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn feature_depth_limit() {
        let nested = |n: usize| format!("{}{}", "<Folder>".repeat(n), "</Folder>".repeat(n));

        let ctx = parse_ok(&nested(MAX_FEATURE_DEPTH + 1));
        assert_eq!(ctx.len(), MAX_FEATURE_DEPTH + 1);

        let err = parse_err(&nested(MAX_FEATURE_DEPTH + 2));
        assert!(
            err.contains(&format!("nested deeper than {} levels", MAX_FEATURE_DEPTH)),
            "{}",
            err
        );
    }
}
