//! Feature hierarchy walk.
//!
//! The root feature of a KML document is the feature of its `<kml>` element, or the root element
//! itself if it is a feature. [`visit_feature`] prints one line per feature in pre-order:
//!
//! ```text
//! some other Feature id = doc
//!   Placemark id = pm1
//!   some other Feature id = folder
//!     Placemark id = pm2
//! ```

use std::io::Write;

prelude! {}

/// Indentation of one depth level.
pub const INDENT: &str = "  ";

/// Result of [`walk_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Number of features visited, including the root feature.
    Visited(usize),
    /// The document is a fragment, it has no root feature.
    NoRootFeature,
}

/// Root feature of a document, if any.
///
/// # Examples
///
/// ```rust
/// # kmlwalk::prelude! {}
/// let mut ctx = Ctx::new();
/// let kml = ctx.create_kml();
/// assert!(walk::get_root_feature(&ctx, Some(kml)).is_none());
///
/// let doc = ctx.create_document();
/// ctx.set_feature(kml, doc).unwrap();
/// let root = walk::get_root_feature(&ctx, Some(kml)).map(|f| f.idx());
/// assert_eq!(root, Some(doc));
/// assert_eq!(walk::get_root_feature(&ctx, Some(doc)).map(|f| f.idx()), Some(doc));
/// assert!(walk::get_root_feature(&ctx, None).is_none());
/// ```
pub fn get_root_feature(ctx: &Ctx, root: Option<idx::Elem>) -> Option<Feature<'_>> {
    let root = root?;
    if let Some(kml) = ctx.as_kml(root) {
        return kml.feature();
    }
    ctx.as_feature(root)
}

/// Label printed for a feature type.
pub fn feature_label(typ: Typ) -> &'static str {
    if typ == Typ::Placemark {
        "Placemark"
    } else {
        "some other Feature"
    }
}

/// Prints `feature` at `depth`, then its children if it is a container.
///
/// Returns the number of features visited.
pub fn visit_feature(out: &mut impl Write, feature: Feature, depth: usize) -> io::Result<usize> {
    for _ in 0..depth {
        out.write_all(INDENT.as_bytes())?;
    }
    writeln!(out, "{} id = {}", feature_label(feature.typ()), feature.id())?;
    let mut count = 1;
    if let Some(container) = feature.as_container() {
        count += walk_container(out, container, depth + 1)?;
    }
    Ok(count)
}

/// Visits each feature of a container, all at the same `depth`.
pub fn walk_container(out: &mut impl Write, container: Container, depth: usize) -> io::Result<usize> {
    let mut count = 0;
    let size = container.feature_array_size();
    log::trace!("walking {} features of {}", size, container.elem().desc());
    for i in 0..size {
        if let Some(feature) = container.feature_array_at(i) {
            count += visit_feature(out, feature, depth)?;
        }
    }
    Ok(count)
}

/// Walks the feature hierarchy under `root`.
pub fn walk_document(
    out: &mut impl Write,
    ctx: &Ctx,
    root: Option<idx::Elem>,
) -> io::Result<WalkOutcome> {
    match get_root_feature(ctx, root) {
        Some(feature) => visit_feature(out, feature, 0).map(WalkOutcome::Visited),
        None => Ok(WalkOutcome::NoRootFeature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_to_string(ctx: &Ctx, root: Option<idx::Elem>) -> (WalkOutcome, String) {
        let mut out = Vec::new();
        let outcome = walk_document(&mut out, ctx, root).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn container_with_two_leaves() {
        let mut ctx = Ctx::new();
        let folder = ctx.create_folder();
        ctx[folder].set_id("f");
        for id in ["a", "b"] {
            let pm = ctx.create_placemark();
            ctx[pm].set_id(id);
            ctx.add_feature(folder, pm).unwrap();
        }
        let (outcome, out) = walk_to_string(&ctx, Some(folder));
        assert_eq!(outcome, WalkOutcome::Visited(3));
        assert_eq!(
            out,
            "some other Feature id = f\n  Placemark id = a\n  Placemark id = b\n"
        );
    }

    #[test]
    fn depth_follows_nesting() {
        let mut ctx = Ctx::new();
        let kml = ctx.create_kml();
        let doc = ctx.create_document();
        let folder = ctx.create_folder();
        let deep = ctx.create_folder();
        let pm = ctx.create_placemark();
        let sibling = ctx.create_placemark();
        ctx.set_feature(kml, doc).unwrap();
        ctx.add_feature(doc, folder).unwrap();
        ctx.add_feature(folder, deep).unwrap();
        ctx.add_feature(deep, pm).unwrap();
        ctx.add_feature(doc, sibling).unwrap();

        let (outcome, out) = walk_to_string(&ctx, Some(kml));
        assert_eq!(outcome, WalkOutcome::Visited(5));
        let depths: Vec<usize> = out
            .lines()
            .map(|line| (line.len() - line.trim_start().len()) / INDENT.len())
            .collect();
        assert_eq!(depths, vec![0, 1, 2, 3, 1]);
    }

    #[test]
    fn missing_id_prints_empty() {
        let mut ctx = Ctx::new();
        let pm = ctx.create_placemark();
        let (_, out) = walk_to_string(&ctx, Some(pm));
        assert_eq!(out, "Placemark id = \n");
    }

    #[test]
    fn empty_container() {
        let mut ctx = Ctx::new();
        let doc = ctx.create_document();
        let (outcome, out) = walk_to_string(&ctx, Some(doc));
        assert_eq!(outcome, WalkOutcome::Visited(1));
        assert_eq!(out, "some other Feature id = \n");
    }

    #[test]
    fn no_root_feature() {
        let mut ctx = Ctx::new();
        let kml = ctx.create_kml();
        let other = ctx.create_other("Point");
        for root in [None, Some(kml), Some(other)] {
            let (outcome, out) = walk_to_string(&ctx, root);
            assert_eq!(outcome, WalkOutcome::NoRootFeature);
            assert!(out.is_empty());
        }
    }

    #[test]
    fn parsed_document() {
        let ctx = Ctx::parse(
            r#"<kml><Document id="d">
                <Placemark id="p1"/>
                <Folder id="f"><Placemark id="p2"/><NetworkLink id="n"/></Folder>
            </Document></kml>"#,
        )
        .unwrap();
        let (_, out) = walk_to_string(&ctx, ctx.root());
        assert_eq!(
            out,
            "some other Feature id = d\n\
            \x20 Placemark id = p1\n\
            \x20 some other Feature id = f\n\
            \x20   Placemark id = p2\n\
            \x20   some other Feature id = n\n"
        );
    }
}
