//! Element arena.
//!
//! [`Ctx`] owns every element of a document and acts as the element factory: elements are created
//! parentless with [`Ctx::create`] and friends, then attached to a container with
//! [`Ctx::add_feature`] or to a `<kml>` root with [`Ctx::set_feature`]. Elements are never
//! removed from the arena, detaching one just leaves it parentless.
//!
//! Read-only, capability-checked access goes through the [`cast`] views.

prelude! {}

/// Element arena and factory.
///
/// # Examples
///
/// ```rust
/// # kmlwalk::prelude! {}
/// let mut ctx = Ctx::new();
/// let folder = ctx.create_folder();
/// let placemark = ctx.create_placemark();
/// ctx[placemark].set_id("pm123");
/// ctx.add_feature(folder, placemark).expect("attaching failed");
///
/// let folder = ctx.as_container(folder).expect("folders are containers");
/// assert_eq!(folder.feature_array_size(), 1);
/// assert_eq!(folder.feature_array_at(0).map(|f| f.id()), Some("pm123"));
/// ```
#[derive(Debug, Clone)]
pub struct Ctx {
    elems: idx::ElemMap<Element>,
    root: Option<idx::Elem>,
}

impl std::ops::Index<idx::Elem> for Ctx {
    type Output = Element;
    fn index(&self, idx: idx::Elem) -> &Self::Output {
        &self.elems[idx]
    }
}
impl std::ops::IndexMut<idx::Elem> for Ctx {
    fn index_mut(&mut self, idx: idx::Elem) -> &mut Self::Output {
        &mut self.elems[idx]
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new()
    }
}

/// ## Constructors
impl Ctx {
    pub fn with_capacity(elem_capa: usize) -> Self {
        Self {
            elems: idx::ElemMap::with_capacity(elem_capa),
            root: None,
        }
    }
    pub fn new() -> Self {
        Self::with_capacity(7)
    }

    /// Parses a KML document.
    ///
    /// The root of the resulting context is the root XML element, whatever its type.
    pub fn parse(txt: impl AsRef<str>) -> Res<Self> {
        let txt = txt.as_ref();
        // rough guess, one element per hundred bytes
        let mut slf = Self::with_capacity(txt.len() / 100 + 1);
        parser::cooked::parse(txt, &mut slf).with_context("parsing failed")?;
        slf.finalize();
        Ok(slf)
    }

    /// Shrinks all internal storage.
    pub fn finalize(&mut self) {
        let indices: Vec<idx::Elem> = self.elem_indices().collect();
        for idx in indices {
            self[idx].shrink_to_fit()
        }
    }
}

/// ## Factory
impl Ctx {
    /// Creates a new parentless element.
    pub fn create(&mut self, typ: Typ) -> idx::Elem {
        let idx = self.elems.push_idx(|idx| Element::new(idx, typ));
        log::trace!("created {}", self[idx].desc());
        idx
    }
    /// Creates a new parentless element of a type this crate does not model.
    pub fn create_other(&mut self, xml_name: impl Into<String>) -> idx::Elem {
        let idx = self.elems.push_idx(|idx| Element::new_other(idx, xml_name));
        log::trace!("created {}", self[idx].desc());
        idx
    }

    pub fn create_kml(&mut self) -> idx::Elem {
        self.create(Typ::Kml)
    }
    pub fn create_document(&mut self) -> idx::Elem {
        self.create(Typ::Document)
    }
    pub fn create_folder(&mut self) -> idx::Elem {
        self.create(Typ::Folder)
    }
    pub fn create_placemark(&mut self) -> idx::Elem {
        self.create(Typ::Placemark)
    }
}

/// ## Tree building
impl Ctx {
    /// Checks that `feature` can become a child of `parent`.
    fn check_attach(&self, parent: idx::Elem, feature: idx::Elem) -> Res<()> {
        let elem = &self[feature];
        if !elem.typ().is_feature() {
            bail!(@capability("feature") elem.desc())
        }
        if elem.parent().is_some() {
            bail!(@attached elem.desc())
        }
        // `feature` has no parent, a cycle can only happen if it is an ancestor of `parent`
        let mut current = Some(parent);
        while let Some(idx) = current {
            if idx == feature {
                bail!(@cycle elem.desc())
            }
            current = self[idx].parent();
        }
        Ok(())
    }

    /// Appends `feature` at the end of `container`'s feature list.
    pub fn add_feature(&mut self, container: idx::Elem, feature: idx::Elem) -> Res<()> {
        if !self[container].typ().is_container() {
            bail!(@capability("container") self[container].desc())
        }
        self.check_attach(container, feature)
            .context(|| format!("trying to add a feature to {}", self[container].desc()))?;
        self[container].push_feature(feature);
        self[feature].set_parent(Some(container));
        Ok(())
    }

    /// Sets the feature of a `<kml>` element, detaching the previous one if any.
    pub fn set_feature(&mut self, kml: idx::Elem, feature: idx::Elem) -> Res<()> {
        if !self[kml].typ().is_kml() {
            bail!(@capability("kml root") self[kml].desc())
        }
        self.check_attach(kml, feature)
            .context(|| format!("trying to set the feature of {}", self[kml].desc()))?;
        for previous in self[kml].take_features() {
            log::debug!(
                "{} replaces {} as the feature of {}",
                self[feature].desc(),
                self[previous].desc(),
                self[kml].desc(),
            );
            self[previous].set_parent(None);
        }
        self[kml].push_feature(feature);
        self[feature].set_parent(Some(kml));
        Ok(())
    }

    /// Detaches the feature of a `<kml>` element, if any.
    pub fn clear_feature(&mut self, kml: idx::Elem) -> Res<Option<idx::Elem>> {
        if !self[kml].typ().is_kml() {
            bail!(@capability("kml root") self[kml].desc())
        }
        let previous = self[kml].take_features();
        for idx in previous.iter() {
            self[*idx].set_parent(None);
        }
        Ok(previous.first().cloned())
    }

    pub fn set_root(&mut self, root: idx::Elem) {
        self.root = Some(root)
    }
    pub fn root(&self) -> Option<idx::Elem> {
        self.root
    }
}

/// ## Accessors
impl Ctx {
    pub fn len(&self) -> usize {
        self.elems.len()
    }
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }
    pub fn elems(&self) -> &idx::ElemMap<Element> {
        &self.elems
    }
    pub fn elem_indices<'me>(&'me self) -> impl Iterator<Item = idx::Elem> + 'me {
        self.elems.indices()
    }

    pub fn as_kml(&self, idx: idx::Elem) -> Option<Kml<'_>> {
        cast::as_kml(self, idx)
    }
    pub fn as_feature(&self, idx: idx::Elem) -> Option<Feature<'_>> {
        cast::as_feature(self, idx)
    }
    pub fn as_container(&self, idx: idx::Elem) -> Option<Container<'_>> {
        cast::as_container(self, idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_feature_keeps_order() {
        let mut ctx = Ctx::new();
        let folder = ctx.create_folder();
        let kids: Vec<_> = (0..3).map(|_| ctx.create_placemark()).collect();
        for kid in kids.iter() {
            ctx.add_feature(folder, *kid).unwrap();
        }
        assert_eq!(ctx[folder].features(), &kids[..]);
        for kid in kids {
            assert_eq!(ctx[kid].parent(), Some(folder));
        }
    }

    #[test]
    fn add_feature_rejects_misuse() {
        let mut ctx = Ctx::new();
        let folder = ctx.create_folder();
        let placemark = ctx.create_placemark();
        let kml = ctx.create_kml();

        // placemarks are not containers
        let err = ctx.add_feature(placemark, folder).unwrap_err();
        assert!(err.to_string().contains("is not a container"));
        // kml is not a feature
        let err = ctx.add_feature(folder, kml).unwrap_err();
        assert!(err.to_string().contains("is not a feature"));

        ctx.add_feature(folder, placemark).unwrap();
        let other = ctx.create_document();
        let err = ctx.add_feature(other, placemark).unwrap_err();
        assert!(err.to_string().contains("already has a parent"));
        // failed attempts leave the tree untouched
        assert!(ctx[other].features().is_empty());
        assert_eq!(ctx[placemark].parent(), Some(folder));
    }

    #[test]
    fn add_feature_rejects_cycles() {
        let mut ctx = Ctx::new();
        let outer = ctx.create_folder();
        let inner = ctx.create_folder();
        ctx.add_feature(outer, inner).unwrap();

        let err = ctx.add_feature(inner, outer).unwrap_err();
        assert!(err.to_string().contains("would create a cycle"));
        let err = ctx.add_feature(inner, inner).unwrap_err();
        assert!(err.to_string().contains("already has a parent"));
        let lonely = ctx.create_folder();
        let err = ctx.add_feature(lonely, lonely).unwrap_err();
        assert!(err.to_string().contains("would create a cycle"));
    }

    #[test]
    fn set_feature_replaces() {
        let mut ctx = Ctx::new();
        let kml = ctx.create_kml();
        let first = ctx.create_placemark();
        let second = ctx.create_folder();

        ctx.set_feature(kml, first).unwrap();
        ctx.set_feature(kml, second).unwrap();
        assert_eq!(ctx[kml].features(), &[second]);
        assert_eq!(ctx[first].parent(), None);
        assert_eq!(ctx[second].parent(), Some(kml));

        assert_eq!(ctx.clear_feature(kml).unwrap(), Some(second));
        assert!(ctx[kml].features().is_empty());
        assert_eq!(ctx[second].parent(), None);
        assert_eq!(ctx.clear_feature(kml).unwrap(), None);

        let folder = ctx.create_folder();
        assert!(ctx.set_feature(folder, first).is_err());

        // only `<kml>` has a single feature to clear
        ctx.add_feature(folder, first).unwrap();
        let err = ctx.clear_feature(folder).unwrap_err();
        assert!(err.to_string().contains("is not a kml root"));
        assert_eq!(ctx[folder].features(), &[first]);
        assert_eq!(ctx[first].parent(), Some(folder));
    }

    #[test]
    fn element_indices() {
        let mut ctx = Ctx::new();
        let folder = ctx.create_folder();
        let other = ctx.create_other("gx:Track");
        assert_eq!(ctx[folder].idx(), folder);
        assert_eq!(ctx[other].idx(), other);
        assert_eq!(ctx[other].typ(), Typ::Other);
        assert_eq!(ctx[other].desc(), format!("gx:Track #{}", other));
    }

    #[test]
    fn field_accessors() {
        let mut ctx = Ctx::new();
        let pm = ctx.create_placemark();
        let placemark = &mut ctx[pm];
        assert!(!placemark.has_id() && !placemark.has_name() && !placemark.has_visibility());
        assert_eq!(placemark.id(), "");
        assert!(placemark.visibility());

        placemark.set_id("pm123");
        placemark.set_name("hi");
        placemark.set_visibility(false);
        assert_eq!(placemark.id(), "pm123");
        assert_eq!(placemark.name(), "hi");
        assert!(!placemark.visibility());

        placemark.clear_id();
        placemark.clear_name();
        placemark.clear_visibility();
        assert!(!placemark.has_id() && !placemark.has_name() && !placemark.has_visibility());
        assert!(placemark.visibility());
    }
}
