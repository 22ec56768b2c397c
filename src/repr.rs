prelude! {}

pub mod idx;
pub mod typ;

pub use typ::{Caps, Typ};

/// Child feature list, most containers are small.
pub type Features = SmallVec<[idx::Elem; 4]>;

/// An element of a KML document.
///
/// Elements live in a [`Ctx`] arena and refer to each other through [`idx::Elem`] indices. Only
/// the fields the feature walk needs are modeled.
///
/// # Invariants
///
/// - `features` is empty unless `typ.holds_features()`
/// - if `typ.is_kml()`, then `features.len() ≤ 1`
/// - every index in `features` points to a feature whose `parent` is `Some(self.idx)`
#[derive(Debug, Clone)]
pub struct Element {
    idx: idx::Elem,
    typ: Typ,
    /// Qualified XML name, only kept for [`Typ::Other`].
    xml_name: Option<String>,
    id: Option<String>,
    name: Option<String>,
    visibility: Option<bool>,
    parent: Option<idx::Elem>,
    features: Features,
}

impl HasId for Element {
    fn id_slot(&self) -> &Option<String> {
        &self.id
    }
    fn id_slot_mut(&mut self) -> &mut Option<String> {
        &mut self.id
    }
}
impl HasFeatureFields for Element {
    fn name_slot(&self) -> &Option<String> {
        &self.name
    }
    fn name_slot_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }
    fn visibility_slot(&self) -> &Option<bool> {
        &self.visibility
    }
    fn visibility_slot_mut(&mut self) -> &mut Option<bool> {
        &mut self.visibility
    }
}

impl Element {
    pub fn new(idx: idx::Elem, typ: Typ) -> Self {
        Self {
            idx,
            typ,
            xml_name: None,
            id: None,
            name: None,
            visibility: None,
            parent: None,
            features: smallvec![],
        }
    }

    /// An element of a type this crate does not model.
    pub fn new_other(idx: idx::Elem, xml_name: impl Into<String>) -> Self {
        let mut slf = Self::new(idx, Typ::Other);
        slf.xml_name = Some(xml_name.into());
        slf
    }

    #[inline]
    pub fn idx(&self) -> idx::Elem {
        self.idx
    }
    #[inline]
    pub fn typ(&self) -> Typ {
        self.typ
    }
    #[inline]
    pub fn caps(&self) -> Caps {
        self.typ.caps()
    }
    #[inline]
    pub fn parent(&self) -> Option<idx::Elem> {
        self.parent
    }
    #[inline]
    pub fn features(&self) -> &[idx::Elem] {
        &self.features
    }

    /// XML name of the element, qualified as it appeared in the source for unmodeled elements.
    pub fn xml_name(&self) -> Cow<'_, str> {
        match &self.xml_name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.typ.to_string()),
        }
    }

    /// Short description used in error messages.
    pub fn desc(&self) -> String {
        format!("{} #{}", self.xml_name(), self.idx)
    }

    pub(crate) fn set_parent(&mut self, parent: Option<idx::Elem>) {
        self.parent = parent
    }
    pub(crate) fn push_feature(&mut self, feature: idx::Elem) {
        debug_assert!(self.typ.holds_features());
        self.features.push(feature)
    }
    /// Removes all child features, returns the removed ones.
    pub(crate) fn take_features(&mut self) -> Features {
        mem::take(&mut self.features)
    }

    pub fn shrink_to_fit(&mut self) {
        // keep this so that we know when a new field is added, and update this thing
        let Self {
            idx: _,
            typ: _,
            xml_name,
            id,
            name,
            visibility: _,
            parent: _,
            features,
        } = self;
        for s in [xml_name, id, name].into_iter().flatten() {
            s.shrink_to_fit()
        }
        features.shrink_to_fit();
    }
}
