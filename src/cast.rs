//! Capability-checked views over [`Ctx`] elements.
//!
//! A view is a `Copy` handle borrowing the context. It can only be obtained through the `as_*`
//! functions, which check the element's [`Typ`] against its capability table, so holding a
//! [`Container`] guarantees the element has a child feature list.

prelude! {}

/// Views `idx` as a `<kml>` root.
pub fn as_kml(ctx: &Ctx, idx: idx::Elem) -> Option<Kml<'_>> {
    ctx[idx].typ().is_kml().then_some(Kml { ctx, idx })
}

/// Views `idx` as a feature.
pub fn as_feature(ctx: &Ctx, idx: idx::Elem) -> Option<Feature<'_>> {
    ctx[idx].typ().is_feature().then_some(Feature { ctx, idx })
}

/// Views `idx` as a container.
pub fn as_container(ctx: &Ctx, idx: idx::Elem) -> Option<Container<'_>> {
    ctx[idx].typ().is_container().then_some(Container { ctx, idx })
}

/// A `<kml>` root element.
#[derive(Debug, Clone, Copy)]
pub struct Kml<'ctx> {
    ctx: &'ctx Ctx,
    idx: idx::Elem,
}

impl<'ctx> Kml<'ctx> {
    pub fn idx(&self) -> idx::Elem {
        self.idx
    }
    pub fn elem(&self) -> &'ctx Element {
        &self.ctx[self.idx]
    }

    pub fn has_feature(&self) -> bool {
        !self.elem().features().is_empty()
    }
    pub fn feature(&self) -> Option<Feature<'ctx>> {
        let idx = self.elem().features().first().cloned()?;
        as_feature(self.ctx, idx)
    }
}

/// A feature element.
#[derive(Debug, Clone, Copy)]
pub struct Feature<'ctx> {
    ctx: &'ctx Ctx,
    idx: idx::Elem,
}

impl<'ctx> Feature<'ctx> {
    pub fn idx(&self) -> idx::Elem {
        self.idx
    }
    pub fn elem(&self) -> &'ctx Element {
        &self.ctx[self.idx]
    }
    pub fn typ(&self) -> Typ {
        self.elem().typ()
    }

    pub fn has_id(&self) -> bool {
        self.elem().has_id()
    }
    /// Empty if the feature has no id.
    pub fn id(&self) -> &'ctx str {
        self.elem().id()
    }
    pub fn has_name(&self) -> bool {
        self.elem().has_name()
    }
    pub fn name(&self) -> &'ctx str {
        self.elem().name()
    }
    pub fn visibility(&self) -> bool {
        self.elem().visibility()
    }

    pub fn as_container(&self) -> Option<Container<'ctx>> {
        as_container(self.ctx, self.idx)
    }
}

/// A feature holding an ordered list of child features, `<Document>` or `<Folder>`.
#[derive(Debug, Clone, Copy)]
pub struct Container<'ctx> {
    ctx: &'ctx Ctx,
    idx: idx::Elem,
}

impl<'ctx> Container<'ctx> {
    pub fn idx(&self) -> idx::Elem {
        self.idx
    }
    pub fn elem(&self) -> &'ctx Element {
        &self.ctx[self.idx]
    }
    /// Containers are features.
    pub fn as_feature(&self) -> Feature<'ctx> {
        Feature {
            ctx: self.ctx,
            idx: self.idx,
        }
    }

    pub fn feature_array_size(&self) -> usize {
        self.elem().features().len()
    }
    pub fn feature_array_at(&self, i: usize) -> Option<Feature<'ctx>> {
        let idx = self.elem().features().get(i).cloned()?;
        as_feature(self.ctx, idx)
    }
    /// Child features in insertion order.
    pub fn features(&self) -> impl Iterator<Item = Feature<'ctx>> + 'ctx {
        let ctx = self.ctx;
        self.elem()
            .features()
            .iter()
            .filter_map(move |idx| as_feature(ctx, *idx))
    }
}
