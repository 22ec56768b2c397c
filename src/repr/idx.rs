safe_index::new! {
    /// Element index in a [`Ctx`](crate::ctx::Ctx) arena.
    Elem,
    /// Maps an [`Elem`] to something.
    map: ElemMap,
}
