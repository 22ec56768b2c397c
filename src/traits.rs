prelude! {}

/// Object `id=` attribute accessors.
pub trait HasId {
    fn id_slot(&self) -> &Option<String>;
    fn id_slot_mut(&mut self) -> &mut Option<String>;

    fn has_id(&self) -> bool {
        self.id_slot().is_some()
    }
    /// Empty if not set.
    fn id(&self) -> &str {
        self.id_slot().as_deref().unwrap_or("")
    }
    fn set_id(&mut self, id: impl Into<String>) {
        *self.id_slot_mut() = Some(id.into())
    }
    fn clear_id(&mut self) {
        *self.id_slot_mut() = None
    }
}

/// Feature `<name>` and `<visibility>` accessors.
pub trait HasFeatureFields {
    fn name_slot(&self) -> &Option<String>;
    fn name_slot_mut(&mut self) -> &mut Option<String>;
    fn visibility_slot(&self) -> &Option<bool>;
    fn visibility_slot_mut(&mut self) -> &mut Option<bool>;

    fn has_name(&self) -> bool {
        self.name_slot().is_some()
    }
    /// Empty if not set.
    fn name(&self) -> &str {
        self.name_slot().as_deref().unwrap_or("")
    }
    fn set_name(&mut self, name: impl Into<String>) {
        *self.name_slot_mut() = Some(name.into())
    }
    fn clear_name(&mut self) {
        *self.name_slot_mut() = None
    }

    fn has_visibility(&self) -> bool {
        self.visibility_slot().is_some()
    }
    /// Features are visible unless told otherwise.
    fn visibility(&self) -> bool {
        self.visibility_slot().unwrap_or(true)
    }
    fn set_visibility(&mut self, flag: bool) {
        *self.visibility_slot_mut() = Some(flag)
    }
    fn clear_visibility(&mut self) {
        *self.visibility_slot_mut() = None
    }
}
