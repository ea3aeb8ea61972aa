//! Ordered parameter collections.

use super::param::Parameter;
use crate::archive::{IArchive, OArchive};
use crate::util::Result;

/// Insertion-ordered parameters, unique by id.
///
/// Owners append their schema at construction time. Parameters may be
/// rewritten in place afterwards but are never reordered or removed, so an
/// id assigned by [`add`](Self::add) equals the parameter's index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamBlock {
    params: Vec<Parameter>,
}

impl ParamBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, assigning it the next id.
    pub fn add(&mut self, mut param: Parameter) -> &mut Parameter {
        let id = self.params.len() as i32;
        param.set_id(id);
        self.params.push(param);
        let last = self.params.len() - 1;
        &mut self.params[last]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Parameter> {
        self.params.iter_mut()
    }

    /// Parameter at an exposing index.
    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Parameter> {
        self.params.get_mut(index)
    }

    /// Parameter with the given id.
    pub fn by_id(&self, id: i32) -> Option<&Parameter> {
        self.position(id).map(|i| &self.params[i])
    }

    pub fn by_id_mut(&mut self, id: i32) -> Option<&mut Parameter> {
        let i = self.position(id)?;
        Some(&mut self.params[i])
    }

    fn position(&self, id: i32) -> Option<usize> {
        // ids assigned by add() equal indices
        match usize::try_from(id).ok().and_then(|i| self.params.get(i)) {
            Some(p) if p.id() == id => usize::try_from(id).ok(),
            _ => self.params.iter().position(|p| p.id() == id),
        }
    }

    /// Parameter by short name.
    pub fn find(&self, short_name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.short_name() == short_name)
    }

    pub fn find_mut(&mut self, short_name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.short_name() == short_name)
    }
}

impl<'a> IntoIterator for &'a ParamBlock {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Objects that own a parameter block (materials, boundary conditions, ...).
pub trait ParamContainer {
    fn params(&self) -> &ParamBlock;

    fn params_mut(&mut self) -> &mut ParamBlock;

    /// Number of parameters.
    fn parameters(&self) -> usize {
        self.params().len()
    }

    fn param(&self, id: i32) -> Option<&Parameter> {
        self.params().by_id(id)
    }

    fn param_mut(&mut self, id: i32) -> Option<&mut Parameter> {
        self.params_mut().by_id_mut(id)
    }

    fn save_params(&self, ar: &mut OArchive) -> Result<()> {
        self.params().save(ar)
    }

    fn load_params(&mut self, ar: &mut IArchive) -> Result<()> {
        self.params_mut().load(ar)
    }
}

impl ParamContainer for ParamBlock {
    fn params(&self) -> &ParamBlock {
        self
    }

    fn params_mut(&mut self) -> &mut ParamBlock {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamType;

    fn block() -> ParamBlock {
        let mut b = ParamBlock::new();
        b.add(Parameter::float(1.0, "E"));
        b.add(Parameter::float(0.3, "v"));
        b.add(Parameter::bool(false, "active"));
        b
    }

    #[test]
    fn test_ids_follow_insertion() {
        let b = block();
        let ids: Vec<i32> = b.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(b.by_id(1).unwrap().short_name(), "v");
        assert!(b.by_id(7).is_none());
        assert!(b.by_id(-1).is_none());
    }

    #[test]
    fn test_add_returns_live_param() {
        let mut b = ParamBlock::new();
        b.add(Parameter::float(0.0, "k")).make_variable(true);
        assert!(b.get(0).unwrap().is_variable());
    }

    #[test]
    fn test_find_and_rewrite_in_place() {
        let mut b = block();
        b.find_mut("active").unwrap().set_bool(true).unwrap();
        assert_eq!(b.find("active").unwrap().bool_value(), Some(true));
        assert_eq!(b.get(2).unwrap().param_type(), ParamType::Bool);
    }

    #[test]
    fn test_container_trait() {
        let mut b = block();
        assert_eq!(b.parameters(), 3);
        b.param_mut(0).unwrap().set_float(5.0).unwrap();
        assert_eq!(b.param(0).unwrap().float_value(), Some(5.0));
    }
}
