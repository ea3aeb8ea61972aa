//! Export-time registration of load curves.

use super::block::ParamBlock;
use super::load_curve::LoadCurve;

/// Global list of curves built while preparing an export.
///
/// Registering a curve assigns it the next positive id (1-based) and keeps
/// a snapshot so exporters can write the curve section after the parameters
/// that reference it.
#[derive(Clone, Debug, Default)]
pub struct CurveList {
    curves: Vec<LoadCurve>,
}

impl CurveList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a curve and stamp its id.
    pub fn register(&mut self, curve: &mut LoadCurve) -> i32 {
        let id = self.curves.len() as i32 + 1;
        curve.set_id(id);
        self.curves.push(curve.clone());
        id
    }

    /// Register every attached curve of a block, in parameter order.
    /// Returns the number of curves registered.
    pub fn register_block(&mut self, block: &mut ParamBlock) -> usize {
        let mut n = 0;
        for p in block.iter_mut() {
            if let Some(lc) = p.load_curve_mut() {
                self.register(lc);
                n += 1;
            }
        }
        n
    }

    /// Registered curve by id.
    pub fn get(&self, id: i32) -> Option<&LoadCurve> {
        if id <= 0 {
            return None;
        }
        self.curves.get(id as usize - 1)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LoadCurve> {
        self.curves.iter()
    }

    pub fn clear(&mut self) {
        self.curves.clear();
    }
}
