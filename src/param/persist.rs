//! Saving and loading parameter blocks through chunk archives.
//!
//! Each parameter is written as
//!
//! ```text
//! PARAM
//!   PARAM_ID     i32
//!   PARAM_TYPE   i32 tag
//!   PARAM_VALUE  value encoded by tag
//!   LOAD_CURVE   (only when a curve is attached)
//!     LC_INTERPOLATION, LC_EXTEND, LC_POINT...
//! ```
//!
//! Loading reads a temporary [`Parameter`] per `PARAM` chunk and then either
//! hands it to a [`LegacyParamLoader`] (archives before 2.0) or merges it into
//! the live parameter with the same id.

use tracing::{debug, trace, warn};

use super::block::ParamBlock;
use super::load_curve::LoadCurve;
use super::param::Parameter;
use super::value::{ParamType, ParamValue, CURVE_OBSOLETE_TAG};
use crate::archive::{
    IArchive, OArchive, CID_LOAD_CURVE, CID_PARAM, CID_PARAM_ID, CID_PARAM_TYPE, CID_PARAM_VALUE,
};
use crate::util::{Error, Result};

/// Applies one decoded parameter from a pre-2.0 archive.
///
/// Owners whose schema changed since those archives were written supply
/// their own loader to remap ids or convert values.
pub trait LegacyParamLoader {
    fn load_param(&mut self, block: &mut ParamBlock, param: Parameter) -> Result<()>;
}

impl<F> LegacyParamLoader for F
where
    F: FnMut(&mut ParamBlock, Parameter) -> Result<()>,
{
    fn load_param(&mut self, block: &mut ParamBlock, param: Parameter) -> Result<()> {
        self(block, param)
    }
}

/// Default legacy behaviour: assign by id when the id exists.
pub fn assign_by_id(block: &mut ParamBlock, param: Parameter) -> Result<()> {
    if let Some(live) = block.by_id_mut(param.id()) {
        live.assign_from(&param);
    }
    Ok(())
}

/// Type declared by a `PARAM_TYPE` chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StoredType {
    Live(ParamType),
    /// Float whose value chunk holds a load curve.
    CurveObsolete,
}

fn write_value(ar: &mut OArchive, value: &ParamValue) -> Result<()> {
    match value {
        ParamValue::Int(n) | ParamValue::Choice(n) => ar.write_chunk(CID_PARAM_VALUE, n),
        ParamValue::Float(v) => ar.write_chunk(CID_PARAM_VALUE, v),
        ParamValue::Bool(b) => ar.write_chunk(CID_PARAM_VALUE, b),
        ParamValue::Vec3(v) => ar.write_chunk(CID_PARAM_VALUE, v),
        ParamValue::String(s) | ParamValue::Math(s) => ar.write_chunk(CID_PARAM_VALUE, s),
    }
}

fn read_value(ar: &mut IArchive, t: ParamType) -> Result<ParamValue> {
    Ok(match t {
        ParamType::Int => ParamValue::Int(ar.read()?),
        ParamType::Choice => ParamValue::Choice(ar.read()?),
        ParamType::Float => ParamValue::Float(ar.read()?),
        ParamType::Bool => ParamValue::Bool(ar.read()?),
        ParamType::Vec3 => ParamValue::Vec3(ar.read()?),
        ParamType::String => ParamValue::String(ar.read()?),
        ParamType::Math => ParamValue::Math(ar.read()?),
    })
}

/// Write one parameter into the current (`PARAM`) chunk.
pub fn save_param(p: &Parameter, ar: &mut OArchive) -> Result<()> {
    ar.write_chunk(CID_PARAM_ID, &p.id())?;
    ar.write_chunk(CID_PARAM_TYPE, &p.param_type().tag())?;
    write_value(ar, p.value())?;

    if let Some(lc) = p.load_curve() {
        ar.begin_chunk(CID_LOAD_CURVE)?;
        lc.save(ar)?;
        ar.end_chunk()?;
    }
    Ok(())
}

/// Decode the children of the current `PARAM` chunk into a temporary
/// parameter.
///
/// Children may come in any order, but a value can only be decoded once
/// its type is known. Unknown chunks are skipped. Curves with no points are
/// dropped: old writers attached empty curves to every float parameter.
pub fn decode_param(ar: &mut IArchive) -> Result<Parameter> {
    let mut p = Parameter::default();
    let mut id = None;
    let mut stored: Option<StoredType> = None;

    while let Some(cid) = ar.open_chunk()? {
        match cid {
            CID_PARAM_ID => {
                let n: i32 = ar.read()?;
                p.set_id(n);
                id = Some(n);
            }
            CID_PARAM_TYPE => {
                let tag: i32 = ar.read()?;
                let t = if tag == CURVE_OBSOLETE_TAG {
                    p.set_type(ParamType::Float);
                    StoredType::CurveObsolete
                } else {
                    let t = ParamType::from_tag(tag).ok_or(Error::UnknownParamType(tag))?;
                    p.set_type(t);
                    StoredType::Live(t)
                };
                stored = Some(t);
            }
            CID_PARAM_VALUE => match stored {
                Some(StoredType::Live(t)) => {
                    let v = read_value(ar, t)?;
                    p.set_value(v)?;
                }
                Some(StoredType::CurveObsolete) => {
                    let lc = LoadCurve::load(ar)?;
                    if !lc.is_empty() {
                        p.set_load_curve(lc);
                    }
                }
                None => {
                    return Err(Error::invalid("parameter value stored before its type"));
                }
            },
            CID_LOAD_CURVE => {
                let lc = LoadCurve::load(ar)?;
                if !lc.is_empty() {
                    p.set_load_curve(lc);
                }
            }
            other => trace!(id = other, "skip unknown parameter chunk"),
        }
        ar.close_chunk()?;
    }

    if id.is_none() {
        return Err(Error::invalid("parameter chunk without id"));
    }
    if stored.is_none() {
        return Err(Error::invalid(format!("parameter {} has no type", p.id())));
    }
    Ok(p)
}

/// Merge a decoded parameter into the live parameter with the same id.
fn merge_current(block: &mut ParamBlock, p: Parameter) -> Result<()> {
    let Some(live) = block.by_id_mut(p.id()) else {
        warn!(id = p.id(), "archive parameter has no live counterpart, skipped");
        return Ok(());
    };

    let var = live.is_variable();
    if live.param_type() != p.param_type() {
        if !var {
            return Err(Error::ParamTypeMismatch {
                id: p.id(),
                live: live.param_type().to_string(),
                stored: p.param_type().to_string(),
            });
        }
        debug!(
            id = p.id(),
            from = %live.param_type(),
            to = %p.param_type(),
            "migrating variable parameter type"
        );
        live.set_type(p.param_type());
    }
    live.assign_from(&p);
    if var {
        live.make_variable(true);
    }
    Ok(())
}

impl ParamBlock {
    /// Write every parameter, in order, as a `PARAM` chunk.
    pub fn save(&self, ar: &mut OArchive) -> Result<()> {
        for p in self.iter() {
            ar.begin_chunk(CID_PARAM)?;
            save_param(p, ar)?;
            ar.end_chunk()?;
        }
        Ok(())
    }

    /// Load parameters from the current chunk level, using [`assign_by_id`]
    /// for legacy archives.
    pub fn load(&mut self, ar: &mut IArchive) -> Result<()> {
        self.load_with(ar, &mut assign_by_id)
    }

    /// Load parameters, routing legacy archives through `legacy`.
    ///
    /// On error the block may be partially updated.
    pub fn load_with(&mut self, ar: &mut IArchive, legacy: &mut dyn LegacyParamLoader) -> Result<()> {
        let is_legacy = ar.is_legacy();
        let mut count = 0usize;
        while let Some(cid) = ar.open_chunk()? {
            if cid == CID_PARAM {
                let p = decode_param(ar)?;
                if is_legacy {
                    legacy.load_param(self, p)?;
                } else {
                    merge_current(self, p)?;
                }
                count += 1;
            } else {
                trace!(id = cid, "skip non-parameter chunk");
            }
            ar.close_chunk()?;
        }
        debug!(count, legacy = is_legacy, "parameters loaded");
        Ok(())
    }
}
