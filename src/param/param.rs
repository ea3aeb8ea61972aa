//! A single named, typed parameter.

use std::fmt;
use std::sync::Arc;

use glam::DVec3;

use super::load_curve::LoadCurve;
use super::value::{ParamType, ParamValue};
use crate::util::{Error, Result};

/// Physical unit a parameter is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    #[default]
    None,
    Length,
    Area,
    Volume,
    Time,
    Mass,
    Force,
    Pressure,
    Density,
    Angle,
    Temperature,
    Velocity,
    Permeability,
}

impl Unit {
    /// Symbol used when displaying values (SI).
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Length => "m",
            Self::Area => "m^2",
            Self::Volume => "m^3",
            Self::Time => "s",
            Self::Mass => "kg",
            Self::Force => "N",
            Self::Pressure => "Pa",
            Self::Density => "kg/m^3",
            Self::Angle => "rad",
            Self::Temperature => "K",
            Self::Velocity => "m/s",
            Self::Permeability => "m^4/(N s)",
        }
    }
}

/// UI/persistence state bits of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamState(u8);

impl ParamState {
    pub const HIDDEN: Self = Self(0);
    /// Shown in property panels.
    pub const VISIBLE: Self = Self(1);
    /// Can be edited (otherwise read-only).
    pub const EDITABLE: Self = Self(2);
    /// Written by exporters.
    pub const PERSISTENT: Self = Self(4);
    pub const ALL: Self = Self(7);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl Default for ParamState {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::ops::BitOr for ParamState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Index qualifier, e.g. `c[2]` for the third coefficient of an array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamIndex {
    pub name: String,
    pub index: i32,
}

/// A named, typed parameter with metadata and an optional time curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    id: i32,
    short_name: String,
    long_name: String,
    value: ParamValue,
    unit: Unit,
    state: ParamState,
    index: Option<ParamIndex>,
    curve: Option<LoadCurve>,
    enum_names: Option<Arc<str>>,
    offset: i32,
    variable: bool,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            id: -1,
            short_name: String::new(),
            long_name: String::new(),
            value: ParamValue::default(),
            unit: Unit::None,
            state: ParamState::ALL,
            index: None,
            curve: None,
            enum_names: None,
            offset: 0,
            variable: false,
        }
    }
}

impl Parameter {
    /// Create a parameter with a value and short name. The long name
    /// defaults to the short name.
    pub fn new(value: ParamValue, short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        Self {
            long_name: short_name.clone(),
            short_name,
            value,
            ..Self::default()
        }
    }

    pub fn int(v: i32, name: impl Into<String>) -> Self {
        Self::new(ParamValue::Int(v), name)
    }

    /// Choice parameter; `names` is the NUL-separated list of labels.
    pub fn choice(v: i32, name: impl Into<String>, names: impl Into<Arc<str>>) -> Self {
        Self::new(ParamValue::Choice(v), name).with_enum_names(names)
    }

    pub fn float(v: f64, name: impl Into<String>) -> Self {
        Self::new(ParamValue::Float(v), name)
    }

    pub fn bool(v: bool, name: impl Into<String>) -> Self {
        Self::new(ParamValue::Bool(v), name)
    }

    pub fn vec3(v: DVec3, name: impl Into<String>) -> Self {
        Self::new(ParamValue::Vec3(v), name)
    }

    pub fn string(v: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ParamValue::String(v.into()), name)
    }

    pub fn math(expr: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ParamValue::Math(expr.into()), name)
    }

    pub fn with_long_name(mut self, name: impl Into<String>) -> Self {
        self.long_name = name.into();
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_index(mut self, name: impl Into<String>, index: i32) -> Self {
        self.index = Some(ParamIndex { name: name.into(), index });
        self
    }

    pub fn with_enum_names(mut self, names: impl Into<Arc<str>>) -> Self {
        self.enum_names = Some(names.into());
        self
    }

    pub fn with_offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_state(mut self, state: ParamState) -> Self {
        self.state = state;
        self
    }

    /// Mark the parameter as allowed to change type between archive versions.
    pub fn variable(mut self) -> Self {
        self.variable = true;
        self
    }

    // --- identity ---

    #[inline]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[inline]
    pub fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    #[inline]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    #[inline]
    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    // --- type and value ---

    #[inline]
    pub fn param_type(&self) -> ParamType {
        self.value.param_type()
    }

    #[inline]
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Replace the value. The type tag is allowed to change only for
    /// variable parameters.
    pub fn set_value(&mut self, value: ParamValue) -> Result<()> {
        if value.param_type() != self.param_type() && !self.variable {
            return Err(Error::TypeMismatch {
                expected: self.param_type().to_string(),
                actual: value.param_type().to_string(),
            });
        }
        self.value = value;
        Ok(())
    }

    /// Change the type tag, resetting the value to the zero value of `t`.
    pub fn set_type(&mut self, t: ParamType) {
        self.value = t.default_value();
    }

    fn typed(&mut self, value: ParamValue) -> Result<()> {
        self.value.assign(value)
    }

    /// Set an `Int` or `Choice` value.
    pub fn set_int(&mut self, v: i32) -> Result<()> {
        match self.value {
            ParamValue::Choice(_) => self.typed(ParamValue::Choice(v)),
            _ => self.typed(ParamValue::Int(v)),
        }
    }

    pub fn set_float(&mut self, v: f64) -> Result<()> {
        self.typed(ParamValue::Float(v))
    }

    pub fn set_bool(&mut self, v: bool) -> Result<()> {
        self.typed(ParamValue::Bool(v))
    }

    pub fn set_vec3(&mut self, v: DVec3) -> Result<()> {
        self.typed(ParamValue::Vec3(v))
    }

    pub fn set_string(&mut self, v: impl Into<String>) -> Result<()> {
        self.typed(ParamValue::String(v.into()))
    }

    pub fn set_math(&mut self, v: impl Into<String>) -> Result<()> {
        self.typed(ParamValue::Math(v.into()))
    }

    pub fn int_value(&self) -> Option<i32> {
        self.value.as_int()
    }

    pub fn float_value(&self) -> Option<f64> {
        self.value.as_float()
    }

    pub fn bool_value(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn vec3_value(&self) -> Option<DVec3> {
        self.value.as_vec3()
    }

    pub fn string_value(&self) -> Option<&str> {
        self.value.as_str()
    }

    pub fn math_string(&self) -> Option<&str> {
        self.value.as_math()
    }

    // --- metadata ---

    #[inline]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    #[inline]
    pub fn state(&self) -> ParamState {
        self.state
    }

    pub fn set_state(&mut self, state: ParamState) {
        self.state = state;
    }

    pub fn is_visible(&self) -> bool {
        self.state.contains(ParamState::VISIBLE)
    }

    pub fn is_editable(&self) -> bool {
        self.state.contains(ParamState::EDITABLE)
    }

    pub fn is_persistent(&self) -> bool {
        self.state.contains(ParamState::PERSISTENT)
    }

    pub fn index(&self) -> Option<&ParamIndex> {
        self.index.as_ref()
    }

    #[inline]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    #[inline]
    pub fn is_variable(&self) -> bool {
        self.variable
    }

    pub fn make_variable(&mut self, b: bool) {
        self.variable = b;
    }

    // --- enum names ---

    /// Set the NUL-separated choice labels.
    pub fn set_enum_names(&mut self, names: impl Into<Arc<str>>) {
        self.enum_names = Some(names.into());
    }

    pub fn clear_enum_names(&mut self) {
        self.enum_names = None;
    }

    /// Raw NUL-separated label list.
    pub fn enum_names_raw(&self) -> Option<&str> {
        self.enum_names.as_deref()
    }

    /// Iterate over the choice labels.
    pub fn enum_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.enum_names
            .as_deref()
            .unwrap_or("")
            .split('\0')
            .filter(|s| !s.is_empty())
    }

    /// Label of the current choice, if any.
    pub fn choice_label(&self) -> Option<&str> {
        match self.value {
            ParamValue::Choice(n) if n >= 0 => self.enum_names().nth(n as usize),
            _ => None,
        }
    }

    /// Integer as seen by exporters: choices are shifted by the offset.
    pub fn display_int(&self) -> Option<i32> {
        match self.value {
            ParamValue::Choice(n) => Some(n + self.offset),
            ParamValue::Int(n) => Some(n),
            _ => None,
        }
    }

    // --- load curve ---

    pub fn load_curve(&self) -> Option<&LoadCurve> {
        self.curve.as_ref()
    }

    pub fn load_curve_mut(&mut self) -> Option<&mut LoadCurve> {
        self.curve.as_mut()
    }

    /// Attach an empty curve unless one is attached already.
    pub fn ensure_load_curve(&mut self) -> &mut LoadCurve {
        self.curve.get_or_insert_with(LoadCurve::new)
    }

    pub fn set_load_curve(&mut self, lc: LoadCurve) {
        self.curve = Some(lc);
    }

    pub fn clear_load_curve(&mut self) -> Option<LoadCurve> {
        self.curve.take()
    }

    /// Assignment: copies id, value, variable flag and curve; names, unit,
    /// state, index, enum names and offset stay with `self`.
    pub fn assign_from(&mut self, other: &Parameter) {
        self.id = other.id;
        self.value = other.value.clone();
        self.variable = other.variable;
        self.curve = other.curve.clone();
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name)?;
        if let Some(idx) = &self.index {
            write!(f, "[{}={}]", idx.name, idx.index)?;
        }
        write!(f, " = {}", self.value)?;
        if self.unit != Unit::None {
            write!(f, " {}", self.unit.symbol())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_type_roundtrips_every_tag() {
        let mut p = Parameter::default();
        for t in ParamType::ALL {
            p.set_type(t);
            assert_eq!(p.param_type(), t);
            match t {
                ParamType::Int | ParamType::Choice => {
                    p.set_int(-4).unwrap();
                    assert_eq!(p.int_value(), Some(-4));
                }
                ParamType::Float => {
                    p.set_float(2.5).unwrap();
                    assert_eq!(p.float_value(), Some(2.5));
                }
                ParamType::Bool => {
                    p.set_bool(true).unwrap();
                    assert_eq!(p.bool_value(), Some(true));
                }
                ParamType::Vec3 => {
                    p.set_vec3(DVec3::new(1.0, 2.0, 3.0)).unwrap();
                    assert_eq!(p.vec3_value(), Some(DVec3::new(1.0, 2.0, 3.0)));
                }
                ParamType::String => {
                    p.set_string("neo-Hookean").unwrap();
                    assert_eq!(p.string_value(), Some("neo-Hookean"));
                }
                ParamType::Math => {
                    p.set_math("sin(t)").unwrap();
                    assert_eq!(p.math_string(), Some("sin(t)"));
                }
            }
            assert_eq!(p.param_type(), t);
        }
    }

    #[test]
    fn test_typed_setter_mismatch() {
        let mut p = Parameter::float(1.0, "E");
        assert!(matches!(p.set_bool(true), Err(Error::TypeMismatch { .. })));
        assert_eq!(p.float_value(), Some(1.0));
    }

    #[test]
    fn test_set_value_needs_variable_to_change_type() {
        let mut p = Parameter::float(1.0, "k");
        assert!(p.set_value(ParamValue::Math("2*t".into())).is_err());
        p.make_variable(true);
        p.set_value(ParamValue::Math("2*t".into())).unwrap();
        assert_eq!(p.param_type(), ParamType::Math);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut p = Parameter::float(1.0, "E");
        p.set_load_curve(LoadCurve::from_points([(0.0, 0.0), (1.0, 1.0)]));
        let q = p.clone();
        p.load_curve_mut().unwrap().add(2.0, 4.0);
        p.set_float(9.0).unwrap();
        assert_eq!(q.load_curve().unwrap().len(), 2);
        assert_eq!(q.float_value(), Some(1.0));
    }

    #[test]
    fn test_enum_names_and_offset() {
        let p = Parameter::choice(1, "type", "linear\0step\0smooth\0").with_offset(1);
        let names: Vec<&str> = p.enum_names().collect();
        assert_eq!(names, vec!["linear", "step", "smooth"]);
        assert_eq!(p.choice_label(), Some("step"));
        assert_eq!(p.display_int(), Some(2));

        let q = p.clone();
        assert_eq!(q.enum_names_raw(), p.enum_names_raw());
    }

    #[test]
    fn test_assign_keeps_metadata() {
        let mut live = Parameter::float(1.0, "E")
            .with_long_name("Young's modulus")
            .with_unit(Unit::Pressure);
        live.set_id(3);
        let mut stored = Parameter::float(200.0, "");
        stored.set_id(3);
        stored.set_load_curve(LoadCurve::from_points([(0.0, 1.0)]));

        live.assign_from(&stored);
        assert_eq!(live.float_value(), Some(200.0));
        assert_eq!(live.long_name(), "Young's modulus");
        assert_eq!(live.unit(), Unit::Pressure);
        assert!(live.load_curve().is_some());
    }

    #[test]
    fn test_state_flags() {
        let p = Parameter::int(0, "n").with_state(ParamState::VISIBLE | ParamState::PERSISTENT);
        assert!(p.is_visible());
        assert!(!p.is_editable());
        assert!(p.is_persistent());
        assert_eq!(ParamState::ALL.difference(ParamState::EDITABLE).bits(), 5);
    }

    #[test]
    fn test_display() {
        let p = Parameter::float(2.0, "c")
            .with_index("c", 1)
            .with_unit(Unit::Pressure);
        assert_eq!(p.to_string(), "c[c=1] = 2 Pa");
    }
}
