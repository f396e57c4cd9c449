//! Item size specifications and their unit-aware resolution.
//!
//! Callers describe item sizes as a constant, a per-index list, or a
//! function of the index. Each value may be a number or a string such as
//! `"48px"` or `"96rpx"`. [`SizeResolver`] turns such a [`SizeSpec`] into a
//! purely numeric [`ItemSize`] of the same shape.

use std::fmt;
use std::rc::Rc;

use listkit_core::DisplayMetrics;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SizeError;

/// Viewport width that `rpx` units are designed against.
pub const REFERENCE_VIEWPORT_WIDTH: f32 = 375.0;

/// Default item size and estimated size, in pixels.
pub const DEFAULT_ITEM_SIZE: f32 = 60.0;

static SIZE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?\d+(?:\.\d+)?)(r?px)?$").expect("size pattern is a valid regex")
});

/// Scale factor between `rpx` design units and device pixels.
///
/// The ratio is derived once, when a manager is configured, and then
/// threaded through every resolution as an immutable value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceRatio(f32);

impl Default for DeviceRatio {
    fn default() -> Self {
        Self(1.0)
    }
}

impl DeviceRatio {
    /// Ratio for a device whose window is `width` logical units wide.
    ///
    /// Unusable widths (zero, negative, non-finite) keep the default ratio.
    pub fn from_width(width: f32) -> Self {
        if width.is_finite() && width > 0.0 {
            Self(width / REFERENCE_VIEWPORT_WIDTH)
        } else {
            log::warn!("ignoring unusable device width {width}; keeping ratio 1");
            Self::default()
        }
    }

    /// Derives the ratio from the best available source.
    ///
    /// The platform width query wins; otherwise the host viewport width is
    /// used; otherwise the ratio stays at 1.
    pub fn detect(metrics: Option<&dyn DisplayMetrics>, viewport_width: Option<f32>) -> Self {
        metrics
            .and_then(|metrics| metrics.window_width())
            .or(viewport_width)
            .map(Self::from_width)
            .unwrap_or_default()
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

/// A single unresolved size value.
#[derive(Clone, Debug, PartialEq)]
pub enum SizeValue {
    Number(f32),
    /// A number with an optional `px` or `rpx` suffix.
    Text(String),
}

impl From<f32> for SizeValue {
    fn from(value: f32) -> Self {
        SizeValue::Number(value)
    }
}

impl From<u32> for SizeValue {
    fn from(value: u32) -> Self {
        SizeValue::Number(value as f32)
    }
}

impl From<&str> for SizeValue {
    fn from(value: &str) -> Self {
        SizeValue::Text(value.to_owned())
    }
}

impl From<String> for SizeValue {
    fn from(value: String) -> Self {
        SizeValue::Text(value)
    }
}

/// Size specification as supplied by the caller.
#[derive(Clone)]
pub enum SizeSpec {
    Fixed(SizeValue),
    PerIndex(Vec<SizeValue>),
    Func(Rc<dyn Fn(usize) -> SizeValue>),
}

impl SizeSpec {
    pub fn fixed(value: impl Into<SizeValue>) -> Self {
        SizeSpec::Fixed(value.into())
    }

    pub fn per_index<V: Into<SizeValue>>(values: impl IntoIterator<Item = V>) -> Self {
        SizeSpec::PerIndex(values.into_iter().map(Into::into).collect())
    }

    pub fn func<V: Into<SizeValue>>(f: impl Fn(usize) -> V + 'static) -> Self {
        SizeSpec::Func(Rc::new(move |index| f(index).into()))
    }
}

impl Default for SizeSpec {
    fn default() -> Self {
        SizeSpec::Fixed(SizeValue::Number(DEFAULT_ITEM_SIZE))
    }
}

impl fmt::Debug for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeSpec::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            SizeSpec::PerIndex(values) => f.debug_tuple("PerIndex").field(values).finish(),
            SizeSpec::Func(_) => f.write_str("Func(..)"),
        }
    }
}

type SizeFn = Rc<dyn Fn(usize) -> Result<f32, SizeError>>;

/// Fully numeric size specification.
///
/// Function-backed sizes still resolve units on every call, so a callback
/// that returns a malformed string surfaces the error from
/// [`ItemSize::size_at`].
#[derive(Clone)]
pub enum ItemSize {
    Fixed(f32),
    PerIndex(Vec<f32>),
    Func(SizeFn),
}

impl ItemSize {
    pub fn func(f: impl Fn(usize) -> Result<f32, SizeError> + 'static) -> Self {
        ItemSize::Func(Rc::new(f))
    }

    /// Size of the item at `index`.
    pub fn size_at(&self, index: usize) -> Result<f32, SizeError> {
        match self {
            ItemSize::Fixed(size) => Ok(*size),
            ItemSize::PerIndex(sizes) => sizes.get(index).copied().ok_or(SizeError::MissingIndex {
                index,
                len: sizes.len(),
            }),
            ItemSize::Func(f) => f(index),
        }
    }
}

impl Default for ItemSize {
    fn default() -> Self {
        ItemSize::Fixed(DEFAULT_ITEM_SIZE)
    }
}

// Functions compare by identity, everything else by value.
impl PartialEq for ItemSize {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ItemSize::Fixed(a), ItemSize::Fixed(b)) => a == b,
            (ItemSize::PerIndex(a), ItemSize::PerIndex(b)) => a == b,
            (ItemSize::Func(a), ItemSize::Func(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ItemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemSize::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            ItemSize::PerIndex(sizes) => f.debug_tuple("PerIndex").field(sizes).finish(),
            ItemSize::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Resolves size specifications against a fixed device ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeResolver {
    ratio: DeviceRatio,
}

impl SizeResolver {
    pub fn new(ratio: DeviceRatio) -> Self {
        Self { ratio }
    }

    pub fn ratio(&self) -> DeviceRatio {
        self.ratio
    }

    /// Converts one value to pixels.
    ///
    /// `px` and bare numbers pass through; `rpx` is halved and scaled by the
    /// device ratio.
    pub fn resolve_value(&self, value: &SizeValue) -> Result<f32, SizeError> {
        let size = match value {
            SizeValue::Number(number) => *number,
            SizeValue::Text(text) => parse_size(text, self.ratio)?,
        };
        if size.is_nan() || size < 0.0 {
            return Err(SizeError::Negative(size));
        }
        Ok(size)
    }

    /// Resolves a whole specification, keeping its shape.
    ///
    /// Constant and per-index values are validated eagerly; function results
    /// are validated each time the function is called.
    pub fn resolve(&self, spec: &SizeSpec) -> Result<ItemSize, SizeError> {
        match spec {
            SizeSpec::Fixed(value) => self.resolve_value(value).map(ItemSize::Fixed),
            SizeSpec::PerIndex(values) => values
                .iter()
                .map(|value| self.resolve_value(value))
                .collect::<Result<Vec<_>, _>>()
                .map(ItemSize::PerIndex),
            SizeSpec::Func(f) => {
                let f = Rc::clone(f);
                let resolver = *self;
                Ok(ItemSize::func(move |index| resolver.resolve_value(&f(index))))
            }
        }
    }
}

fn parse_size(text: &str, ratio: DeviceRatio) -> Result<f32, SizeError> {
    let invalid = || SizeError::InvalidFormat(text.to_owned());
    let captures = SIZE_PATTERN.captures(text).ok_or_else(invalid)?;
    let magnitude: f32 = captures[1].parse().map_err(|_| invalid())?;
    match captures.get(2).map(|unit| unit.as_str()) {
        Some("rpx") => Ok(magnitude / 2.0 * ratio.get()),
        _ => Ok(magnitude),
    }
}
